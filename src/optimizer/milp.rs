//! Backend-independent MILP model. Variables are addressed by [VarId] handles
//! returned at creation; constraints and the objective are sparse linear
//! expressions over those handles.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(usize);

impl VarId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VarKind {
    Binary,
    /// Integer in `[lower, upper]`; `None` means unbounded above.
    Integer { lower: f64, upper: Option<f64> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDef {
    pub name: String,
    pub kind: VarKind,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    terms: Vec<(VarId, f64)>,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_term(&mut self, var: VarId, coefficient: f64) -> &mut Self {
        self.terms.push((var, coefficient));
        self
    }

    pub fn terms(&self) -> &[(VarId, f64)] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|(var, coefficient)| coefficient * values.get(var.index()).copied().unwrap_or(0.0))
            .sum()
    }
}

impl FromIterator<(VarId, f64)> for LinearExpr {
    fn from_iter<I: IntoIterator<Item = (VarId, f64)>>(iter: I) -> Self {
        Self {
            terms: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Le,
    Ge,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Eq => "==",
            Self::Le => "<=",
            Self::Ge => ">=",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub name: String,
    pub expr: LinearExpr,
    pub cmp: Comparison,
    pub rhs: f64,
}

impl Constraint {
    pub fn is_satisfied(&self, values: &[f64], tolerance: f64) -> bool {
        let lhs = self.expr.evaluate(values);
        match self.cmp {
            Comparison::Eq => (lhs - self.rhs).abs() <= tolerance,
            Comparison::Le => lhs <= self.rhs + tolerance,
            Comparison::Ge => lhs + tolerance >= self.rhs,
        }
    }
}

/// A minimization problem.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MilpModel {
    vars: Vec<VarDef>,
    constraints: Vec<Constraint>,
    objective: LinearExpr,
}

impl MilpModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_binary(&mut self, name: impl Into<String>) -> VarId {
        self.add_var(name.into(), VarKind::Binary)
    }

    pub fn add_integer(&mut self, name: impl Into<String>, lower: f64, upper: Option<f64>) -> VarId {
        self.add_var(name.into(), VarKind::Integer { lower, upper })
    }

    fn add_var(&mut self, name: String, kind: VarKind) -> VarId {
        let id = VarId(self.vars.len());
        self.vars.push(VarDef { name, kind });
        id
    }

    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        expr: LinearExpr,
        cmp: Comparison,
        rhs: f64,
    ) {
        self.constraints.push(Constraint {
            name: name.into(),
            expr,
            cmp,
            rhs,
        });
    }

    pub fn minimize(&mut self, objective: LinearExpr) {
        self.objective = objective;
    }

    pub fn vars(&self) -> &[VarDef] {
        &self.vars
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    pub fn var_count(&self) -> usize {
        self.vars.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_assigned_in_creation_order() {
        let mut model = MilpModel::new();
        let x = model.add_binary("x");
        let s = model.add_integer("s", 0.0, None);
        assert_eq!((x.index(), s.index()), (0, 1));
        assert_eq!(model.vars()[1].kind, VarKind::Integer { lower: 0.0, upper: None });
    }

    #[test]
    fn constraint_satisfaction_respects_comparison() {
        let mut model = MilpModel::new();
        let x = model.add_binary("x");
        let y = model.add_binary("y");
        let expr: LinearExpr = [(x, 1.0), (y, 1.0)].into_iter().collect();
        model.add_constraint("cap", expr, Comparison::Le, 1.0);
        let cap = &model.constraints()[0];
        assert!(cap.is_satisfied(&[1.0, 0.0], 1e-9));
        assert!(!cap.is_satisfied(&[1.0, 1.0], 1e-9));
    }
}
