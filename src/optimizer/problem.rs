//! Builds the MILP for one tier round.
//!
//! Decision variables `x[u][i]` cover every (unit, incident) pair and slack
//! variables `s[i][k]` every (incident, category) pair, whatever the tier, so
//! the model has the same shape in every round. Only incidents of the target
//! tier may receive units; units in the exclusion set may not be used at all.

use crate::model::{CategoryId, CostMatrix, DispatchProblem, TierIndex};
use crate::optimizer::milp::{Comparison, LinearExpr, MilpModel, VarId};
use crate::optimizer::scheduler::ExclusionSet;

/// A built model plus the handles needed to read a solution back.
#[derive(Debug, Clone)]
pub struct TierModel {
    pub tier: TierIndex,
    pub model: MilpModel,
    units: usize,
    incidents: usize,
    categories: usize,
    assign: Vec<VarId>,
    slack: Vec<VarId>,
}

impl TierModel {
    pub fn assignment_var(&self, unit: usize, incident: usize) -> VarId {
        self.assign[unit * self.incidents + incident]
    }

    pub fn slack_var(&self, incident: usize, category: usize) -> VarId {
        self.slack[incident * self.categories + category]
    }

    pub fn units(&self) -> usize {
        self.units
    }

    pub fn incidents(&self) -> usize {
        self.incidents
    }

    pub fn categories(&self) -> usize {
        self.categories
    }
}

pub struct ProblemBuilder<'a> {
    problem: &'a DispatchProblem,
    costs: &'a CostMatrix,
    slack_penalty: f64,
}

impl<'a> ProblemBuilder<'a> {
    pub fn new(problem: &'a DispatchProblem, costs: &'a CostMatrix, slack_penalty: f64) -> Self {
        Self {
            problem,
            costs,
            slack_penalty,
        }
    }

    pub fn build(&self, tier: TierIndex, excluded: &ExclusionSet) -> TierModel {
        let units = self.problem.units.len();
        let incidents = self.problem.incidents.len();
        let categories = self.problem.categories;
        let mut model = MilpModel::new();

        // Creation order is fixed (x unit-major, then s incident-major) so
        // identical inputs always produce identical models.
        let assign: Vec<VarId> = (0..units)
            .flat_map(|u| (0..incidents).map(move |i| (u, i)))
            .map(|(u, i)| model.add_binary(format!("x_{u}_{i}")))
            .collect();
        let slack: Vec<VarId> = (0..incidents)
            .flat_map(|i| (0..categories).map(move |k| (i, k)))
            .map(|(i, k)| model.add_integer(format!("s_{i}_{k}"), 0.0, None))
            .collect();

        let x = |u: usize, i: usize| assign[u * incidents + i];

        for u in 0..units {
            let row: LinearExpr = (0..incidents).map(|i| (x(u, i), 1.0)).collect();
            push(&mut model, format!("capacity_{u}"), row, Comparison::Le, 1.0);
        }

        for (i, incident) in self.problem.incidents.iter().enumerate() {
            if incident.tier == tier {
                for k in 0..categories {
                    let mut covered: LinearExpr = self
                        .problem
                        .units
                        .iter()
                        .enumerate()
                        .filter(|(_, unit)| unit.category == CategoryId(k))
                        .map(|(u, _)| (x(u, i), 1.0))
                        .collect();
                    covered.add_term(slack[i * categories + k], 1.0);
                    let required = f64::from(incident.required(CategoryId(k)));
                    push(&mut model, format!("cover_{i}_{k}"), covered, Comparison::Eq, required);
                }
            } else {
                let column: LinearExpr = (0..units).map(|u| (x(u, i), 1.0)).collect();
                push(&mut model, format!("other_tier_{i}"), column, Comparison::Eq, 0.0);
            }
        }

        let committed: LinearExpr = excluded
            .iter()
            .filter(|&u| u < units)
            .flat_map(|u| (0..incidents).map(move |i| (u, i)))
            .map(|(u, i)| (x(u, i), 1.0))
            .collect();
        push(&mut model, "excluded_units", committed, Comparison::Eq, 0.0);

        let mut objective: LinearExpr = (0..units)
            .flat_map(|u| (0..incidents).map(move |i| (u, i)))
            .map(|(u, i)| (x(u, i), self.costs.get(u, i)))
            .collect();
        for var in &slack {
            objective.add_term(*var, self.slack_penalty);
        }
        model.minimize(objective);

        TierModel {
            tier,
            model,
            units,
            incidents,
            categories,
            assign,
            slack,
        }
    }
}

/// Rows without terms are trivially satisfied by the zero vector and are left out.
fn push(model: &mut MilpModel, name: impl Into<String>, expr: LinearExpr, cmp: Comparison, rhs: f64) {
    if expr.is_empty() {
        debug_assert!(match cmp {
            Comparison::Eq => rhs == 0.0,
            Comparison::Le => rhs >= 0.0,
            Comparison::Ge => rhs <= 0.0,
        });
        return;
    }
    model.add_constraint(name, expr, cmp, rhs);
}
