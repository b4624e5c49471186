//! Solver adapter: hands a [MilpModel] to a MILP backend and reports
//! optimal / infeasible / timed out / failed. Only [SolveOutcome::Optimal]
//! carries variable values.

use std::time::{Duration, Instant};

use good_lp::solvers::highs::highs;
use good_lp::solvers::WithTimeLimit;
use good_lp::{
    constraint, variable, Expression, ProblemVariables, ResolutionError, Solution, SolverModel,
    Variable,
};

use crate::optimizer::milp::{Comparison, LinearExpr, MilpModel, VarId, VarKind};

/// Variable values of an optimal solution, indexed by [VarId].
#[derive(Debug, Clone, PartialEq)]
pub struct MilpSolution {
    values: Vec<f64>,
    objective: f64,
}

impl MilpSolution {
    pub fn new(values: Vec<f64>, objective: f64) -> Self {
        Self { values, objective }
    }

    pub fn value(&self, var: VarId) -> f64 {
        self.values.get(var.index()).copied().unwrap_or(0.0)
    }

    /// Binary variables are read as set when above one half.
    pub fn is_set(&self, var: VarId) -> bool {
        self.value(var) > 0.5
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn objective(&self) -> f64 {
        self.objective
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    Optimal(MilpSolution),
    Infeasible,
    TimedOut,
    Failed(String),
}

pub trait MilpSolver: Send + Sync {
    fn name(&self) -> &str;

    fn solve(&self, model: &MilpModel) -> SolveOutcome;
}

/// HiGHS through `good_lp`, bounded by a wall-clock budget per solve.
/// A solve that returns at or past the budget is reported as timed out, since
/// HiGHS hands back its incumbent in that case rather than a proven optimum.
#[derive(Debug, Clone)]
pub struct HighsSolver {
    time_limit: Duration,
}

impl HighsSolver {
    pub fn new(time_limit: Duration) -> Self {
        Self { time_limit }
    }

    pub fn time_limit(&self) -> Duration {
        self.time_limit
    }
}

fn to_expression(vars: &[Variable], expr: &LinearExpr) -> Expression {
    let mut out = Expression::from(0.0);
    for (var, coefficient) in expr.terms() {
        out.add_mul(*coefficient, vars[var.index()]);
    }
    out
}

impl MilpSolver for HighsSolver {
    fn name(&self) -> &str {
        "highs"
    }

    fn solve(&self, model: &MilpModel) -> SolveOutcome {
        let mut problem_vars = ProblemVariables::new();
        let vars: Vec<Variable> = model
            .vars()
            .iter()
            .map(|def| {
                let definition = match def.kind {
                    VarKind::Binary => variable().binary(),
                    VarKind::Integer { lower, upper } => {
                        let v = variable().integer().min(lower);
                        match upper {
                            Some(upper) => v.max(upper),
                            None => v,
                        }
                    }
                };
                problem_vars.add(definition.name(def.name.clone()))
            })
            .collect();

        let objective = to_expression(&vars, model.objective());
        let mut problem = problem_vars
            .minimise(objective)
            .using(highs)
            .with_time_limit(self.time_limit.as_secs_f64());

        for row in model.constraints() {
            let lhs = to_expression(&vars, &row.expr);
            let rhs = row.rhs;
            let built = match row.cmp {
                Comparison::Eq => constraint!(lhs == rhs),
                Comparison::Le => constraint!(lhs <= rhs),
                Comparison::Ge => constraint!(lhs >= rhs),
            };
            problem.add_constraint(built);
        }

        let started = Instant::now();
        let result = problem.solve();
        let elapsed = started.elapsed();

        match result {
            Ok(_) if elapsed >= self.time_limit => SolveOutcome::TimedOut,
            Ok(solution) => {
                let values: Vec<f64> = vars.iter().map(|v| solution.value(*v)).collect();
                let objective = model.objective().evaluate(&values);
                SolveOutcome::Optimal(MilpSolution::new(values, objective))
            }
            Err(_) if elapsed >= self.time_limit => SolveOutcome::TimedOut,
            Err(ResolutionError::Infeasible) => SolveOutcome::Infeasible,
            Err(err) => SolveOutcome::Failed(err.to_string()),
        }
    }
}
