//! Reads solver values back into unit/incident pairs and folds tier outcomes
//! into the overall result, in tier order.

use serde::Serialize;

use crate::model::{CostMatrix, DispatchProblem, TierIndex, TierList};
use crate::optimizer::problem::TierModel;
use crate::optimizer::scheduler::ExclusionSet;
use crate::optimizer::solver::MilpSolution;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TierStatus {
    Solved,
    Infeasible,
    TimedOut,
    Failed,
    /// No incident has this priority; nothing was solved.
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierOutcome {
    pub tier: TierIndex,
    pub label: String,
    pub status: TierStatus,
    /// (unit index, incident index) pairs committed in this tier.
    pub assignments: Vec<(usize, usize)>,
    /// Sum of cost-matrix entries of `assignments`; no slack penalty.
    pub realized_cost: f64,
    /// Requirement count left uncovered by the optimal solution.
    pub shortfall: u64,
    /// Raw solver objective, including slack penalties. Only set when solved.
    pub objective: Option<f64>,
}

impl TierOutcome {
    pub fn without_assignments(tier: TierIndex, label: &str, status: TierStatus) -> Self {
        Self {
            tier,
            label: label.to_string(),
            status,
            assignments: Vec::new(),
            realized_cost: 0.0,
            shortfall: 0,
            objective: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    pub unit_index: usize,
    pub incident_index: usize,
    pub unit_id: u64,
    pub incident_id: u64,
    pub tier: String,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallResult {
    pub assignments: Vec<Assignment>,
    /// Realized travel cost of all assignments.
    pub value: f64,
    /// Sum of raw solver objectives of solved tiers.
    pub penalized_objective: f64,
    pub shortfall: u64,
    pub tiers: Vec<TierOutcome>,
}

impl OverallResult {
    pub fn pairs(&self) -> Vec<(u64, u64)> {
        self.assignments
            .iter()
            .map(|a| (a.unit_id, a.incident_id))
            .collect()
    }
}

pub struct ResultAggregator<'a> {
    problem: &'a DispatchProblem,
    costs: &'a CostMatrix,
    tiers: &'a TierList,
    outcomes: Vec<TierOutcome>,
}

impl<'a> ResultAggregator<'a> {
    pub fn new(problem: &'a DispatchProblem, costs: &'a CostMatrix, tiers: &'a TierList) -> Self {
        Self {
            problem,
            costs,
            tiers,
            outcomes: Vec::with_capacity(tiers.len()),
        }
    }

    /// Pairs with a set decision variable, restricted to incidents of the
    /// model's tier and to units not already committed.
    pub fn extract_assignments(
        &self,
        tier_model: &TierModel,
        solution: &MilpSolution,
        excluded: &ExclusionSet,
    ) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for unit in 0..tier_model.units() {
            for incident in 0..tier_model.incidents() {
                if self.problem.incidents[incident].tier != tier_model.tier {
                    continue;
                }
                if !solution.is_set(tier_model.assignment_var(unit, incident)) {
                    continue;
                }
                if excluded.contains(unit) {
                    tracing::warn!(unit, incident, "solver used a committed unit, dropping pair");
                    continue;
                }
                pairs.push((unit, incident));
            }
        }
        pairs
    }

    pub fn shortfall(&self, tier_model: &TierModel, solution: &MilpSolution) -> u64 {
        let mut total = 0.0;
        for (incident, request) in self.problem.incidents.iter().enumerate() {
            if request.tier != tier_model.tier {
                continue;
            }
            for category in 0..tier_model.categories() {
                total += solution.value(tier_model.slack_var(incident, category)).round();
            }
        }
        total.max(0.0) as u64
    }

    pub fn realized_cost(&self, pairs: &[(usize, usize)]) -> f64 {
        pairs
            .iter()
            .map(|(unit, incident)| self.costs.get(*unit, *incident))
            .sum()
    }

    pub fn record(&mut self, outcome: TierOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn finish(self) -> OverallResult {
        let mut assignments = Vec::new();
        let mut value = 0.0;
        let mut penalized_objective = 0.0;
        let mut shortfall: u64 = 0;
        for outcome in &self.outcomes {
            value += outcome.realized_cost;
            penalized_objective += outcome.objective.unwrap_or(0.0);
            shortfall = shortfall.saturating_add(outcome.shortfall);
            for &(unit, incident) in &outcome.assignments {
                assignments.push(Assignment {
                    unit_index: unit,
                    incident_index: incident,
                    unit_id: self.problem.units[unit].id,
                    incident_id: self.problem.incidents[incident].id,
                    tier: self.tiers.label(outcome.tier).to_string(),
                    cost: self.costs.get(unit, incident),
                });
            }
        }
        OverallResult {
            assignments,
            value,
            penalized_objective,
            shortfall,
            tiers: self.outcomes,
        }
    }
}
