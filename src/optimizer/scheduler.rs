//! Tier scheduler: solves one model per tier, most urgent first, carrying the
//! set of already committed units from round to round.

use std::collections::BTreeSet;
use std::time::Instant;

use serde::Serialize;

use crate::model::{CostMatrix, DispatchProblem, TierIndex, TierList};
use crate::optimizer::aggregate::{OverallResult, ResultAggregator, TierOutcome, TierStatus};
use crate::optimizer::problem::ProblemBuilder;
use crate::optimizer::solver::{MilpSolver, SolveOutcome};

/// Unit indices committed in earlier tiers. Only grows during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExclusionSet {
    units: BTreeSet<usize>,
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commit(&mut self, units: impl IntoIterator<Item = usize>) {
        self.units.extend(units);
    }

    pub fn contains(&self, unit: usize) -> bool {
        self.units.contains(&unit)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.units.iter().copied()
    }
}

/// Runs the tier sequence for one request. Holds no per-run state, so one
/// scheduler may serve many runs; the exclusion set lives inside [TierScheduler::run].
pub struct TierScheduler<'s, S: MilpSolver + ?Sized> {
    solver: &'s S,
    tiers: TierList,
    slack_penalty: f64,
}

impl<'s, S: MilpSolver + ?Sized> TierScheduler<'s, S> {
    pub fn new(solver: &'s S, tiers: TierList, slack_penalty: f64) -> Self {
        Self {
            solver,
            tiers,
            slack_penalty,
        }
    }

    pub fn tiers(&self) -> &TierList {
        &self.tiers
    }

    pub fn run(&self, problem: &DispatchProblem, costs: &CostMatrix) -> OverallResult {
        let started = Instant::now();
        tracing::info!(
            units = problem.units.len(),
            incidents = problem.incidents.len(),
            tiers = self.tiers.len(),
            solver = self.solver.name(),
            "starting tiered dispatch run"
        );
        self.check_penalty(costs);

        let builder = ProblemBuilder::new(problem, costs, self.slack_penalty);
        let mut excluded = ExclusionSet::new();
        let mut aggregator = ResultAggregator::new(problem, costs, &self.tiers);

        for (tier, label) in self.tiers.iter() {
            let outcome = self.solve_tier(&builder, &aggregator, problem, tier, label, &excluded);
            excluded.commit(outcome.assignments.iter().map(|(unit, _)| *unit));
            tracing::debug!(tier = label, excluded = excluded.len(), "tier round finished");
            aggregator.record(outcome);
        }

        let result = aggregator.finish();
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        tracing::info!(
            assignments = result.assignments.len(),
            value = result.value,
            penalized_objective = result.penalized_objective,
            shortfall = result.shortfall,
            elapsed_ms,
            "tiered dispatch run finished"
        );
        result
    }

    fn solve_tier(
        &self,
        builder: &ProblemBuilder<'_>,
        aggregator: &ResultAggregator<'_>,
        problem: &DispatchProblem,
        tier: TierIndex,
        label: &str,
        excluded: &ExclusionSet,
    ) -> TierOutcome {
        let eligible = problem.incidents_in_tier(tier);
        if eligible.is_empty() {
            tracing::debug!(tier = label, "no incidents in tier, skipping solve");
            return TierOutcome::without_assignments(tier, label, TierStatus::Empty);
        }

        let tier_model = builder.build(tier, excluded);
        let required: u64 = eligible
            .iter()
            .map(|&incident| problem.incidents[incident].total_required())
            .sum();
        tracing::debug!(
            tier = label,
            incidents = eligible.len(),
            required,
            excluded = excluded.len(),
            variables = tier_model.model.var_count(),
            constraints = tier_model.model.constraints().len(),
            "solving tier model"
        );

        match self.solver.solve(&tier_model.model) {
            SolveOutcome::Optimal(solution) => {
                let assignments = aggregator.extract_assignments(&tier_model, &solution, excluded);
                let shortfall = aggregator.shortfall(&tier_model, &solution);
                if shortfall > 0 {
                    tracing::warn!(
                        tier = label,
                        shortfall,
                        "tier requirements not fully covered by available units"
                    );
                }
                TierOutcome {
                    tier,
                    label: label.to_string(),
                    status: TierStatus::Solved,
                    realized_cost: aggregator.realized_cost(&assignments),
                    assignments,
                    shortfall,
                    objective: Some(solution.objective()),
                }
            }
            SolveOutcome::Infeasible => {
                tracing::warn!(tier = label, "tier model infeasible, no assignments recorded");
                TierOutcome::without_assignments(tier, label, TierStatus::Infeasible)
            }
            SolveOutcome::TimedOut => {
                tracing::warn!(tier = label, "tier solve exceeded its time budget, treated as infeasible");
                TierOutcome::without_assignments(tier, label, TierStatus::TimedOut)
            }
            SolveOutcome::Failed(reason) => {
                tracing::warn!(tier = label, %reason, "tier solve failed, treated as infeasible");
                TierOutcome::without_assignments(tier, label, TierStatus::Failed)
            }
        }
    }

    fn check_penalty(&self, costs: &CostMatrix) {
        let max_cost = costs.max_cost();
        let pairs = (costs.units() * costs.incidents()) as f64;
        if self.slack_penalty <= max_cost {
            tracing::warn!(
                slack_penalty = self.slack_penalty,
                max_cost,
                "slack penalty does not exceed the largest travel cost; requirements may be left unmet"
            );
        } else if self.slack_penalty <= max_cost * pairs {
            tracing::debug!(
                slack_penalty = self.slack_penalty,
                bound = max_cost * pairs,
                "slack penalty below the strict dominance bound"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CategoryId, IncidentRequest, Location, Unit};
    use crate::optimizer::milp::MilpModel;

    struct Always(SolveOutcome);

    impl MilpSolver for Always {
        fn name(&self) -> &str {
            "always"
        }

        fn solve(&self, _model: &MilpModel) -> SolveOutcome {
            self.0.clone()
        }
    }

    fn problem() -> (DispatchProblem, CostMatrix) {
        let at = Location::new(0.0, 0.0);
        let problem = DispatchProblem {
            units: vec![Unit { id: 1, location: at, category: CategoryId(0) }],
            incidents: vec![IncidentRequest {
                id: 2,
                location: at,
                tier: TierIndex(1),
                requirements: vec![1],
            }],
            categories: 1,
        };
        (problem, CostMatrix::new(1, 1, vec![5.0]).unwrap())
    }

    #[test]
    fn huge_requirement_counts_do_not_abort_the_run() {
        let (mut problem, _) = problem();
        problem.categories = 2;
        problem.incidents[0].requirements = vec![u32::MAX - 1, u32::MAX - 1];
        problem.incidents.push(IncidentRequest {
            id: 3,
            location: Location::new(0.0, 0.0),
            tier: TierIndex(1),
            requirements: vec![u32::MAX, 0],
        });
        let costs = CostMatrix::new(1, 2, vec![5.0, 1.0]).unwrap();
        let solver = Always(SolveOutcome::Infeasible);
        let scheduler = TierScheduler::new(&solver, TierList::default(), 100.0);
        let result = scheduler.run(&problem, &costs);
        assert_eq!(result.tiers[1].status, TierStatus::Infeasible);
        assert!(result.assignments.is_empty());
    }

    #[test]
    fn exclusion_set_only_grows() {
        let mut set = ExclusionSet::new();
        set.commit([3, 1]);
        set.commit([1]);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![1, 3]);
        assert!(set.contains(3));
    }

    #[test]
    fn solver_failures_are_absorbed_per_tier() {
        let (problem, costs) = problem();
        for (outcome, status) in [
            (SolveOutcome::Infeasible, TierStatus::Infeasible),
            (SolveOutcome::TimedOut, TierStatus::TimedOut),
            (SolveOutcome::Failed("boom".to_string()), TierStatus::Failed),
        ] {
            let solver = Always(outcome);
            let scheduler = TierScheduler::new(&solver, TierList::default(), 100.0);
            let result = scheduler.run(&problem, &costs);
            assert!(result.assignments.is_empty());
            assert_eq!(result.tiers.len(), 4);
            assert_eq!(result.tiers[0].status, TierStatus::Empty);
            assert_eq!(result.tiers[1].status, status);
            assert_eq!(result.value, 0.0);
        }
    }
}
