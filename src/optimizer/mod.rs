pub mod aggregate;
pub mod milp;
pub mod problem;
pub mod scheduler;
pub mod solver;

use std::fmt;

use crate::config::DispatchConfig;
use crate::cost::{provider_for, CostProvider, CostProviderError};
use crate::model::{CostMatrix, DispatchProblem, DispatchRequest};
use crate::validation::{validate_request, ValidationError};

pub use aggregate::{Assignment, OverallResult, ResultAggregator, TierOutcome, TierStatus};
pub use problem::{ProblemBuilder, TierModel};
pub use scheduler::{ExclusionSet, TierScheduler};
pub use solver::{HighsSolver, MilpSolution, MilpSolver, SolveOutcome};

/// Run-level failure. Tier-level failures never surface here; they are
/// recorded in the tier's [TierOutcome] instead.
#[derive(Debug)]
pub enum DispatchError {
    Validation(ValidationError),
    CostProvider(CostProviderError),
}

impl DispatchError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::CostProvider(err) => err.code(),
        }
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::CostProvider(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for DispatchError {}

impl From<ValidationError> for DispatchError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<CostProviderError> for DispatchError {
    fn from(err: CostProviderError) -> Self {
        Self::CostProvider(err)
    }
}

/// Validate, fetch costs and run every tier with the configured HiGHS budget.
pub fn run_optimisation(
    request: &DispatchRequest,
    config: &DispatchConfig,
) -> Result<OverallResult, DispatchError> {
    let solver = HighsSolver::new(config.solver.tier_time_limit());
    run_optimisation_with(request, config, &solver)
}

pub fn run_optimisation_with<S: MilpSolver + ?Sized>(
    request: &DispatchRequest,
    config: &DispatchConfig,
    solver: &S,
) -> Result<OverallResult, DispatchError> {
    let problem = validate_request(request, config).map_err(|err| {
        tracing::warn!(issues = err.issues.len(), "rejecting invalid dispatch request");
        err
    })?;
    let provider = provider_for(&config.cost, request.costs.as_deref());
    let costs = fetch_costs(provider.as_ref(), &problem)?;
    let scheduler = TierScheduler::new(solver, config.tier_list(), config.slack_penalty);
    Ok(scheduler.run(&problem, &costs))
}

pub fn fetch_costs(
    provider: &dyn CostProvider,
    problem: &DispatchProblem,
) -> Result<CostMatrix, CostProviderError> {
    provider
        .costs(&problem.unit_locations(), &problem.incident_locations())
        .map_err(|err| {
            tracing::error!(provider = provider.name(), code = err.code(), %err, "cost provider failed");
            err
        })
}
