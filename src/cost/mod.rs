//! Travel-cost acquisition. A [CostProvider] turns ordered unit and incident
//! locations into a non-negative [CostMatrix]. Failures are reported as
//! [CostProviderError] and never replaced by zeros.

pub mod euclidean;
pub mod haversine;
pub mod matrix;

use std::fmt;

use crate::config::{CostConfig, CostKind};
use crate::model::{CostMatrix, CostMatrixError, Location};

pub use euclidean::EuclideanCostProvider;
pub use haversine::HaversineCostProvider;
pub use matrix::MatrixCostProvider;

#[derive(Debug, Clone, PartialEq)]
pub enum CostProviderError {
    /// The cost source could not be reached or produced no data.
    Unavailable(String),
    /// The cost source answered with data of the wrong shape or invalid entries.
    Malformed(String),
}

impl CostProviderError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "cost_provider_unavailable",
            Self::Malformed(_) => "cost_provider_malformed",
        }
    }
}

impl fmt::Display for CostProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(msg) => write!(f, "cost provider unavailable: {msg}"),
            Self::Malformed(msg) => write!(f, "cost provider returned malformed data: {msg}"),
        }
    }
}

impl std::error::Error for CostProviderError {}

impl From<CostMatrixError> for CostProviderError {
    fn from(err: CostMatrixError) -> Self {
        Self::Malformed(err.to_string())
    }
}

pub trait CostProvider {
    fn name(&self) -> &str;

    /// Cost of sending each unit (rows) to each incident (columns).
    fn costs(
        &self,
        units: &[Location],
        incidents: &[Location],
    ) -> Result<CostMatrix, CostProviderError>;
}

/// Build a matrix by evaluating `cost` for every (unit, incident) pair, unit-major.
pub(crate) fn pairwise<F>(
    units: &[Location],
    incidents: &[Location],
    cost: F,
) -> Result<CostMatrix, CostProviderError>
where
    F: Fn(&Location, &Location) -> f64,
{
    let values = units
        .iter()
        .flat_map(|unit| incidents.iter().map(move |incident| (unit, incident)))
        .map(|(unit, incident)| cost(unit, incident))
        .collect();
    Ok(CostMatrix::new(units.len(), incidents.len(), values)?)
}

/// Provider for a request: its own precomputed matrix when present, otherwise the
/// configured geometric provider.
pub fn provider_for(config: &CostConfig, precomputed: Option<&[Vec<f64>]>) -> Box<dyn CostProvider> {
    if let Some(rows) = precomputed {
        return Box::new(MatrixCostProvider::new(rows.to_vec()));
    }
    match config.kind {
        CostKind::Euclidean => Box::new(EuclideanCostProvider),
        CostKind::Haversine => Box::new(HaversineCostProvider::new(config.average_speed_kmh)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precomputed_matrix_takes_precedence() {
        let rows = vec![vec![1.0]];
        let provider = provider_for(&CostConfig::default(), Some(&rows));
        assert_eq!(provider.name(), "matrix");
        let provider = provider_for(&CostConfig::default(), None);
        assert_eq!(provider.name(), "euclidean");
    }

    #[test]
    fn error_codes_are_distinct() {
        assert_ne!(
            CostProviderError::Unavailable(String::new()).code(),
            CostProviderError::Malformed(String::new()).code()
        );
    }
}
