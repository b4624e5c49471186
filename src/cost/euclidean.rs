use crate::cost::{pairwise, CostProvider, CostProviderError};
use crate::model::{CostMatrix, Location};

/// Straight-line distance between coordinate pairs, in coordinate units.
#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanCostProvider;

impl CostProvider for EuclideanCostProvider {
    fn name(&self) -> &str {
        "euclidean"
    }

    fn costs(
        &self,
        units: &[Location],
        incidents: &[Location],
    ) -> Result<CostMatrix, CostProviderError> {
        pairwise(units, incidents, |a, b| (a.lat - b.lat).hypot(a.lon - b.lon))
    }
}
