use crate::cost::{CostProvider, CostProviderError};
use crate::model::{CostMatrix, Location};

/// Serves a matrix computed elsewhere, e.g. exported from a routing service.
/// The matrix must match the request's unit and incident counts exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixCostProvider {
    rows: Vec<Vec<f64>>,
}

impl MatrixCostProvider {
    pub fn new(rows: Vec<Vec<f64>>) -> Self {
        Self { rows }
    }
}

impl CostProvider for MatrixCostProvider {
    fn name(&self) -> &str {
        "matrix"
    }

    fn costs(
        &self,
        units: &[Location],
        incidents: &[Location],
    ) -> Result<CostMatrix, CostProviderError> {
        if self.rows.is_empty() && !units.is_empty() && !incidents.is_empty() {
            return Err(CostProviderError::Unavailable(
                "precomputed cost matrix is empty".to_string(),
            ));
        }
        Ok(CostMatrix::from_rows(&self.rows, units.len(), incidents.len())?)
    }
}
