//! Typed records for one dispatch run: units, incidents, tiers and the cost matrix.
//! Wire-level request records live in [request] and are turned into these by
//! [crate::validation].

pub mod cost_matrix;
pub mod incident;
pub mod request;
pub mod tier;
pub mod unit;

pub use cost_matrix::{CostMatrix, CostMatrixError};
pub use incident::IncidentRequest;
pub use request::{DispatchRequest, IncidentRecord, UnitRecord};
pub use tier::{normalize_label, TierIndex, TierList, DEFAULT_TIERS};
pub use unit::{CategoryId, Location, Unit};

/// Validated input of one optimization run. Indices into `units` and
/// `incidents` are the unit and incident indices used by the cost matrix and
/// the solver.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchProblem {
    pub units: Vec<Unit>,
    pub incidents: Vec<IncidentRequest>,
    pub categories: usize,
}

impl DispatchProblem {
    pub fn unit_locations(&self) -> Vec<Location> {
        self.units.iter().map(|unit| unit.location).collect()
    }

    pub fn incident_locations(&self) -> Vec<Location> {
        self.incidents.iter().map(|incident| incident.location).collect()
    }

    /// Indices of incidents whose priority is `tier`, in input order.
    pub fn incidents_in_tier(&self, tier: TierIndex) -> Vec<usize> {
        self.incidents
            .iter()
            .enumerate()
            .filter(|(_, incident)| incident.tier == tier)
            .map(|(index, _)| index)
            .collect()
    }
}
