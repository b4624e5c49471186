use serde::{Deserialize, Serialize};

use crate::model::tier::TierIndex;
use crate::model::unit::{CategoryId, Location};

/// An incident awaiting units. `requirements[k]` is the number of units of
/// category `k` the incident needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentRequest {
    pub id: u64,
    pub location: Location,
    pub tier: TierIndex,
    pub requirements: Vec<u32>,
}

impl IncidentRequest {
    pub fn required(&self, category: CategoryId) -> u32 {
        self.requirements.get(category.index()).copied().unwrap_or(0)
    }

    /// Summed as `u64`: each count only has to fit in `u32`.
    pub fn total_required(&self) -> u64 {
        self.requirements.iter().map(|&count| u64::from(count)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_required_does_not_overflow_on_large_counts() {
        let incident = IncidentRequest {
            id: 1,
            location: Location::new(0.0, 0.0),
            tier: TierIndex(0),
            requirements: vec![u32::MAX - 1, u32::MAX - 1],
        };
        assert_eq!(incident.total_required(), 2 * u64::from(u32::MAX - 1));
        assert_eq!(incident.required(CategoryId(1)), u32::MAX - 1);
        assert_eq!(incident.required(CategoryId(5)), 0);
    }
}
