//! Request validation: turns wire records into a typed [DispatchProblem] or a
//! list of field-level issues. Runs before any cost lookup or modeling.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::config::DispatchConfig;
use crate::model::{
    CategoryId, DispatchProblem, DispatchRequest, IncidentRequest, Location, TierList, Unit,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            field: field.into(),
            message: message.into(),
        });
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid request: {} issue(s)", self.issues.len())?;
        for issue in &self.issues {
            write!(f, "; {}: {}", issue.field, issue.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

pub fn validate_request(
    request: &DispatchRequest,
    config: &DispatchConfig,
) -> Result<DispatchProblem, ValidationError> {
    validate_with_tiers(request, &config.tier_list(), config.categories)
}

pub fn validate_with_tiers(
    request: &DispatchRequest,
    tiers: &TierList,
    categories: usize,
) -> Result<DispatchProblem, ValidationError> {
    let mut errors = ValidationError { issues: Vec::new() };

    let mut unit_ids = HashSet::new();
    let mut units = Vec::with_capacity(request.units.len());
    for (index, record) in request.units.iter().enumerate() {
        let field = format!("units[{index}]");
        if !unit_ids.insert(record.id) {
            errors.push(format!("{field}.id"), format!("duplicate unit id {}", record.id));
        }
        let location = Location::new(record.lat, record.lon);
        if !location.is_finite() {
            errors.push(format!("{field}.location"), "lat and lon must be finite");
        }
        if record.capability < 0 || record.capability as u64 >= categories as u64 {
            let message = match categories.checked_sub(1) {
                Some(highest) => format!("must be between 0 and {highest}, got {}", record.capability),
                None => format!("no capability categories configured, got {}", record.capability),
            };
            errors.push(format!("{field}.capability"), message);
            continue;
        }
        units.push(Unit {
            id: record.id,
            location,
            category: CategoryId(record.capability as usize),
        });
    }

    let mut incident_ids = HashSet::new();
    let mut incidents = Vec::with_capacity(request.incidents.len());
    for (index, record) in request.incidents.iter().enumerate() {
        let field = format!("incidents[{index}]");
        if !incident_ids.insert(record.id) {
            errors.push(format!("{field}.id"), format!("duplicate incident id {}", record.id));
        }
        let location = Location::new(record.lat, record.lon);
        if !location.is_finite() {
            errors.push(format!("{field}.location"), "lat and lon must be finite");
        }
        let tier = tiers.resolve(&record.priority);
        if tier.is_none() {
            errors.push(
                format!("{field}.priority"),
                format!(
                    "unknown priority '{}', expected one of: {}",
                    record.priority,
                    tiers.labels().join(", ")
                ),
            );
        }
        if record.requirements.len() != categories {
            errors.push(
                format!("{field}.requirements"),
                format!(
                    "expected {categories} entries, got {}",
                    record.requirements.len()
                ),
            );
        }
        let mut requirements = Vec::with_capacity(record.requirements.len());
        for (category, count) in record.requirements.iter().enumerate() {
            match u32::try_from(*count) {
                Ok(count) => requirements.push(count),
                Err(_) => errors.push(
                    format!("{field}.requirements[{category}]"),
                    format!("must be a non-negative count, got {count}"),
                ),
            }
        }
        if let Some(tier) = tier {
            incidents.push(IncidentRequest {
                id: record.id,
                location,
                tier,
                requirements,
            });
        }
    }

    if !errors.issues.is_empty() {
        return Err(errors);
    }

    Ok(DispatchProblem {
        units,
        incidents,
        categories,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{IncidentRecord, TierIndex, UnitRecord};

    fn unit(id: u64, capability: i64) -> UnitRecord {
        UnitRecord {
            id,
            lat: 0.0,
            lon: 0.0,
            capability,
        }
    }

    fn incident(id: u64, priority: &str, requirements: Vec<i64>) -> IncidentRecord {
        IncidentRecord {
            id,
            lat: 1.0,
            lon: 1.0,
            priority: priority.to_string(),
            requirements,
        }
    }

    fn fields(err: &ValidationError) -> Vec<&str> {
        err.issues.iter().map(|issue| issue.field.as_str()).collect()
    }

    #[test]
    fn valid_request_becomes_typed_problem() {
        let request = DispatchRequest {
            units: vec![unit(10, 2)],
            incidents: vec![incident(20, "routine", vec![0, 0, 1])],
            costs: None,
        };
        let problem = validate_with_tiers(&request, &TierList::default(), 3).unwrap();
        assert_eq!(problem.units[0].category, CategoryId(2));
        assert_eq!(problem.incidents[0].tier, TierIndex(2));
        assert_eq!(problem.incidents[0].requirements, vec![0, 0, 1]);
    }

    #[test]
    fn reports_every_malformed_field() {
        let request = DispatchRequest {
            units: vec![unit(1, 0), unit(1, 9)],
            incidents: vec![
                incident(5, "Critical", vec![1, 0, 0]),
                incident(6, "Urgent", vec![1, -2]),
            ],
            costs: None,
        };
        let err = validate_with_tiers(&request, &TierList::default(), 3).unwrap_err();
        assert_eq!(
            fields(&err),
            vec![
                "units[1].id",
                "units[1].capability",
                "incidents[0].priority",
                "incidents[1].requirements",
                "incidents[1].requirements[1]",
            ]
        );
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        let mut record = unit(1, 0);
        record.lat = f64::INFINITY;
        let request = DispatchRequest {
            units: vec![record],
            incidents: Vec::new(),
            costs: None,
        };
        let err = validate_with_tiers(&request, &TierList::default(), 5).unwrap_err();
        assert_eq!(fields(&err), vec!["units[0].location"]);
    }

    #[test]
    fn zero_categories_rejects_every_unit_without_panicking() {
        let request = DispatchRequest {
            units: vec![unit(1, 0)],
            incidents: Vec::new(),
            costs: None,
        };
        let err = validate_with_tiers(&request, &TierList::default(), 0).unwrap_err();
        assert_eq!(fields(&err), vec!["units[0].capability"]);
        assert!(err.issues[0].message.contains("no capability categories"));
    }
}
