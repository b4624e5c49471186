//! Wire shape of an optimization request, as posted to the server, read by the
//! CLI and written by the spreadsheet importers.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitRecord {
    pub id: u64,
    pub lat: f64,
    pub lon: f64,
    /// Zero-based category. Signed so that negative input reaches validation.
    pub capability: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentRecord {
    pub id: u64,
    pub lat: f64,
    pub lon: f64,
    pub priority: String,
    /// Required unit count per category. Signed so that negative input reaches validation.
    pub requirements: Vec<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DispatchRequest {
    #[serde(alias = "cars", default)]
    pub units: Vec<UnitRecord>,
    #[serde(alias = "emergencies", default)]
    pub incidents: Vec<IncidentRecord>,
    /// Optional precomputed unit-major travel costs; replaces the configured provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub costs: Option<Vec<Vec<f64>>>,
}
