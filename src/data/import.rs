//! Map spreadsheet rows onto [UnitRecord]s and [IncidentRecord]s.
//!
//! Source sheets number capabilities from 1 (or letter them A, B, ...); the
//! records use zero-based categories. Incidents carry only a type name, which
//! an [IncidentTypeSpec] table turns into a priority and required capabilities.
//! Rows that cannot be mapped are reported in `skipped`, never silently dropped.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::sheet::{read_rows, ImportError, Row};
use crate::model::{normalize_label, IncidentRecord, UnitRecord};

const ID_COLUMNS: &[&str] = &["id", "acc_id", "unit_id", "vehicle_id", "incident_id"];
const LAT_COLUMNS: &[&str] = &["latitude", "lat"];
const LON_COLUMNS: &[&str] = &["longitude", "lon", "lng", "long"];
const CAPABILITY_COLUMNS: &[&str] = &["capability", "capabilities", "category"];
const INCIDENT_TYPE_COLUMNS: &[&str] = &["incident_type", "incident type", "type", "incident"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    /// 1-based data row, header excluded.
    pub row: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitImport {
    pub units: Vec<UnitRecord>,
    pub skipped: Vec<SkippedRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncidentImport {
    pub incidents: Vec<IncidentRecord>,
    pub skipped: Vec<SkippedRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentTypeSpec {
    pub priority: String,
    /// 1-based capability numbers, one unit each.
    pub capabilities: Vec<usize>,
}

/// Incident types of the Perth incident export.
pub fn default_incident_types() -> BTreeMap<String, IncidentTypeSpec> {
    [
        ("Incident A", "IMMEDIATE", vec![1, 2, 3]),
        ("Incident B", "URGENT", vec![2, 4, 5]),
        ("Incident C", "ROUTINE", vec![1, 2]),
        ("Incident D", "NON URGENT", vec![4]),
        ("Incident E", "IMMEDIATE", vec![2, 3]),
    ]
    .into_iter()
    .map(|(name, priority, capabilities)| {
        (
            normalize_label(name),
            IncidentTypeSpec {
                priority: priority.to_string(),
                capabilities,
            },
        )
    })
    .collect()
}

/// Read an incident type table from YAML (or JSON), keyed by type name:
///
/// ```yaml
/// Incident A: { priority: IMMEDIATE, capabilities: [1, 2, 3] }
/// ```
pub fn load_incident_types(
    path: impl AsRef<Path>,
) -> Result<BTreeMap<String, IncidentTypeSpec>, ImportError> {
    let raw = fs::read_to_string(path).map_err(ImportError::Read)?;
    parse_incident_types(&raw)
}

pub fn parse_incident_types(raw: &str) -> Result<BTreeMap<String, IncidentTypeSpec>, ImportError> {
    let table: BTreeMap<String, IncidentTypeSpec> =
        serde_yaml::from_str(raw).map_err(ImportError::Mapping)?;
    Ok(table
        .into_iter()
        .map(|(name, spec)| (normalize_label(&name), spec))
        .collect())
}

/// `"A"` → 0, `"C"` → 2, `"1"` → 0, `"5"` → 4. Zero and other text are rejected.
pub fn parse_capability(raw: &str) -> Option<usize> {
    let raw = raw.trim();
    if let Ok(number) = raw.parse::<usize>() {
        return number.checked_sub(1);
    }
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), None) if letter.is_ascii_alphabetic() => {
            Some((letter.to_ascii_uppercase() as u8 - b'A') as usize)
        }
        _ => None,
    }
}

fn find_column(row: &Row, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .find(|alias| row.contains_key(**alias))
        .map(|alias| alias.to_string())
}

fn require_column(rows: &[Row], aliases: &'static [&'static str]) -> Result<String, ImportError> {
    rows.first()
        .and_then(|row| find_column(row, aliases))
        .ok_or(ImportError::MissingColumn(aliases[0]))
}

fn field<'r>(row: &'r Row, column: &str) -> &'r str {
    row.get(column).map(String::as_str).unwrap_or("").trim()
}

fn parse_id(raw: &str) -> Result<u64, String> {
    raw.parse::<u64>().map_err(|_| format!("invalid id '{raw}'"))
}

fn parse_coordinate(raw: &str, name: &str) -> Result<f64, String> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("invalid {name} '{raw}'"))
}

pub fn units_from_rows(rows: &[Row], categories: usize) -> Result<UnitImport, ImportError> {
    let mut out = UnitImport {
        units: Vec::new(),
        skipped: Vec::new(),
    };
    if rows.is_empty() {
        return Ok(out);
    }
    let id_col = require_column(rows, ID_COLUMNS)?;
    let lat_col = require_column(rows, LAT_COLUMNS)?;
    let lon_col = require_column(rows, LON_COLUMNS)?;
    let cap_col = require_column(rows, CAPABILITY_COLUMNS)?;

    for (index, row) in rows.iter().enumerate() {
        let parsed = (|| {
            let id = parse_id(field(row, &id_col))?;
            let lat = parse_coordinate(field(row, &lat_col), "latitude")?;
            let lon = parse_coordinate(field(row, &lon_col), "longitude")?;
            let raw_cap = field(row, &cap_col);
            let capability = parse_capability(raw_cap)
                .filter(|c| *c < categories)
                .ok_or_else(|| format!("invalid capability '{raw_cap}'"))?;
            Ok::<_, String>(UnitRecord {
                id,
                lat,
                lon,
                capability: capability as i64,
            })
        })();
        match parsed {
            Ok(unit) => out.units.push(unit),
            Err(reason) => out.skipped.push(SkippedRow {
                row: index + 1,
                reason,
            }),
        }
    }
    Ok(out)
}

pub fn incidents_from_rows(
    rows: &[Row],
    types: &BTreeMap<String, IncidentTypeSpec>,
    categories: usize,
) -> Result<IncidentImport, ImportError> {
    let mut out = IncidentImport {
        incidents: Vec::new(),
        skipped: Vec::new(),
    };
    if rows.is_empty() {
        return Ok(out);
    }
    let id_col = require_column(rows, ID_COLUMNS)?;
    let lat_col = require_column(rows, LAT_COLUMNS)?;
    let lon_col = require_column(rows, LON_COLUMNS)?;
    let type_col = require_column(rows, INCIDENT_TYPE_COLUMNS)?;

    for (index, row) in rows.iter().enumerate() {
        let parsed = (|| {
            let id = parse_id(field(row, &id_col))?;
            let lat = parse_coordinate(field(row, &lat_col), "latitude")?;
            let lon = parse_coordinate(field(row, &lon_col), "longitude")?;
            let incident_type = field(row, &type_col);
            let spec = types
                .get(&normalize_label(incident_type))
                .ok_or_else(|| format!("unknown incident type '{incident_type}'"))?;
            let mut requirements = vec![0_i64; categories];
            for capability in &spec.capabilities {
                let slot = capability
                    .checked_sub(1)
                    .and_then(|k| requirements.get_mut(k))
                    .ok_or_else(|| format!("capability {capability} outside 1..={categories}"))?;
                *slot += 1;
            }
            Ok::<_, String>(IncidentRecord {
                id,
                lat,
                lon,
                priority: spec.priority.clone(),
                requirements,
            })
        })();
        match parsed {
            Ok(incident) => out.incidents.push(incident),
            Err(reason) => out.skipped.push(SkippedRow {
                row: index + 1,
                reason,
            }),
        }
    }
    Ok(out)
}

pub fn import_units(path: impl AsRef<Path>, categories: usize) -> Result<UnitImport, ImportError> {
    let rows = read_rows(path)?;
    units_from_rows(&rows, categories)
}

pub fn import_incidents(
    path: impl AsRef<Path>,
    types: &BTreeMap<String, IncidentTypeSpec>,
    categories: usize,
) -> Result<IncidentImport, ImportError> {
    let rows = read_rows(path)?;
    incidents_from_rows(&rows, types, categories)
}

pub fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<(), ImportError> {
    let raw = serde_json::to_string_pretty(value).map_err(ImportError::Serialize)?;
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(ImportError::Write)?;
        }
    }
    fs::write(path, raw).map_err(ImportError::Write)
}
