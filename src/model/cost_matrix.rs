//! Dense unit-major cost matrix shared by every tier of a run.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub enum CostMatrixError {
    Shape {
        expected_units: usize,
        expected_incidents: usize,
        detail: String,
    },
    InvalidEntry {
        unit: usize,
        incident: usize,
        value: f64,
    },
}

impl fmt::Display for CostMatrixError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shape {
                expected_units,
                expected_incidents,
                detail,
            } => write!(
                f,
                "expected a {expected_units}x{expected_incidents} cost matrix: {detail}"
            ),
            Self::InvalidEntry {
                unit,
                incident,
                value,
            } => write!(
                f,
                "cost for unit {unit} and incident {incident} must be finite and non-negative, got {value}"
            ),
        }
    }
}

impl std::error::Error for CostMatrixError {}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostMatrix {
    units: usize,
    incidents: usize,
    values: Vec<f64>,
}

impl CostMatrix {
    /// Build from unit-major `values`; every entry must be finite and `>= 0`.
    pub fn new(units: usize, incidents: usize, values: Vec<f64>) -> Result<Self, CostMatrixError> {
        if values.len() != units * incidents {
            return Err(CostMatrixError::Shape {
                expected_units: units,
                expected_incidents: incidents,
                detail: format!("got {} entries", values.len()),
            });
        }
        if let Some(position) = values.iter().position(|v| !v.is_finite() || *v < 0.0) {
            return Err(CostMatrixError::InvalidEntry {
                unit: position / incidents.max(1),
                incident: position % incidents.max(1),
                value: values[position],
            });
        }
        Ok(Self {
            units,
            incidents,
            values,
        })
    }

    /// Build from one row per unit, checked against the expected shape.
    pub fn from_rows(
        rows: &[Vec<f64>],
        units: usize,
        incidents: usize,
    ) -> Result<Self, CostMatrixError> {
        if rows.len() != units {
            return Err(CostMatrixError::Shape {
                expected_units: units,
                expected_incidents: incidents,
                detail: format!("got {} rows", rows.len()),
            });
        }
        if let Some((index, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != incidents) {
            return Err(CostMatrixError::Shape {
                expected_units: units,
                expected_incidents: incidents,
                detail: format!("row {index} has {} columns", row.len()),
            });
        }
        Self::new(units, incidents, rows.iter().flatten().copied().collect())
    }

    pub fn units(&self) -> usize {
        self.units
    }

    pub fn incidents(&self) -> usize {
        self.incidents
    }

    pub fn get(&self, unit: usize, incident: usize) -> f64 {
        self.values[unit * self.incidents + incident]
    }

    pub fn max_cost(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }

    pub fn rows(&self) -> Vec<Vec<f64>> {
        if self.incidents == 0 {
            return vec![Vec::new(); self.units];
        }
        self.values.chunks(self.incidents).map(<[f64]>::to_vec).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_is_unit_major() {
        let matrix = CostMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]], 2, 2).unwrap();
        assert_eq!(matrix.get(0, 1), 2.0);
        assert_eq!(matrix.get(1, 0), 3.0);
        assert_eq!(matrix.max_cost(), 4.0);
    }

    #[test]
    fn from_rows_rejects_ragged_rows() {
        let err = CostMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0]], 2, 2).unwrap_err();
        assert!(matches!(err, CostMatrixError::Shape { .. }));
        assert!(err.to_string().contains("row 1 has 1 columns"));
    }

    #[test]
    fn new_rejects_negative_and_nan_entries() {
        let err = CostMatrix::new(1, 2, vec![1.0, -1.0]).unwrap_err();
        assert_eq!(
            err,
            CostMatrixError::InvalidEntry {
                unit: 0,
                incident: 1,
                value: -1.0
            }
        );
        assert!(CostMatrix::new(1, 1, vec![f64::NAN]).is_err());
    }

    #[test]
    fn empty_dimensions_are_allowed() {
        let matrix = CostMatrix::new(3, 0, Vec::new()).unwrap();
        assert_eq!(matrix.rows(), vec![Vec::<f64>::new(); 3]);
    }
}
