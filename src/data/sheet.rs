//! Uniform row reader over `.csv` files and workbooks (`.xlsx`, `.xls`, `.ods`).
//! Headers are trimmed and lower-cased; the first worksheet is used.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use calamine::Reader;

pub type Row = HashMap<String, String>;

#[derive(Debug)]
pub enum ImportError {
    Csv(csv::Error),
    Workbook(calamine::Error),
    UnsupportedFormat(String),
    MissingColumn(&'static str),
    Read(std::io::Error),
    Mapping(serde_yaml::Error),
    Write(std::io::Error),
    Serialize(serde_json::Error),
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv(err) => write!(f, "failed to read csv: {err}"),
            Self::Workbook(err) => write!(f, "failed to read workbook: {err}"),
            Self::UnsupportedFormat(ext) => write!(f, "unsupported input format '{ext}'"),
            Self::MissingColumn(column) => write!(f, "missing required column '{column}'"),
            Self::Read(err) => write!(f, "failed to read import input: {err}"),
            Self::Mapping(err) => write!(f, "failed to parse incident type mapping: {err}"),
            Self::Write(err) => write!(f, "failed to write import output: {err}"),
            Self::Serialize(err) => write!(f, "failed to serialize import output: {err}"),
        }
    }
}

impl std::error::Error for ImportError {}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        Self::Workbook(err)
    }
}

fn header_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn cell_str(d: &calamine::Data) -> String {
    match d {
        calamine::Data::Empty => String::new(),
        calamine::Data::String(s) => s.trim().to_string(),
        calamine::Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        calamine::Data::Float(f) => format!("{f}"),
        calamine::Data::Int(i) => format!("{i}"),
        calamine::Data::Bool(b) => format!("{b}"),
        _ => format!("{:?}", d),
    }
}

pub fn read_rows(path: impl AsRef<Path>) -> Result<Vec<Row>, ImportError> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "csv" | "txt" => read_csv(path),
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => read_workbook(path),
        other => Err(ImportError::UnsupportedFormat(other.to_string())),
    }
}

pub fn read_csv(path: &Path) -> Result<Vec<Row>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(header_key).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Row = headers
            .iter()
            .cloned()
            .zip(record.iter().map(str::to_string))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

pub fn read_workbook(path: &Path) -> Result<Vec<Row>, ImportError> {
    let mut wb = calamine::open_workbook_auto(path)?;
    let Some(sheet) = wb.sheet_names().first().cloned() else {
        return Ok(Vec::new());
    };
    let range = wb.worksheet_range(&sheet)?;
    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header_row.iter().map(|c| header_key(&cell_str(c))).collect();
    Ok(rows
        .filter(|cells| cells.iter().any(|c| !matches!(c, calamine::Data::Empty)))
        .map(|cells| {
            headers
                .iter()
                .cloned()
                .zip(cells.iter().map(cell_str))
                .collect()
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_floats_render_without_fraction() {
        assert_eq!(cell_str(&calamine::Data::Float(12.0)), "12");
        assert_eq!(cell_str(&calamine::Data::Float(-31.95)), "-31.95");
        assert_eq!(cell_str(&calamine::Data::String(" A ".to_string())), "A");
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = read_rows("vehicles.parquet").unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedFormat(ext) if ext == "parquet"));
    }
}
