use crate::field::Cell;
use crate::mode::Mode;
use crate::world::Simulation;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::{error::Error, fmt};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFormatParseError(pub String);

impl fmt::Display for ExportFormatParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown export format '{}' (expected 'json' or 'csv')", self.0)
    }
}

impl Error for ExportFormatParseError {}

impl FromStr for ExportFormat {
    type Err = ExportFormatParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(ExportFormatParseError(other.to_string())),
        }
    }
}

#[derive(Debug)]
pub enum ExportError {
    Json(serde_json::Error),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Json(e) => write!(f, "failed to encode export as JSON: {e}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ExportError::Json(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::Json(err)
    }
}

/// Point-in-time snapshot of one simulation, in the layout the dashboard
/// download produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRecord {
    pub water_used: u64,
    pub health_history: Vec<u32>,
    pub field_snapshot: Vec<Cell>,
}

impl ExportRecord {
    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// One `id,moisture,health` row per cell, then a blank line and the
    /// water total.
    pub fn to_csv(&self) -> String {
        let mut out = String::from("id,moisture,health\n");
        for cell in &self.field_snapshot {
            out.push_str(&format!("{},{},{}\n", cell.id, cell.moisture, cell.health));
        }
        out.push_str(&format!("\nTotal Water Used,{}", self.water_used));
        out
    }

    pub fn render(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Json => self.to_json(),
            ExportFormat::Csv => Ok(self.to_csv()),
        }
    }
}

pub fn export_filename(mode: Mode, format: ExportFormat) -> String {
    format!("simulation_{}.{}", mode.as_str(), format.extension())
}

impl Simulation {
    pub fn export_record(&self) -> ExportRecord {
        ExportRecord {
            water_used: self.water_used(),
            health_history: self.health_history().to_vec(),
            field_snapshot: self.field().cells().to_vec(),
        }
    }

    pub fn export(&self, format: ExportFormat) -> Result<String, ExportError> {
        self.export_record().render(format)
    }
}
