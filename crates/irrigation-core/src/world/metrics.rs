use crate::mode::Mode;
use crate::weather::Weather;
use serde::{Deserialize, Serialize};

/// A single cell irrigation, stamped with the host time of the tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrrigationEvent {
    pub cell_id: u32,
    pub timestamp_ms: u64,
}

/// Outcome of one cycle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    pub cycle: u64,
    pub weather: Weather,
    pub irrigated: usize,
    pub average_moisture: u32,
    /// Cumulative water used after this cycle.
    pub water_used: u64,
}

fn default_schema_version() -> u32 {
    1
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSummary {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub mode: Mode,
    pub steps: usize,
    pub final_average_moisture: u32,
    pub water_used: u64,
    #[serde(default)]
    pub rainy_cycles: usize,
    pub samples: Vec<CycleReport>,
}
