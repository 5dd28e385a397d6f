use serde::{Deserialize, Serialize};
use std::{error::Error, fmt};

/// Tunable parameters for one irrigation simulation.
///
/// Defaults reproduce the 10x10 demo field: moisture seeded in [30, 70],
/// 5 points of evaporation per tick, 15 points of rain, and irrigation
/// gains of 30 (AI) and 20 (traditional).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub grid_size: usize,
    pub initial_moisture_min: u8,
    pub initial_moisture_max: u8,
    /// AI mode irrigates cells strictly below this level.
    pub moisture_threshold: u8,
    pub evaporation: u8,
    pub rain_gain: u8,
    pub ai_irrigation_gain: u8,
    pub traditional_irrigation_gain: u8,
    /// When set, AI mode skips irrigation on rainy ticks.
    pub forecast_aware: bool,
    pub tick_period_ms: u64,
    /// Most recent irrigation events kept in memory; 0 disables the log.
    pub irrigation_log_capacity: usize,
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            grid_size: 10,
            initial_moisture_min: 30,
            initial_moisture_max: 70,
            moisture_threshold: 30,
            evaporation: 5,
            rain_gain: 15,
            ai_irrigation_gain: 30,
            traditional_irrigation_gain: 20,
            forecast_aware: false,
            tick_period_ms: 1000,
            irrigation_log_capacity: 1000,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimConfigError {
    ZeroGridSize,
    GridTooLarge { max: usize, actual: usize },
    InvalidMoistureRange { min: u8, max: u8 },
    MoistureOutOfRange { field: &'static str, value: u8 },
    ZeroTickPeriod,
}

impl fmt::Display for SimConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimConfigError::ZeroGridSize => write!(f, "grid_size must be positive"),
            SimConfigError::GridTooLarge { max, actual } => {
                write!(f, "grid_size ({actual}) exceeds supported maximum ({max})")
            }
            SimConfigError::InvalidMoistureRange { min, max } => write!(
                f,
                "initial_moisture_min ({min}) must not exceed initial_moisture_max ({max})"
            ),
            SimConfigError::MoistureOutOfRange { field, value } => {
                write!(f, "{field} ({value}) must be within 0..=100")
            }
            SimConfigError::ZeroTickPeriod => write!(f, "tick_period_ms must be positive"),
        }
    }
}

impl Error for SimConfigError {}

impl SimConfig {
    pub const MAX_MOISTURE: u8 = 100;
    pub const MAX_GRID_SIZE: usize = 1024;

    pub fn validate(&self) -> Result<(), SimConfigError> {
        if self.grid_size == 0 {
            return Err(SimConfigError::ZeroGridSize);
        }
        if self.grid_size > Self::MAX_GRID_SIZE {
            return Err(SimConfigError::GridTooLarge {
                max: Self::MAX_GRID_SIZE,
                actual: self.grid_size,
            });
        }
        for (field, value) in [
            ("initial_moisture_min", self.initial_moisture_min),
            ("initial_moisture_max", self.initial_moisture_max),
            ("moisture_threshold", self.moisture_threshold),
        ] {
            if value > Self::MAX_MOISTURE {
                return Err(SimConfigError::MoistureOutOfRange { field, value });
            }
        }
        if self.initial_moisture_min > self.initial_moisture_max {
            return Err(SimConfigError::InvalidMoistureRange {
                min: self.initial_moisture_min,
                max: self.initial_moisture_max,
            });
        }
        if self.tick_period_ms == 0 {
            return Err(SimConfigError::ZeroTickPeriod);
        }
        Ok(())
    }

    pub fn cell_count(&self) -> usize {
        self.grid_size * self.grid_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.cell_count(), 100);
    }

    #[test]
    fn rejects_zero_grid() {
        let config = SimConfig {
            grid_size: 0,
            ..SimConfig::default()
        };
        assert_eq!(config.validate(), Err(SimConfigError::ZeroGridSize));
    }

    #[test]
    fn rejects_oversized_grid() {
        let config = SimConfig {
            grid_size: SimConfig::MAX_GRID_SIZE + 1,
            ..SimConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SimConfigError::GridTooLarge { .. })
        ));
    }

    #[test]
    fn rejects_inverted_moisture_bounds() {
        let config = SimConfig {
            initial_moisture_min: 80,
            initial_moisture_max: 20,
            ..SimConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(SimConfigError::InvalidMoistureRange { min: 80, max: 20 })
        );
    }

    #[test]
    fn rejects_threshold_above_hundred() {
        let config = SimConfig {
            moisture_threshold: 101,
            ..SimConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(SimConfigError::MoistureOutOfRange {
                field: "moisture_threshold",
                value: 101
            })
        );
    }

    #[test]
    fn rejects_zero_tick_period() {
        let config = SimConfig {
            tick_period_ms: 0,
            ..SimConfig::default()
        };
        assert_eq!(config.validate(), Err(SimConfigError::ZeroTickPeriod));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: SimConfig = serde_json::from_str(r#"{"grid_size": 3, "forecast_aware": true}"#)
            .expect("config should deserialize");
        assert_eq!(config.grid_size, 3);
        assert!(config.forecast_aware);
        assert_eq!(config.evaporation, 5);
        assert_eq!(config.tick_period_ms, 1000);
    }
}
