pub mod cycle;
pub mod metrics;

pub use metrics::*;

use crate::config::{SimConfig, SimConfigError};
use crate::field::Field;
use crate::mode::Mode;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use std::collections::VecDeque;
use std::{error::Error, fmt};

/// Per-mode simulation state: the field plus everything accumulated since the
/// last reset.
pub struct Simulation {
    mode: Mode,
    config: SimConfig,
    field: Field,
    rng: ChaCha12Rng,
    water_used: u64,
    health_history: Vec<u32>,
    irrigation_log: VecDeque<IrrigationEvent>,
    cycle: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SimulationInitError {
    Config(SimConfigError),
}

impl fmt::Display for SimulationInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationInitError::Config(e) => write!(f, "{}", e),
        }
    }
}

impl From<SimConfigError> for SimulationInitError {
    fn from(err: SimConfigError) -> Self {
        SimulationInitError::Config(err)
    }
}

impl Error for SimulationInitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SimulationInitError::Config(e) => Some(e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExperimentError {
    TooManySteps { max: usize, actual: usize },
}

impl fmt::Display for ExperimentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExperimentError::TooManySteps { max, actual } => {
                write!(f, "steps ({actual}) exceed supported maximum ({max})")
            }
        }
    }
}

impl Error for ExperimentError {}

impl Simulation {
    pub const MAX_EXPERIMENT_STEPS: usize = 1_000_000;

    pub fn new(mode: Mode, config: SimConfig) -> Self {
        Self::try_new(mode, config).unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn try_new(mode: Mode, config: SimConfig) -> Result<Self, SimulationInitError> {
        config.validate()?;
        let mut rng = ChaCha12Rng::seed_from_u64(config.seed.wrapping_add(mode.seed_offset()));
        let field = Self::fresh_field(&config, &mut rng);
        Ok(Self {
            mode,
            config,
            field,
            rng,
            water_used: 0,
            health_history: Vec::new(),
            irrigation_log: VecDeque::new(),
            cycle: 0,
        })
    }

    pub fn with_field(mode: Mode, config: SimConfig, field: Field) -> Self {
        Self::try_with_field(mode, config, field).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Start from a hand-built field instead of a randomized one. The RNG
    /// stream still follows the configured seed, and `reset` reseeds a field
    /// sized by the config.
    pub fn try_with_field(
        mode: Mode,
        config: SimConfig,
        field: Field,
    ) -> Result<Self, SimulationInitError> {
        config.validate()?;
        let rng = ChaCha12Rng::seed_from_u64(config.seed.wrapping_add(mode.seed_offset()));
        Ok(Self {
            mode,
            config,
            field,
            rng,
            water_used: 0,
            health_history: Vec::new(),
            irrigation_log: VecDeque::new(),
            cycle: 0,
        })
    }

    fn fresh_field(config: &SimConfig, rng: &mut ChaCha12Rng) -> Field {
        Field::initialize(
            config.cell_count(),
            config.initial_moisture_min,
            config.initial_moisture_max,
            rng,
        )
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn water_used(&self) -> u64 {
        self.water_used
    }

    pub fn health_history(&self) -> &[u32] {
        &self.health_history
    }

    /// Recent irrigation events, oldest first, bounded by
    /// `irrigation_log_capacity`.
    pub fn irrigation_log(&self) -> impl ExactSizeIterator<Item = &IrrigationEvent> + '_ {
        self.irrigation_log.iter()
    }

    pub(crate) fn record_irrigation(&mut self, event: IrrigationEvent) {
        let capacity = self.config.irrigation_log_capacity;
        if capacity == 0 {
            return;
        }
        while self.irrigation_log.len() >= capacity {
            self.irrigation_log.pop_front();
        }
        self.irrigation_log.push_back(event);
    }

    /// Number of cycles run since the last reset.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn average_moisture(&self) -> Option<u32> {
        self.field.average_moisture()
    }

    pub fn forecast_aware(&self) -> bool {
        self.config.forecast_aware
    }

    pub fn set_forecast_aware(&mut self, enabled: bool) {
        self.config.forecast_aware = enabled;
    }

    /// Clear counters, history and log, then reseed the field. The RNG keeps
    /// advancing, so consecutive resets yield different fields.
    pub fn reset(&mut self) {
        self.water_used = 0;
        self.health_history.clear();
        self.irrigation_log.clear();
        self.cycle = 0;
        self.field = Self::fresh_field(&self.config, &mut self.rng);
        tracing::debug!(mode = %self.mode, cells = self.field.len(), "simulation reset");
    }

    pub fn run_experiment(&mut self, steps: usize) -> RunSummary {
        self.try_run_experiment(steps)
            .unwrap_or_else(|e| panic!("{e}"))
    }

    /// Run `steps` cycles back to back, stamping events with the cycle index.
    pub fn try_run_experiment(&mut self, steps: usize) -> Result<RunSummary, ExperimentError> {
        if steps > Self::MAX_EXPERIMENT_STEPS {
            return Err(ExperimentError::TooManySteps {
                max: Self::MAX_EXPERIMENT_STEPS,
                actual: steps,
            });
        }
        let water_before = self.water_used;
        let mut samples = Vec::with_capacity(steps);
        for _ in 0..steps {
            let timestamp_ms = self.cycle.saturating_mul(self.config.tick_period_ms);
            samples.push(self.step(timestamp_ms));
        }
        let rainy_cycles = samples.iter().filter(|s| s.weather.is_rainy()).count();
        Ok(RunSummary {
            schema_version: 1,
            mode: self.mode,
            steps,
            final_average_moisture: self.average_moisture().unwrap_or(0),
            water_used: self.water_used - water_before,
            rainy_cycles,
            samples,
        })
    }
}
