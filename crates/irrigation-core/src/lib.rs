pub mod config;
pub mod export;
pub mod field;
pub mod mode;
pub mod observer;
pub mod scheduler;
pub mod weather;
pub mod world;

pub use config::{SimConfig, SimConfigError};
pub use export::{export_filename, ExportError, ExportFormat, ExportRecord};
pub use field::{Cell, Field, MoistureBand};
pub use mode::Mode;
pub use observer::{CycleObserver, NoopObserver, RecordingObserver};
pub use scheduler::{Command, RunState, Scheduler};
pub use weather::Weather;
pub use world::{CycleReport, IrrigationEvent, RunSummary, Simulation};
