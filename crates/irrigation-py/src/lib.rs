use irrigation_core::{ExportFormat, Mode, SimConfig, Simulation};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

/// PyO3 module exposing irrigation-core to a Python dashboard.
#[pyfunction]
fn version() -> &'static str {
    "0.1.0"
}

fn build_simulation(mode: &str, seed: u64, forecast_aware: bool) -> PyResult<Simulation> {
    let mode: Mode = mode
        .parse()
        .map_err(|e| PyValueError::new_err(format!("{e}")))?;
    let config = SimConfig {
        seed,
        forecast_aware,
        ..SimConfig::default()
    };
    Simulation::try_new(mode, config).map_err(|e| PyValueError::new_err(format!("{e}")))
}

/// Run `steps` cycles and return the export in the requested format.
#[pyfunction]
#[pyo3(signature = (mode, steps, seed=42, forecast_aware=false, format="json"))]
fn simulate(
    mode: &str,
    steps: usize,
    seed: u64,
    forecast_aware: bool,
    format: &str,
) -> PyResult<String> {
    let format: ExportFormat = format
        .parse()
        .map_err(|e| PyValueError::new_err(format!("{e}")))?;
    let mut sim = build_simulation(mode, seed, forecast_aware)?;
    sim.try_run_experiment(steps)
        .map_err(|e| PyValueError::new_err(format!("{e}")))?;
    sim.export(format)
        .map_err(|e| PyValueError::new_err(format!("{e}")))
}

/// Run `steps` cycles and return the per-cycle summary as JSON.
#[pyfunction]
#[pyo3(signature = (mode, steps, seed=42, forecast_aware=false))]
fn run_summary(mode: &str, steps: usize, seed: u64, forecast_aware: bool) -> PyResult<String> {
    let mut sim = build_simulation(mode, seed, forecast_aware)?;
    let summary = sim
        .try_run_experiment(steps)
        .map_err(|e| PyValueError::new_err(format!("{e}")))?;
    serde_json::to_string(&summary).map_err(|e| PyValueError::new_err(format!("{e}")))
}

#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(version, m)?)?;
    m.add_function(wrap_pyfunction!(simulate, m)?)?;
    m.add_function(wrap_pyfunction!(run_summary, m)?)?;
    Ok(())
}
