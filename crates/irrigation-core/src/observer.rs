use crate::mode::Mode;
use crate::world::{CycleReport, IrrigationEvent};

/// Receives notifications from the cycle engine.
///
/// Presentation layers (log panels, tile renderers) implement this instead of
/// polling; both hooks default to no-ops.
pub trait CycleObserver {
    fn on_irrigation(&mut self, _mode: Mode, _event: &IrrigationEvent) {}

    fn on_cycle(&mut self, _mode: Mode, _report: &CycleReport) {}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl CycleObserver for NoopObserver {}

/// Collects every notification; handy for hosts that drain events after
/// each poll.
#[derive(Clone, Debug, Default)]
pub struct RecordingObserver {
    pub irrigations: Vec<(Mode, IrrigationEvent)>,
    pub cycles: Vec<(Mode, CycleReport)>,
}

impl RecordingObserver {
    pub fn clear(&mut self) {
        self.irrigations.clear();
        self.cycles.clear();
    }
}

impl CycleObserver for RecordingObserver {
    fn on_irrigation(&mut self, mode: Mode, event: &IrrigationEvent) {
        self.irrigations.push((mode, *event));
    }

    fn on_cycle(&mut self, mode: Mode, report: &CycleReport) {
        self.cycles.push((mode, report.clone()));
    }
}
