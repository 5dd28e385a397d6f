use crate::config::SimConfig;
use crate::mode::Mode;
use crate::observer::{CycleObserver, NoopObserver};
use crate::world::{CycleReport, Simulation, SimulationInitError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::{error::Error, fmt};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    #[default]
    Stopped,
    Running,
}

/// Host-facing commands; each one targets a single mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    Start,
    Stop,
    Step,
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandParseError(pub String);

impl fmt::Display for CommandParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown command '{}'", self.0)
    }
}

impl Error for CommandParseError {}

impl FromStr for Command {
    type Err = CommandParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(Command::Start),
            "stop" => Ok(Command::Stop),
            "step" => Ok(Command::Step),
            "reset" => Ok(Command::Reset),
            other => Err(CommandParseError(other.to_string())),
        }
    }
}

struct Slot {
    simulation: Simulation,
    state: RunState,
    next_due_ms: Option<u64>,
}

impl Slot {
    fn new(simulation: Simulation) -> Self {
        Self {
            simulation,
            state: RunState::Stopped,
            next_due_ms: None,
        }
    }

    fn period_ms(&self) -> u64 {
        self.simulation.config().tick_period_ms
    }

    fn halt(&mut self) {
        self.state = RunState::Stopped;
        self.next_due_ms = None;
    }
}

/// Drives one independent simulation per mode on a fixed period.
///
/// The scheduler owns no thread or timer. The host supplies the current time
/// in milliseconds to [`Scheduler::poll`] from its own event loop; every
/// running mode whose deadline has passed runs exactly one cycle. A host that
/// falls more than a period behind gets a single cycle and a fresh deadline,
/// never a burst of catch-up ticks.
pub struct Scheduler<O: CycleObserver = NoopObserver> {
    slots: [Slot; 2],
    observer: O,
}

impl Scheduler<NoopObserver> {
    pub fn new(config: SimConfig) -> Self {
        Self::try_new(config).unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn try_new(config: SimConfig) -> Result<Self, SimulationInitError> {
        Self::try_with_observer(config, NoopObserver)
    }
}

impl<O: CycleObserver> Scheduler<O> {
    pub fn try_with_observer(config: SimConfig, observer: O) -> Result<Self, SimulationInitError> {
        let ai = Simulation::try_new(Mode::Ai, config.clone())?;
        let traditional = Simulation::try_new(Mode::Traditional, config)?;
        Ok(Self {
            slots: [Slot::new(ai), Slot::new(traditional)],
            observer,
        })
    }

    fn slot(&self, mode: Mode) -> &Slot {
        &self.slots[mode.index()]
    }

    fn slot_mut(&mut self, mode: Mode) -> &mut Slot {
        &mut self.slots[mode.index()]
    }

    /// Swap in a prepared simulation for its mode; the mode is stopped.
    ///
    /// The installed simulation keeps its own config: its `tick_period_ms`
    /// paces that mode from then on and its `grid_size` sizes the field on
    /// `reset`. Nothing is shared with the other mode's config.
    pub fn install(&mut self, simulation: Simulation) {
        let mode = simulation.mode();
        *self.slot_mut(mode) = Slot::new(simulation);
    }

    pub fn simulation(&self, mode: Mode) -> &Simulation {
        &self.slot(mode).simulation
    }

    pub fn state(&self, mode: Mode) -> RunState {
        self.slot(mode).state
    }

    pub fn is_running(&self, mode: Mode) -> bool {
        self.state(mode) == RunState::Running
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// (Re)arm the periodic timer; the first cycle fires one period after `now_ms`.
    pub fn start(&mut self, mode: Mode, now_ms: u64) {
        self.stop(mode);
        let slot = self.slot_mut(mode);
        slot.state = RunState::Running;
        slot.next_due_ms = Some(now_ms.saturating_add(slot.period_ms()));
        tracing::debug!(%mode, now_ms, "scheduler started");
    }

    pub fn stop(&mut self, mode: Mode) {
        let slot = self.slot_mut(mode);
        if slot.state == RunState::Running {
            slot.halt();
            tracing::debug!(%mode, "scheduler stopped");
        }
    }

    /// Run one cycle immediately, leaving the timer untouched.
    pub fn step(&mut self, mode: Mode, now_ms: u64) -> CycleReport {
        let slot = &mut self.slots[mode.index()];
        slot.simulation.step_observed(now_ms, &mut self.observer)
    }

    pub fn reset(&mut self, mode: Mode) {
        let slot = self.slot_mut(mode);
        slot.halt();
        slot.simulation.reset();
    }

    pub fn set_forecast_aware(&mut self, mode: Mode, enabled: bool) {
        self.slot_mut(mode).simulation.set_forecast_aware(enabled);
    }

    /// Run every overdue cycle; returns how many ran.
    pub fn poll(&mut self, now_ms: u64) -> usize {
        let mut ran = 0;
        for slot in &mut self.slots {
            let Some(due) = slot.next_due_ms else {
                continue;
            };
            if slot.state != RunState::Running || due > now_ms {
                continue;
            }
            slot.simulation.step_observed(now_ms, &mut self.observer);
            ran += 1;

            let period = slot.period_ms();
            let mut next = due.saturating_add(period);
            if next <= now_ms {
                tracing::debug!(
                    mode = %slot.simulation.mode(),
                    late_by_ms = now_ms - due,
                    "coalescing missed ticks"
                );
                next = now_ms.saturating_add(period);
            }
            slot.next_due_ms = Some(next);
        }
        ran
    }

    /// Earliest pending deadline across running modes.
    pub fn next_deadline(&self) -> Option<u64> {
        self.slots.iter().filter_map(|s| s.next_due_ms).min()
    }

    pub fn apply(&mut self, mode: Mode, command: Command, now_ms: u64) {
        match command {
            Command::Start => self.start(mode, now_ms),
            Command::Stop => self.stop(mode),
            Command::Step => {
                self.step(mode, now_ms);
            }
            Command::Reset => self.reset(mode),
        }
    }

    /// Name-addressed entry point for hosts; unknown modes are ignored.
    pub fn dispatch(&mut self, mode_name: &str, command: Command, now_ms: u64) -> bool {
        match mode_name.parse::<Mode>() {
            Ok(mode) => {
                self.apply(mode, command, now_ms);
                true
            }
            Err(e) => {
                tracing::debug!(error = %e, ?command, "ignoring command for unknown mode");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;
    use crate::observer::RecordingObserver;

    fn scheduler() -> Scheduler {
        Scheduler::new(SimConfig::default())
    }

    #[test]
    fn starts_stopped() {
        let sched = scheduler();
        for mode in Mode::ALL {
            assert_eq!(sched.state(mode), RunState::Stopped);
            assert_eq!(sched.simulation(mode).field().len(), 100);
        }
        assert_eq!(sched.next_deadline(), None);
    }

    #[test]
    fn running_mode_ticks_once_per_period() {
        let mut sched = scheduler();
        sched.start(Mode::Ai, 0);
        assert!(sched.is_running(Mode::Ai));
        assert_eq!(sched.poll(999), 0);
        assert_eq!(sched.poll(1000), 1);
        assert_eq!(sched.poll(1500), 0);
        assert_eq!(sched.poll(2000), 1);
        assert_eq!(sched.simulation(Mode::Ai).health_history().len(), 2);
        assert!(sched.simulation(Mode::Traditional).health_history().is_empty());
    }

    #[test]
    fn restart_replaces_existing_timer() {
        let mut sched = scheduler();
        sched.start(Mode::Ai, 0);
        sched.start(Mode::Ai, 700);
        assert_eq!(sched.next_deadline(), Some(1700));
        assert_eq!(sched.poll(1000), 0);
        assert_eq!(sched.poll(1700), 1);
    }

    #[test]
    fn stop_cancels_and_is_idempotent() {
        let mut sched = scheduler();
        sched.stop(Mode::Traditional);
        sched.start(Mode::Traditional, 0);
        sched.stop(Mode::Traditional);
        sched.stop(Mode::Traditional);
        assert_eq!(sched.state(Mode::Traditional), RunState::Stopped);
        assert_eq!(sched.poll(10_000), 0);
    }

    #[test]
    fn late_poll_coalesces_missed_ticks() {
        let mut sched = scheduler();
        sched.start(Mode::Ai, 0);
        assert_eq!(sched.poll(5_500), 1);
        assert_eq!(sched.next_deadline(), Some(6_500));
        assert_eq!(sched.simulation(Mode::Ai).cycle(), 1);
    }

    #[test]
    fn step_runs_once_without_touching_state() {
        let mut sched = scheduler();
        sched.step(Mode::Ai, 0);
        assert_eq!(sched.state(Mode::Ai), RunState::Stopped);
        assert_eq!(sched.simulation(Mode::Ai).cycle(), 1);

        sched.start(Mode::Ai, 0);
        sched.step(Mode::Ai, 300);
        assert!(sched.is_running(Mode::Ai));
        assert_eq!(sched.next_deadline(), Some(1000));
        assert_eq!(sched.simulation(Mode::Ai).cycle(), 2);
    }

    #[test]
    fn reset_stops_and_clears() {
        let mut sched = scheduler();
        sched.start(Mode::Traditional, 0);
        sched.poll(1000);
        sched.poll(2000);
        assert_eq!(sched.simulation(Mode::Traditional).water_used(), 200);

        sched.reset(Mode::Traditional);
        let sim = sched.simulation(Mode::Traditional);
        assert_eq!(sched.state(Mode::Traditional), RunState::Stopped);
        assert_eq!(sim.water_used(), 0);
        assert!(sim.health_history().is_empty());
        assert_eq!(sim.irrigation_log().len(), 0);
        assert_eq!(sim.field().len(), 100);
        assert!(sim
            .field()
            .cells()
            .iter()
            .all(|c| (30..=70).contains(&c.moisture)));
        assert_eq!(sched.poll(3000), 0);
    }

    #[test]
    fn modes_are_independent() {
        let mut sched = scheduler();
        let traditional_before = sched.simulation(Mode::Traditional).field().clone();
        sched.start(Mode::Ai, 0);
        sched.poll(1000);
        sched.reset(Mode::Ai);
        assert_eq!(
            sched.simulation(Mode::Traditional).field(),
            &traditional_before
        );
    }

    #[test]
    fn observer_sees_timestamped_events() {
        let config = SimConfig::default();
        let mut sched = Scheduler::try_with_observer(config.clone(), RecordingObserver::default())
            .expect("default config is valid");
        sched.install(Simulation::with_field(
            Mode::Ai,
            config,
            Field::from_moistures(&[10, 80]),
        ));
        sched.start(Mode::Ai, 0);
        sched.poll(1000);

        let observer = sched.observer();
        assert_eq!(observer.cycles.len(), 1);
        assert_eq!(observer.irrigations.len(), 1);
        let (mode, event) = observer.irrigations[0];
        assert_eq!(mode, Mode::Ai);
        assert_eq!(event.cell_id, 0);
        assert_eq!(event.timestamp_ms, 1000);
    }

    #[test]
    fn installed_simulation_keeps_its_own_period() {
        let mut sched = scheduler();
        let config = SimConfig {
            tick_period_ms: 250,
            grid_size: 2,
            ..SimConfig::default()
        };
        sched.install(Simulation::new(Mode::Traditional, config));
        sched.start(Mode::Traditional, 0);
        sched.start(Mode::Ai, 0);
        assert_eq!(sched.next_deadline(), Some(250));
        assert_eq!(sched.poll(500), 1);
        assert_eq!(sched.poll(1000), 2);
        assert_eq!(sched.simulation(Mode::Traditional).cycle(), 2);
        assert_eq!(sched.simulation(Mode::Ai).cycle(), 1);

        sched.reset(Mode::Traditional);
        assert_eq!(sched.simulation(Mode::Traditional).field().len(), 4);
    }

    #[test]
    fn dispatch_ignores_unknown_modes() {
        let mut sched = scheduler();
        assert!(!sched.dispatch("hybrid", Command::Start, 0));
        assert_eq!(sched.next_deadline(), None);

        assert!(sched.dispatch("traditional", Command::Start, 0));
        assert!(sched.is_running(Mode::Traditional));
        assert!(sched.dispatch("traditional", "stop".parse().expect("known command"), 10));
        assert!(!sched.is_running(Mode::Traditional));
    }

    #[test]
    fn forecast_toggle_reaches_simulation() {
        let mut sched = scheduler();
        assert!(!sched.simulation(Mode::Ai).forecast_aware());
        sched.set_forecast_aware(Mode::Ai, true);
        assert!(sched.simulation(Mode::Ai).forecast_aware());
        assert!(!sched.simulation(Mode::Traditional).forecast_aware());
    }
}
