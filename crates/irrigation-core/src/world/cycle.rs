use super::metrics::{CycleReport, IrrigationEvent};
use super::Simulation;
use crate::mode::Mode;
use crate::observer::{CycleObserver, NoopObserver};
use crate::weather::Weather;

impl Simulation {
    /// Run one cycle with a freshly drawn weather.
    pub fn step(&mut self, now_ms: u64) -> CycleReport {
        self.step_observed(now_ms, &mut NoopObserver)
    }

    pub fn step_observed(&mut self, now_ms: u64, observer: &mut dyn CycleObserver) -> CycleReport {
        let weather = Weather::draw(&mut self.rng);
        self.run_cycle_with_weather(weather, now_ms, observer)
    }

    /// Evaporation, rain, irrigation and aggregation under a fixed weather.
    pub fn run_cycle_with_weather(
        &mut self,
        weather: Weather,
        now_ms: u64,
        observer: &mut dyn CycleObserver,
    ) -> CycleReport {
        self.apply_evaporation();
        if weather.is_rainy() {
            self.apply_rain();
        }
        let irrigated = self.apply_irrigation(weather, now_ms, observer);

        let average_moisture = self.field.average_moisture().unwrap_or(0);
        self.health_history.push(average_moisture);
        self.cycle += 1;

        let report = CycleReport {
            cycle: self.cycle,
            weather,
            irrigated,
            average_moisture,
            water_used: self.water_used,
        };
        tracing::debug!(
            mode = %self.mode,
            cycle = report.cycle,
            %weather,
            irrigated,
            average_moisture,
            water_used = self.water_used,
            "cycle complete"
        );
        observer.on_cycle(self.mode, &report);
        report
    }

    fn apply_evaporation(&mut self) {
        let amount = self.config.evaporation;
        for cell in self.field.cells_mut() {
            cell.dry(amount);
        }
    }

    fn apply_rain(&mut self) {
        let amount = self.config.rain_gain;
        for cell in self.field.cells_mut() {
            cell.wet(amount);
        }
    }

    fn should_irrigate(&self, moisture: u8, weather: Weather) -> bool {
        match self.mode {
            Mode::Ai => {
                moisture < self.config.moisture_threshold
                    && (!self.config.forecast_aware || !weather.is_rainy())
            }
            Mode::Traditional => true,
        }
    }

    fn irrigation_gain(&self) -> u8 {
        match self.mode {
            Mode::Ai => self.config.ai_irrigation_gain,
            Mode::Traditional => self.config.traditional_irrigation_gain,
        }
    }

    /// Returns the number of cells irrigated; each one costs one unit of water.
    fn apply_irrigation(
        &mut self,
        weather: Weather,
        now_ms: u64,
        observer: &mut dyn CycleObserver,
    ) -> usize {
        let gain = self.irrigation_gain();
        let mut irrigated = 0;
        for idx in 0..self.field.len() {
            let moisture = self.field.cells()[idx].moisture;
            if !self.should_irrigate(moisture, weather) {
                continue;
            }
            let cell = &mut self.field.cells_mut()[idx];
            cell.wet(gain);
            let event = IrrigationEvent {
                cell_id: cell.id,
                timestamp_ms: now_ms,
            };
            self.water_used += 1;
            irrigated += 1;
            tracing::trace!(mode = %self.mode, cell_id = event.cell_id, "cell irrigated");
            observer.on_irrigation(self.mode, &event);
            self.record_irrigation(event);
        }
        irrigated
    }
}
