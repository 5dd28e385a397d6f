use irrigation_core::{Mode, SimConfig, Simulation};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use std::time::Instant;

fn main() {
    let grid_size = 100;
    let trials = 20;
    let steps = 500;
    println!(
        "Benchmarking {} trials of {} cycles on a {}x{} grid",
        trials, steps, grid_size, grid_size
    );

    let mut seed_rng = ChaCha12Rng::seed_from_u64(42);
    let seeds: Vec<u64> = (0..trials).map(|_| seed_rng.random()).collect();

    for mode in Mode::ALL {
        let mut water_total = 0u64;
        let mut moisture_total = 0u64;
        let start = Instant::now();
        for &seed in &seeds {
            let config = SimConfig {
                grid_size,
                seed,
                ..SimConfig::default()
            };
            let mut sim = Simulation::new(mode, config);
            let summary = sim.run_experiment(steps);
            water_total += summary.water_used;
            moisture_total += summary.final_average_moisture as u64;
        }
        let duration = start.elapsed();

        println!("[{}] time for {} trials: {:?}", mode, trials, duration);
        println!(
            "[{}] avg time per cycle: {:?}",
            mode,
            duration / (trials * steps) as u32
        );
        println!(
            "[{}] mean water used: {:.1}, mean final moisture: {:.1}",
            mode,
            water_total as f64 / trials as f64,
            moisture_total as f64 / trials as f64
        );
    }
}
