use anyhow::{Context, Result};
use clap::Parser;
use irrigation_core::{
    export_filename, CycleObserver, CycleReport, ExportFormat, IrrigationEvent, Mode, Scheduler,
    SimConfig,
};
use serde::Serialize;
use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Run the AI and traditional irrigation simulations side by side.
#[derive(Parser, Debug)]
#[command(name = "irrigation-sim")]
struct Cli {
    /// Cycles to run per mode
    #[arg(short, long, default_value_t = 20)]
    ticks: u64,

    #[arg(short, long)]
    seed: Option<u64>,

    /// Skip AI irrigation on rainy cycles
    #[arg(long)]
    forecast_aware: bool,

    /// Optional JSON file with a SimConfig; CLI flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long, default_value = "json")]
    format: ExportFormat,

    /// Directory for per-mode export files; prints a comparison when omitted
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Pace cycles with the wall clock instead of running them back to back
    #[arg(long)]
    realtime: bool,
}

#[derive(Default)]
struct LogObserver {
    irrigations: usize,
}

impl CycleObserver for LogObserver {
    fn on_irrigation(&mut self, _mode: Mode, _event: &IrrigationEvent) {
        self.irrigations += 1;
    }

    fn on_cycle(&mut self, mode: Mode, report: &CycleReport) {
        info!(
            %mode,
            cycle = report.cycle,
            weather = %report.weather,
            irrigated = report.irrigated,
            average_moisture = report.average_moisture,
            water_used = report.water_used,
            "cycle"
        );
    }
}

#[derive(Serialize)]
struct ModeReport {
    water_used: u64,
    final_average_moisture: u32,
    health_history: Vec<u32>,
}

#[derive(Serialize)]
struct Comparison {
    cycles: u64,
    forecast_aware: bool,
    ai: ModeReport,
    traditional: ModeReport,
}

fn load_config(cli: &Cli) -> Result<SimConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))?
        }
        None => SimConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    config.forecast_aware |= cli.forecast_aware;
    config.validate()?;
    Ok(config)
}

fn wall_clock_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn run(sched: &mut Scheduler<LogObserver>, ticks: u64, realtime: bool) {
    let period = sched.simulation(Mode::Ai).config().tick_period_ms;
    let done = |s: &Scheduler<LogObserver>| {
        Mode::ALL
            .iter()
            .all(|&m| s.simulation(m).cycle() >= ticks)
    };

    if realtime {
        let origin = Instant::now();
        let base_ms = wall_clock_ms();
        let now_ms = || base_ms + origin.elapsed().as_millis() as u64;
        for mode in Mode::ALL {
            sched.start(mode, now_ms());
        }
        while !done(sched) {
            if let Some(deadline) = sched.next_deadline() {
                let now = now_ms();
                if deadline > now {
                    std::thread::sleep(Duration::from_millis(deadline - now));
                }
            }
            sched.poll(now_ms());
        }
    } else {
        for mode in Mode::ALL {
            sched.start(mode, 0);
        }
        let mut now = 0;
        while !done(sched) {
            now += period;
            sched.poll(now);
        }
    }
    for mode in Mode::ALL {
        sched.stop(mode);
    }
}

fn mode_report(sched: &Scheduler<LogObserver>, mode: Mode) -> ModeReport {
    let sim = sched.simulation(mode);
    ModeReport {
        water_used: sim.water_used(),
        final_average_moisture: sim.average_moisture().unwrap_or(0),
        health_history: sim.health_history().to_vec(),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let forecast_aware = config.forecast_aware;
    let mut sched = Scheduler::try_with_observer(config, LogObserver::default())?;

    info!(ticks = cli.ticks, realtime = cli.realtime, "starting side-by-side run");
    run(&mut sched, cli.ticks, cli.realtime);
    info!(irrigations = sched.observer().irrigations, "run finished");

    match &cli.out {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating output dir {}", dir.display()))?;
            for mode in Mode::ALL {
                let path = dir.join(export_filename(mode, cli.format));
                let body = sched.simulation(mode).export(cli.format)?;
                std::fs::write(&path, body)
                    .with_context(|| format!("writing {}", path.display()))?;
                info!(path = %path.display(), "export written");
            }
        }
        None => {
            let comparison = Comparison {
                cycles: cli.ticks,
                forecast_aware,
                ai: mode_report(&sched, Mode::Ai),
                traditional: mode_report(&sched, Mode::Traditional),
            };
            println!("{}", serde_json::to_string_pretty(&comparison)?);
        }
    }
    Ok(())
}
