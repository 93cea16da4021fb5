//! # A340E Transmission Control Unit
//!
//! Bench entry point: loads the calibration, wires the simulation
//! endpoints to the control core, and runs the 50 Hz control loop against
//! a scripted drive. On target hardware the same [`CycleRunner`] is wired
//! to the real sensor provider and solenoid drivers instead.

use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tcu_common::state::SensorSnapshot;

use tcu_control_unit::config::{TcuConfig, load_config};
use tcu_control_unit::cycle::{CycleRunner, rt_setup};
use tcu_control_unit::diag::{DiagnosticSink, JsonLinesSink, NullSink};
use tcu_control_unit::hal::interface::{MonotonicClock, TracingActuator};
use tcu_control_unit::hal::sim::{DriveProfile, Keyframe, ProfileSensors};

#[derive(Debug, Parser)]
#[command(name = "tcu_control_unit", about = "A340E transmission control unit")]
struct Args {
    /// Calibration TOML; factory defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stop after this many seconds (default: run until interrupted).
    #[arg(long)]
    duration_s: Option<u64>,

    /// Write JSON-lines diagnostic snapshots to this file.
    #[arg(long)]
    snapshot_path: Option<PathBuf>,

    /// CPU core to pin the cycle task to (rt builds).
    #[arg(long, default_value_t = 1)]
    rt_cpu: usize,

    /// SCHED_FIFO priority for the cycle task (rt builds).
    #[arg(long, default_value_t = 80)]
    rt_priority: i32,
}

/// Scripted bench drive: launch, build to a cruise, a kickdown stab,
/// recover, then brake down to a stop.
fn demo_profile() -> DriveProfile {
    let base = SensorSnapshot {
        fluid_temp_c: 85.0,
        ..Default::default()
    };
    DriveProfile::new(
        base,
        vec![
            Keyframe { t_ms: 0, throttle_pct: 25.0, speed_kmh: 0.0, brake: false },
            Keyframe { t_ms: 8_000, throttle_pct: 30.0, speed_kmh: 60.0, brake: false },
            Keyframe { t_ms: 14_000, throttle_pct: 15.0, speed_kmh: 70.0, brake: false },
            Keyframe { t_ms: 16_000, throttle_pct: 15.0, speed_kmh: 70.0, brake: false },
            Keyframe { t_ms: 16_100, throttle_pct: 95.0, speed_kmh: 70.0, brake: false },
            Keyframe { t_ms: 20_000, throttle_pct: 60.0, speed_kmh: 105.0, brake: false },
            Keyframe { t_ms: 26_000, throttle_pct: 12.0, speed_kmh: 110.0, brake: false },
            Keyframe { t_ms: 32_000, throttle_pct: 2.0, speed_kmh: 40.0, brake: true },
            Keyframe { t_ms: 38_000, throttle_pct: 0.0, speed_kmh: 0.0, brake: true },
        ],
    )
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            let config = load_config(path)?;
            info!(path = %path.display(), "calibration loaded");
            config
        }
        None => {
            info!("no calibration file given, using factory defaults");
            TcuConfig::default()
        }
    };

    if let Err(e) = rt_setup(args.rt_cpu, args.rt_priority) {
        return Err(format!("RT setup failed: {e}").into());
    }

    let mut sink: Box<dyn DiagnosticSink> = match &args.snapshot_path {
        Some(path) => {
            let file = File::create(path)?;
            info!(path = %path.display(), "publishing snapshots");
            Box::new(JsonLinesSink::new(BufWriter::new(file)))
        }
        None => Box::new(NullSink),
    };

    let cycle_time_ms = config.cycle.cycle_time_ms as u64;
    let max_ticks = args.duration_s.map(|s| s * 1000 / cycle_time_ms.max(1));

    let clock = MonotonicClock::new();
    let sensors = ProfileSensors {
        profile: demo_profile(),
        clock: clock.clone(),
    };

    info!(
        cycle_time_ms,
        diag_interval = config.cycle.diag_interval,
        "control loop starting"
    );

    let mut runner = CycleRunner::new(config, clock, sensors, TracingActuator::default());
    runner.run(sink.as_mut(), max_ticks);

    info!(
        total_shifts = runner.stats.total_shifts,
        max_fluid_temp_c = runner.stats.max_fluid_temp_c,
        avg_cycle_us = runner.cycle_stats.avg_cycle_us(),
        max_cycle_us = runner.cycle_stats.max_cycle_us,
        overruns = runner.cycle_stats.overruns,
        "control loop finished"
    );
    Ok(())
}
