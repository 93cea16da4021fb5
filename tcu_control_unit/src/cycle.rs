//! Deterministic control cycle: snapshot → decide → actuate.
//!
//! One `CycleRunner` owns every piece of runtime state and the three
//! hardware endpoints. `tick()` is the whole control law for one period
//! and is run-to-completion; `run()` paces it at the configured rate and
//! publishes diagnostics.
//!
//! ## RT setup
//!
//! On target hardware (`rt` feature) the runner locks its pages, pins to a
//! core, and takes SCHED_FIFO before entering the loop. On the bench all
//! of that is a no-op and `std::thread::sleep` paces the cycle.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use tcu_common::diag::{ShiftEvent, TcuStats};
use tcu_common::error::FaultFlags;
use tcu_common::state::{Gear, SensorSnapshot, ShiftPhase};

use crate::config::TcuConfig;
use crate::control::adaptive::{AdaptiveTrim, ShiftObservation};
use crate::control::kickdown::KickdownDetector;
use crate::control::{lockup, pressure, slip};
use crate::diag::DiagnosticSink;
use crate::hal::interface::{Actuator, Clock, SensorProvider};
use crate::safety::LimpMonitor;
use crate::shift;

// ─── Cycle statistics ───────────────────────────────────────────────

/// O(1) per-cycle timing statistics. Updated every cycle, no allocation.
#[derive(Debug, Clone)]
pub struct CycleStats {
    /// Total cycles executed.
    pub cycle_count: u64,
    /// Last cycle work time [µs].
    pub last_cycle_us: u64,
    /// Minimum cycle work time [µs].
    pub min_cycle_us: u64,
    /// Maximum cycle work time [µs].
    pub max_cycle_us: u64,
    /// Running sum for average computation.
    pub sum_cycle_us: u64,
    /// Cycles whose work time exceeded the period budget.
    pub overruns: u64,
}

impl CycleStats {
    pub const fn new() -> Self {
        Self {
            cycle_count: 0,
            last_cycle_us: 0,
            min_cycle_us: u64::MAX,
            max_cycle_us: 0,
            sum_cycle_us: 0,
            overruns: 0,
        }
    }

    /// Record one cycle's work time against the period budget.
    #[inline]
    pub fn record(&mut self, duration_us: u64, budget_us: u64) -> bool {
        self.cycle_count += 1;
        self.last_cycle_us = duration_us;
        self.min_cycle_us = self.min_cycle_us.min(duration_us);
        self.max_cycle_us = self.max_cycle_us.max(duration_us);
        self.sum_cycle_us += duration_us;
        let overrun = duration_us > budget_us;
        if overrun {
            self.overruns += 1;
        }
        overrun
    }

    /// Average cycle work time [µs] (zero before the first cycle).
    #[inline]
    pub fn avg_cycle_us(&self) -> u64 {
        if self.cycle_count == 0 {
            0
        } else {
            self.sum_cycle_us / self.cycle_count
        }
    }
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Transmission state ─────────────────────────────────────────────

/// The single mutable state of the control core.
///
/// Created once at power-on, mutated only by the cycle task. Adaptive
/// trims are volatile; a power cycle starts from zero.
#[derive(Debug, Clone)]
pub struct TransmissionState {
    pub current_gear: Gear,
    pub target_gear: Gear,
    pub shift_phase: ShiftPhase,
    /// Start of the current non-stable episode [ms].
    pub shift_start_ms: u64,
    /// Time of the last commanded solenoid transition [ms].
    pub last_shift_completed_ms: u64,
    /// Last measured episode duration [ms].
    pub last_shift_duration_ms: u32,
    /// Gear engaged when the current episode began.
    pub shift_from: Gear,
    /// Kickdown observed at any tick of the current episode.
    pub episode_kickdown: bool,
    /// Kickdown observed this tick.
    pub kickdown_active: bool,
    pub lockup_engaged: bool,
    pub lockup_duty_pct: u8,
    pub accumulator_duty_pct: u8,
    /// Degraded hold-third operation; latched, cleared only by operator.
    pub limp_mode: bool,
    pub faults: FaultFlags,
    /// Learned per-upshift firmness trims.
    pub trim: AdaptiveTrim,
}

impl Default for TransmissionState {
    fn default() -> Self {
        Self {
            current_gear: Gear::First,
            target_gear: Gear::First,
            shift_phase: ShiftPhase::Stable,
            shift_start_ms: 0,
            last_shift_completed_ms: 0,
            last_shift_duration_ms: 0,
            shift_from: Gear::First,
            episode_kickdown: false,
            kickdown_active: false,
            lockup_engaged: false,
            lockup_duty_pct: 0,
            accumulator_duty_pct: 50,
            limp_mode: false,
            faults: FaultFlags::empty(),
            trim: AdaptiveTrim::default(),
        }
    }
}

// ─── Cycle runner ───────────────────────────────────────────────────

/// Owns the control state, calibration, and hardware endpoints, and runs
/// the periodic control law.
pub struct CycleRunner<C: Clock, S: SensorProvider, A: Actuator> {
    pub config: TcuConfig,
    pub state: TransmissionState,
    pub kickdown: KickdownDetector,
    pub limp_monitor: LimpMonitor,
    pub stats: TcuStats,
    pub cycle_stats: CycleStats,
    pub clock: C,
    pub sensors: S,
    pub actuator: A,
    /// Snapshot the last tick ran on.
    pub last_snapshot: SensorSnapshot,
    /// Converter slip from the last tick [%] (reporting only).
    pub slip_pct: f64,
    started_ms: u64,
}

impl<C: Clock, S: SensorProvider, A: Actuator> CycleRunner<C, S, A> {
    /// Build a runner and apply the power-on solenoid pattern (first gear,
    /// everything released).
    pub fn new(config: TcuConfig, clock: C, sensors: S, mut actuator: A) -> Self {
        let state = TransmissionState::default();
        let (s1, s2) = state.current_gear.solenoids();
        actuator.set_gear_solenoids(s1, s2);
        actuator.set_lockup_duty(0);
        let started_ms = clock.now_ms();

        Self {
            config,
            state,
            kickdown: KickdownDetector::new(),
            limp_monitor: LimpMonitor::new(),
            stats: TcuStats::default(),
            cycle_stats: CycleStats::new(),
            clock,
            sensors,
            actuator,
            last_snapshot: SensorSnapshot::default(),
            slip_pct: 0.0,
            started_ms,
        }
    }

    /// Seconds since power-on.
    pub fn uptime_s(&self) -> u64 {
        self.clock.now_ms().saturating_sub(self.started_ms) / 1000
    }

    /// Execute one control period. Run-to-completion, no blocking.
    pub fn tick(&mut self) {
        let now_ms = self.clock.now_ms();
        let snap = self.sensors.snapshot().clamped();
        self.last_snapshot = snap;
        self.stats.observe_temp(snap.fluid_temp_c);

        // Defensive invariant check before anything acts on the state:
        // every stable tick ends with target == current, so a disagreement
        // at tick entry means the gear state was corrupted in between.
        if self.state.shift_phase == ShiftPhase::Stable
            && self.state.current_gear != self.state.target_gear
        {
            self.state.faults |= FaultFlags::GEAR_FAULT;
        }

        // Limp supervision: critical faults latch until the operator
        // clears them.
        let faults = self.limp_monitor.evaluate(&self.config.limp, &snap, now_ms);
        if !faults.is_empty() && !self.state.faults.contains(faults) {
            warn!(?faults, "fault latched");
        }
        self.state.faults |= faults;
        if self.state.faults.has_critical() && !self.state.limp_mode {
            warn!("limp mode latched: holding third gear");
            self.state.limp_mode = true;
        }

        self.state.kickdown_active =
            self.kickdown
                .update(&self.config.kickdown, snap.throttle_pct, now_ms);

        // Gear selection + shift state machine.
        let outcome = shift::advance(
            &mut self.state,
            &self.config,
            &snap,
            now_ms,
            &mut self.actuator,
        );
        if let Some((from, to)) = outcome.executed {
            self.stats.count_shift();
            info!(
                from = from.as_u8(),
                to = to.as_u8(),
                total = self.stats.total_shifts,
                "shift executed"
            );
        }
        if let Some(done) = outcome.completed {
            self.stats.log_shift(ShiftEvent {
                at_ms: now_ms,
                from: done.from,
                to: done.to,
                duration_ms: done.duration_ms,
                kickdown: done.kickdown_seen,
            });
            // Limp suspends learning; degraded-mode durations mean nothing.
            if !self.state.limp_mode {
                let updated = self.state.trim.record(
                    &self.config.adaptive,
                    &ShiftObservation {
                        from: done.from,
                        to: done.to,
                        duration_ms: done.duration_ms,
                        kickdown_seen: done.kickdown_seen,
                        throttle_pct: snap.throttle_pct,
                    },
                );
                if updated {
                    debug!(
                        offsets = ?self.state.trim.offsets(),
                        duration_ms = done.duration_ms,
                        "adaptive trim updated"
                    );
                }
            }
        }

        // Accumulator pressure (shift firmness).
        let acc_duty = pressure::accumulator_duty(
            &self.config.pressure,
            self.state.shift_phase,
            self.state.target_gear,
            self.state.kickdown_active,
            snap.throttle_pct,
            snap.fluid_temp_c,
            &self.state.trim,
        );
        self.state.accumulator_duty_pct = acc_duty;
        self.actuator.set_accumulator_duty(acc_duty);

        // Lockup clutch.
        let lk = lockup::lockup_command(
            &self.config.lockup,
            self.state.current_gear,
            self.state.shift_phase,
            &snap,
        );
        self.state.lockup_engaged = lk.engaged;
        self.state.lockup_duty_pct = lk.duty_pct;
        self.actuator.set_lockup_duty(lk.duty_pct);

        // Converter slip, for the diagnostic view only.
        self.slip_pct = slip::converter_slip_pct(
            snap.engine_rpm as f64,
            snap.output_rpm as f64,
            self.state.current_gear,
        );
    }

    /// Pace `tick()` at the configured rate, publishing diagnostics every
    /// Nth cycle. Runs until `max_ticks` (forever if `None`).
    pub fn run(&mut self, sink: &mut dyn DiagnosticSink, max_ticks: Option<u64>) {
        let period = Duration::from_millis(self.config.cycle.cycle_time_ms as u64);
        let budget_us = period.as_micros() as u64;
        let diag_interval = self.config.cycle.diag_interval as u64;

        loop {
            let work_start = Instant::now();
            self.tick();
            let elapsed = work_start.elapsed();

            if self.cycle_stats.record(elapsed.as_micros() as u64, budget_us) {
                self.state.faults |= FaultFlags::CYCLE_OVERRUN;
                warn!(
                    work_us = elapsed.as_micros() as u64,
                    budget_us, "cycle overran its period"
                );
            }

            if self.cycle_stats.cycle_count % diag_interval == 0 {
                let snapshot = self.diagnostic_snapshot();
                sink.publish(&snapshot);
            }

            if max_ticks.is_some_and(|max| self.cycle_stats.cycle_count >= max) {
                return;
            }

            if let Some(remaining) = period.checked_sub(elapsed) {
                std::thread::sleep(remaining);
            }
        }
    }
}

// ─── RT setup ───────────────────────────────────────────────────────

/// Prepare the thread for deterministic cycling: lock pages, prefault the
/// stack, pin to `cpu_core`, take SCHED_FIFO at `priority`.
///
/// The order matters: memory must be resident before the scheduler switch,
/// or the first page fault under SCHED_FIFO blows the period budget.
/// No-op without the `rt` feature (bench / simulation builds).
#[cfg(feature = "rt")]
pub fn rt_setup(cpu_core: usize, priority: i32) -> Result<(), String> {
    use nix::sched::{CpuSet, sched_setaffinity};
    use nix::sys::mman::{MlockallFlags, mlockall};
    use nix::unistd::Pid;

    mlockall(MlockallFlags::MCL_CURRENT | MlockallFlags::MCL_FUTURE)
        .map_err(|e| format!("cannot lock pages into RAM: {e}"))?;
    prefault_stack();

    let mut cpus = CpuSet::new();
    cpus.set(cpu_core)
        .map_err(|e| format!("cpu {cpu_core} is not addressable: {e}"))?;
    sched_setaffinity(Pid::this(), &cpus)
        .map_err(|e| format!("cannot pin the cycle task to cpu {cpu_core}: {e}"))?;

    let param = libc::sched_param {
        sched_priority: priority,
    };
    if unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) } != 0 {
        return Err(format!(
            "cannot enter SCHED_FIFO at priority {priority}: {}",
            std::io::Error::last_os_error()
        ));
    }
    Ok(())
}

#[cfg(not(feature = "rt"))]
pub fn rt_setup(_cpu_core: usize, _priority: i32) -> Result<(), String> {
    Ok(())
}

/// Touch a block of stack so its pages are resident before the loop starts.
#[cfg(feature = "rt")]
fn prefault_stack() {
    let mut buf = [0u8; 256 * 1024];
    for byte in buf.iter_mut() {
        unsafe { core::ptr::write_volatile(byte, 0xFF) };
    }
    core::hint::black_box(&buf);
}

// ─── Tests ──────────────────────────────────────────────────────────
