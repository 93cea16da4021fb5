//! Interfaces between the control core and the hardware layer.
//!
//! The core owns no I/O. It consumes a clock and a sensor provider and
//! produces solenoid commands through the actuator; everything behind
//! these traits is free to be GPIO, PWM peripherals, or a bench rig.

use std::time::Instant;

use tracing::{debug, info};

use tcu_common::state::SensorSnapshot;

/// Monotonic millisecond clock. Must not wrap within the service life of
/// the unit (u64 milliseconds is ample).
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Latest conditioned sensor values.
///
/// Must not block and must return in bounded time; filtering and
/// pulse-to-frequency conversion happen on the provider side.
pub trait SensorProvider {
    fn snapshot(&mut self) -> SensorSnapshot;
}

/// Transmission solenoid outputs.
///
/// Duty cycles are whole percent 0..=100; the hardware layer maps them to
/// 300 Hz PWM.
pub trait Actuator {
    /// Set the two gear-select solenoids.
    fn set_gear_solenoids(&mut self, s1: bool, s2: bool);
    /// Set the accumulator (shift firmness) solenoid duty.
    fn set_accumulator_duty(&mut self, duty_pct: u8);
    /// Set the torque converter lockup solenoid duty.
    fn set_lockup_duty(&mut self, duty_pct: u8);
}

// ─── Std implementations ────────────────────────────────────────────

/// Clock backed by a std monotonic instant.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Actuator that logs commanded outputs instead of driving pins.
///
/// Gear solenoid movements log at info; duty writes log at debug and only
/// on change, so a 50 Hz steady state stays quiet.
#[derive(Debug, Default)]
pub struct TracingActuator {
    last_solenoids: Option<(bool, bool)>,
    last_accumulator: Option<u8>,
    last_lockup: Option<u8>,
}

impl Actuator for TracingActuator {
    fn set_gear_solenoids(&mut self, s1: bool, s2: bool) {
        if self.last_solenoids != Some((s1, s2)) {
            info!(s1, s2, "gear solenoids");
            self.last_solenoids = Some((s1, s2));
        }
    }

    fn set_accumulator_duty(&mut self, duty_pct: u8) {
        if self.last_accumulator != Some(duty_pct) {
            debug!(duty_pct, "accumulator duty");
            self.last_accumulator = Some(duty_pct);
        }
    }

    fn set_lockup_duty(&mut self, duty_pct: u8) {
        if self.last_lockup != Some(duty_pct) {
            debug!(duty_pct, "lockup duty");
            self.last_lockup = Some(duty_pct);
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
