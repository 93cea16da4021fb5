//! Bench simulation endpoints.
//!
//! Deterministic stand-ins for the hardware layer: a settable clock, a
//! settable sensor provider, a keyframed drive profile for demo runs, and
//! an actuator that records every write for assertions. The control loop
//! is exercised end-to-end with seeded time — no hardware, no sleeps.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tcu_common::state::SensorSnapshot;

use super::interface::{Actuator, Clock, SensorProvider};

// ─── Clock ──────────────────────────────────────────────────────────

/// Settable millisecond clock. Clones share the same time source, so a
/// test can hold one handle while the cycle runner owns another.
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    now_ms: Rc<Cell<u64>>,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: u64) {
        self.now_ms.set(self.now_ms.get() + ms);
    }

    pub fn set(&self, ms: u64) {
        self.now_ms.set(ms);
    }
}

impl Clock for SimClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }
}

// ─── Sensors ────────────────────────────────────────────────────────

/// Sensor provider whose snapshot the test sets directly. Clones share
/// the same underlying values.
#[derive(Debug, Clone, Default)]
pub struct ManualSensors {
    snap: Rc<RefCell<SensorSnapshot>>,
}

impl ManualSensors {
    pub fn new(initial: SensorSnapshot) -> Self {
        Self {
            snap: Rc::new(RefCell::new(initial)),
        }
    }

    /// Mutate the snapshot the next tick will read.
    pub fn set(&self, f: impl FnOnce(&mut SensorSnapshot)) {
        f(&mut self.snap.borrow_mut());
    }
}

impl SensorProvider for ManualSensors {
    fn snapshot(&mut self) -> SensorSnapshot {
        *self.snap.borrow()
    }
}

// ─── Drive profile ──────────────────────────────────────────────────

/// One point on a scripted drive.
#[derive(Debug, Clone, Copy)]
pub struct Keyframe {
    pub t_ms: u64,
    pub throttle_pct: f32,
    pub speed_kmh: f32,
    pub brake: bool,
}

/// Keyframed drive script. Throttle and speed interpolate linearly
/// between frames; switches (brake) take the value of the frame in force.
#[derive(Debug, Clone)]
pub struct DriveProfile {
    base: SensorSnapshot,
    keys: Vec<Keyframe>,
}

impl DriveProfile {
    /// `keys` must be sorted by `t_ms` and non-empty.
    pub fn new(base: SensorSnapshot, keys: Vec<Keyframe>) -> Self {
        debug_assert!(!keys.is_empty());
        debug_assert!(keys.windows(2).all(|w| w[0].t_ms <= w[1].t_ms));
        Self { base, keys }
    }

    /// Sample the script at `t_ms`. Before the first frame the first
    /// frame's values hold; after the last, the last frame's.
    pub fn sample(&self, t_ms: u64) -> SensorSnapshot {
        let mut snap = self.base;

        let (throttle, speed, brake) = match self.keys.iter().position(|k| k.t_ms > t_ms) {
            Some(0) => {
                let k = &self.keys[0];
                (k.throttle_pct, k.speed_kmh, k.brake)
            }
            Some(next) => {
                let (a, b) = (&self.keys[next - 1], &self.keys[next]);
                let span = (b.t_ms - a.t_ms) as f32;
                let frac = (t_ms - a.t_ms) as f32 / span;
                (
                    a.throttle_pct + (b.throttle_pct - a.throttle_pct) * frac,
                    a.speed_kmh + (b.speed_kmh - a.speed_kmh) * frac,
                    a.brake,
                )
            }
            None => {
                let k = self.keys.last().expect("profile has at least one keyframe");
                (k.throttle_pct, k.speed_kmh, k.brake)
            }
        };

        snap.throttle_pct = throttle;
        snap.speed_kmh = speed;
        snap.brake_pressed = brake;
        // Rough shaft speeds for the diagnostic channels: the output shaft
        // tracks road speed through the final drive, the engine idles up
        // with load.
        snap.output_rpm = speed * 28.6;
        snap.engine_rpm = (800.0 + throttle * 25.0 + speed * 18.0).min(6500.0);
        snap
    }
}

/// Sensor provider that replays a [`DriveProfile`] against a clock.
#[derive(Debug, Clone)]
pub struct ProfileSensors<C: Clock> {
    pub profile: DriveProfile,
    pub clock: C,
}

impl<C: Clock> SensorProvider for ProfileSensors<C> {
    fn snapshot(&mut self) -> SensorSnapshot {
        self.profile.sample(self.clock.now_ms())
    }
}

// ─── Actuator ───────────────────────────────────────────────────────

/// Records every actuator write for assertions.
#[derive(Debug, Default, Clone)]
pub struct RecordingActuator {
    /// Every gear solenoid write, in order.
    pub gear_writes: Vec<(bool, bool)>,
    /// Every accumulator duty write, in order (one per tick).
    pub accumulator_duties: Vec<u8>,
    /// Every lockup duty write, in order (one per tick).
    pub lockup_duties: Vec<u8>,
}

impl Actuator for RecordingActuator {
    fn set_gear_solenoids(&mut self, s1: bool, s2: bool) {
        self.gear_writes.push((s1, s2));
    }

    fn set_accumulator_duty(&mut self, duty_pct: u8) {
        self.accumulator_duties.push(duty_pct);
    }

    fn set_lockup_duty(&mut self, duty_pct: u8) {
        self.lockup_duties.push(duty_pct);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
