//! Driveline and scheduling constants shared across the workspace.

use static_assertions::const_assert;

/// Nominal control cycle period [ms] (50 Hz).
pub const CYCLE_TIME_MS_DEFAULT: u32 = 20;
/// Fastest supported cycle period [ms].
pub const CYCLE_TIME_MS_MIN: u32 = 5;
/// Slowest supported cycle period [ms].
pub const CYCLE_TIME_MS_MAX: u32 = 100;

/// Diagnostic publish interval [cycles] (default: every 25 = 500 ms).
pub const DIAG_INTERVAL_DEFAULT: u32 = 25;

/// Forward gear ratios, first → fourth (A340E gear train).
pub const GEAR_RATIOS: [f64; 4] = [2.804, 1.531, 1.000, 0.705];

/// Final drive ratio. Reported in diagnostics only; the converter slip
/// computation works in turbine-shaft terms and does not apply it.
pub const FINAL_DRIVE: f64 = 3.266;

/// Engine speed below which converter slip is not evaluated [rpm].
pub const SLIP_MIN_ENGINE_RPM: f64 = 500.0;

/// A speed or output-shaft pulse period older than this reads as zero [µs].
pub const SPEED_PULSE_STALE_US: u64 = 1_000_000;
/// An engine pulse period older than this reads as zero [µs].
pub const ENGINE_PULSE_STALE_US: u64 = 500_000;

/// Capacity of the bounded recent-shift log in the diagnostic snapshot.
pub const SHIFT_LOG_CAPACITY: usize = 16;

const_assert!(CYCLE_TIME_MS_MIN <= CYCLE_TIME_MS_DEFAULT);
const_assert!(CYCLE_TIME_MS_DEFAULT <= CYCLE_TIME_MS_MAX);
const_assert!(ENGINE_PULSE_STALE_US <= SPEED_PULSE_STALE_US);
