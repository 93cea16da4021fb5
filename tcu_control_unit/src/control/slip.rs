//! Torque converter slip (reporting only).
//!
//! Compares the output shaft speed against the speed the gear train
//! implies for the current engine speed. Feeds the diagnostic snapshot;
//! no control decision reads it.

use tcu_common::consts::{GEAR_RATIOS, SLIP_MIN_ENGINE_RPM};
use tcu_common::state::Gear;

/// Converter slip [%]. Zero when the output shaft is not turning or the
/// engine is below the evaluation floor.
pub fn converter_slip_pct(engine_rpm: f64, output_rpm: f64, gear: Gear) -> f64 {
    if output_rpm <= 0.0 || engine_rpm < SLIP_MIN_ENGINE_RPM {
        return 0.0;
    }
    let expected_output = engine_rpm / GEAR_RATIOS[gear.index()];
    ((expected_output - output_rpm).abs() / expected_output) * 100.0
}

// ─── Tests ──────────────────────────────────────────────────────────
