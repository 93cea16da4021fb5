//! Accumulator pressure control (shift firmness).
//!
//! The accumulator solenoid bleeds line pressure into the accumulator;
//! lower duty means less bleed and a firmer engagement. During a shift the
//! base level follows throttle load (or the kickdown override), adjusted by
//! the learned per-upshift trim; between shifts the solenoid holds the
//! medium level. Cold fluid biases firmer to compensate for sluggish
//! hydraulics, hot fluid softer.

use static_assertions::const_assert;

use tcu_common::state::{Gear, ShiftPhase};

use crate::config::PressureConfig;
use crate::control::adaptive::AdaptiveTrim;

/// Accumulator duty clamp [%]. Fixed by the hydraulic envelope, not
/// calibratable.
pub const ACC_DUTY_MIN: i32 = 15;
pub const ACC_DUTY_MAX: i32 = 85;

const_assert!(ACC_DUTY_MIN < ACC_DUTY_MAX);
const_assert!(ACC_DUTY_MIN >= 0);
const_assert!(ACC_DUTY_MAX <= 100);

/// Compute the accumulator solenoid duty for this tick.
pub fn accumulator_duty(
    config: &PressureConfig,
    phase: ShiftPhase,
    target_gear: Gear,
    kickdown: bool,
    throttle_pct: f32,
    fluid_temp_c: f32,
    trim: &AdaptiveTrim,
) -> u8 {
    let mut base = if phase == ShiftPhase::InProgress {
        let mut level = if kickdown {
            config.kickdown
        } else if throttle_pct > config.firm_throttle_pct {
            config.firm
        } else if throttle_pct < config.soft_throttle_pct {
            config.soft
        } else {
            config.medium
        };
        // A positive learned trim softens the shift.
        if let Some(i) = target_gear.upshift_index() {
            level += trim.offset(i) as i32;
        }
        level
    } else {
        config.medium
    };

    if fluid_temp_c < config.cold_below_c {
        base += config.cold_bias;
    } else if fluid_temp_c < config.cool_below_c {
        base += config.cool_bias;
    } else if fluid_temp_c > config.hot_above_c {
        base += config.hot_bias;
    }

    base.clamp(ACC_DUTY_MIN, ACC_DUTY_MAX) as u8
}

// ─── Tests ──────────────────────────────────────────────────────────
