//! Torque converter lockup clutch control.
//!
//! The lockup solenoid bypasses the fluid coupling at cruise to remove
//! slip losses. Engagement requires cruise conditions (high gear, speed,
//! light throttle, warm fluid, no shift in flight); release is forced the
//! moment any of the exit gates trips. Inside the band between the
//! asymmetric enable/disable gates the clutch stays released.

use static_assertions::const_assert;

use tcu_common::state::{Gear, SensorSnapshot, ShiftPhase};

use crate::config::LockupConfig;

/// Applied duty at light throttle (near-full apply pressure) [%].
pub const LOCKUP_DUTY_LIGHT: u8 = 95;
/// Applied duty at mid throttle [%].
pub const LOCKUP_DUTY_MID: u8 = 75;
/// Applied duty toward the top of the engagement window [%].
pub const LOCKUP_DUTY_HEAVY: u8 = 50;

const_assert!(LOCKUP_DUTY_HEAVY < LOCKUP_DUTY_MID);
const_assert!(LOCKUP_DUTY_MID < LOCKUP_DUTY_LIGHT);
const_assert!(LOCKUP_DUTY_LIGHT <= 95);

/// Commanded lockup state for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockupCommand {
    pub engaged: bool,
    pub duty_pct: u8,
}

impl LockupCommand {
    const RELEASED: Self = Self {
        engaged: false,
        duty_pct: 0,
    };
}

/// Compute the lockup clutch command for this tick.
pub fn lockup_command(
    config: &LockupConfig,
    gear: Gear,
    phase: ShiftPhase,
    snap: &SensorSnapshot,
) -> LockupCommand {
    let must_unlock = snap.speed_kmh < config.disable_speed_kmh
        || snap.throttle_pct > config.throttle_max_pct + config.unlock_margin_pct
        || phase != ShiftPhase::Stable
        || gear.as_u8() < config.min_gear;

    let can_lockup = gear.as_u8() >= config.min_gear
        && snap.speed_kmh > config.enable_speed_kmh
        && snap.throttle_pct < config.throttle_max_pct
        && phase == ShiftPhase::Stable
        && snap.fluid_temp_c > config.min_fluid_temp_c;

    if must_unlock {
        LockupCommand::RELEASED
    } else if can_lockup {
        let duty_pct = if snap.throttle_pct < config.light_throttle_pct {
            LOCKUP_DUTY_LIGHT
        } else if snap.throttle_pct < config.mid_throttle_pct {
            LOCKUP_DUTY_MID
        } else {
            LOCKUP_DUTY_HEAVY
        };
        LockupCommand {
            engaged: true,
            duty_pct,
        }
    } else {
        LockupCommand::RELEASED
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
