//! Shift-point tables and gear selection.
//!
//! Each table gives the shift speed [km/h] at the five load breakpoints
//! (10/25/50/75/100 % throttle); between breakpoints the threshold is
//! linearly interpolated in integer math, truncating toward zero.
//!
//! Selection walks a fixed decision order: limp hold → overdrive inhibit →
//! kickdown → upshift lines (normal or power map) → coastdown lines →
//! brake-assist. The current-gear guards make the outcomes mutually
//! exclusive; a later step that fires overwrites an earlier one.

use tcu_common::state::{Gear, SensorSnapshot};

use crate::config::TcuConfig;

// ─── Factory tables ─────────────────────────────────────────────────

/// Load breakpoints [% throttle] shared by every table.
pub const LOAD_POINTS: [i32; 5] = [10, 25, 50, 75, 100];

pub const UPSHIFT_1_2_NORMAL: [i32; 5] = [15, 20, 30, 45, 60];
pub const UPSHIFT_2_3_NORMAL: [i32; 5] = [35, 45, 60, 80, 100];
pub const UPSHIFT_3_4_NORMAL: [i32; 5] = [55, 65, 85, 110, 130];

pub const UPSHIFT_1_2_POWER: [i32; 5] = [20, 30, 45, 60, 75];
pub const UPSHIFT_2_3_POWER: [i32; 5] = [45, 60, 80, 100, 120];
pub const UPSHIFT_3_4_POWER: [i32; 5] = [70, 85, 110, 130, 150];

pub const DOWNSHIFT_2_1: [i32; 5] = [10, 12, 18, 25, 35];
pub const DOWNSHIFT_3_2: [i32; 5] = [28, 35, 48, 65, 80];
pub const DOWNSHIFT_4_3: [i32; 5] = [48, 55, 72, 95, 115];

// ─── Interpolation ──────────────────────────────────────────────────

/// Threshold speed [km/h] for `throttle_pct`, linearly interpolated
/// between load breakpoints. Integer math, truncating toward zero;
/// saturates at the table ends.
pub fn interpolate(table: &[i32; 5], throttle_pct: i32) -> i32 {
    if throttle_pct <= LOAD_POINTS[0] {
        return table[0];
    }
    for i in 0..4 {
        let (lo, hi) = (LOAD_POINTS[i], LOAD_POINTS[i + 1]);
        if throttle_pct <= hi {
            return table[i] + (table[i + 1] - table[i]) * (throttle_pct - lo) / (hi - lo);
        }
    }
    table[4]
}

// ─── Gear selection ─────────────────────────────────────────────────

/// Select the target gear for this tick.
///
/// Pure: reads the snapshot and calibration, mutates nothing. Kickdown
/// detection happens before selection (see
/// [`crate::control::kickdown::KickdownDetector`]); the result is passed in.
pub fn select_target_gear(
    config: &TcuConfig,
    current: Gear,
    snap: &SensorSnapshot,
    kickdown: bool,
    limp: bool,
) -> Gear {
    if limp {
        return Gear::Third;
    }

    let mut target = current;

    // Overdrive inhibit: the driver's switch caps the box at third.
    if !snap.overdrive_enabled && target == Gear::Fourth {
        target = Gear::Third;
    }

    let throttle = snap.throttle_pct as i32;
    let speed = snap.speed_kmh;

    if kickdown {
        let kd = &config.kickdown;
        target = match current {
            Gear::Fourth if speed < kd.max_speed_4_3 => Gear::Third,
            Gear::Third if speed < kd.max_speed_3_2 => Gear::Second,
            Gear::Second if speed < kd.max_speed_2_1 => Gear::First,
            _ => target,
        };
    } else {
        let s = &config.schedule;
        let (up_1_2, up_2_3, up_3_4) = if snap.power_mode {
            (&s.upshift_1_2_power, &s.upshift_2_3_power, &s.upshift_3_4_power)
        } else {
            (&s.upshift_1_2_normal, &s.upshift_2_3_normal, &s.upshift_3_4_normal)
        };
        match current {
            Gear::First if speed > interpolate(up_1_2, throttle) as f32 => {
                target = Gear::Second;
            }
            Gear::Second if speed > interpolate(up_2_3, throttle) as f32 => {
                target = Gear::Third;
            }
            Gear::Third
                if snap.overdrive_enabled && speed > interpolate(up_3_4, throttle) as f32 =>
            {
                target = Gear::Fourth;
            }
            _ => {}
        }
    }

    // Coastdown lines have a single variant; the power map moves only the
    // upshift lines.
    let s = &config.schedule;
    match current {
        Gear::Fourth if speed < interpolate(&s.downshift_4_3, throttle) as f32 => {
            target = Gear::Third;
        }
        Gear::Third if speed < interpolate(&s.downshift_3_2, throttle) as f32 => {
            target = Gear::Second;
        }
        Gear::Second if speed < interpolate(&s.downshift_2_1, throttle) as f32 => {
            target = Gear::First;
        }
        _ => {}
    }

    // Brake-assist: braking with a closed throttle pulls an early downshift.
    let ba = &config.brake_assist;
    if snap.brake_pressed && snap.throttle_pct < ba.throttle_max_pct {
        match current {
            Gear::Fourth if speed < ba.speed_4_3 => target = Gear::Third,
            Gear::Third if speed < ba.speed_3_2 => target = Gear::Second,
            _ => {}
        }
    }

    target
}

// ─── Tests ──────────────────────────────────────────────────────────
