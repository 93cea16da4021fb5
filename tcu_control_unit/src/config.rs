//! TOML calibration loader with validation.
//!
//! Every numeric calibration the control core uses — shift-point tables,
//! state-machine timing gates, pressure and lockup parameters, adaptive
//! trim bounds, limp thresholds — loads from a single TOML file. Every
//! field carries a factory default, so the unit runs with no file present.
//!
//! Validation happens once at startup and fails the load, never the cycle:
//! tables must rise with load, each coastdown line must sit below its
//! upshift counterpart (shift hysteresis), and the lockup speed gates must
//! keep their asymmetry.

use std::path::Path;

use serde::{Deserialize, Serialize};

use tcu_common::consts::{
    CYCLE_TIME_MS_DEFAULT, CYCLE_TIME_MS_MAX, CYCLE_TIME_MS_MIN, DIAG_INTERVAL_DEFAULT,
};
use tcu_common::state::Gear;

use crate::control::schedule;

// ─── Error Type ─────────────────────────────────────────────────────

/// Configuration loading/validation error.
#[derive(Debug)]
pub enum ConfigError {
    /// File I/O error.
    Io(String),
    /// TOML parse error.
    Parse(String),
    /// Parameter validation error.
    Validation(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "calibration I/O error: {e}"),
            Self::Parse(e) => write!(f, "calibration parse error: {e}"),
            Self::Validation(e) => write!(f, "calibration validation: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ─── Top-Level Config ───────────────────────────────────────────────

/// Complete validated calibration, ready for runtime use.
///
/// Immutable after startup; the cycle task takes it by value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TcuConfig {
    #[serde(default)]
    pub cycle: CycleConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub kickdown: KickdownConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub pressure: PressureConfig,
    #[serde(default)]
    pub lockup: LockupConfig,
    #[serde(default)]
    pub brake_assist: BrakeAssistConfig,
    #[serde(default)]
    pub adaptive: AdaptiveConfig,
    #[serde(default)]
    pub limp: LimpConfig,
}

impl TcuConfig {
    /// Run all validation rules.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cycle.validate()?;
        self.schedule.validate()?;
        self.kickdown.validate()?;
        self.timing.validate()?;
        self.pressure.validate()?;
        self.lockup.validate()?;
        self.adaptive.validate()?;
        Ok(())
    }
}

/// Load and validate the calibration from a TOML file.
pub fn load_config(path: &Path) -> Result<TcuConfig, ConfigError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Io(format!("failed to read {}: {e}", path.display())))?;
    load_from_str(&text)
}

/// Load and validate the calibration from a TOML string (also for tests).
pub fn load_from_str(text: &str) -> Result<TcuConfig, ConfigError> {
    let config: TcuConfig =
        toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

// ─── Cycle ──────────────────────────────────────────────────────────

/// Control cycle pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleConfig {
    /// Control cycle period [ms] (default: 20 = 50 Hz).
    #[serde(default = "default_cycle_time_ms")]
    pub cycle_time_ms: u32,
    /// Diagnostic publish interval [cycles].
    #[serde(default = "default_diag_interval")]
    pub diag_interval: u32,
}

fn default_cycle_time_ms() -> u32 {
    CYCLE_TIME_MS_DEFAULT
}
fn default_diag_interval() -> u32 {
    DIAG_INTERVAL_DEFAULT
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            cycle_time_ms: default_cycle_time_ms(),
            diag_interval: default_diag_interval(),
        }
    }
}

impl CycleConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.cycle_time_ms < CYCLE_TIME_MS_MIN || self.cycle_time_ms > CYCLE_TIME_MS_MAX {
            return Err(ConfigError::Validation(format!(
                "cycle_time_ms {} out of range [{CYCLE_TIME_MS_MIN}, {CYCLE_TIME_MS_MAX}]",
                self.cycle_time_ms
            )));
        }
        if self.diag_interval == 0 {
            return Err(ConfigError::Validation(
                "diag_interval must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

// ─── Shift schedule ─────────────────────────────────────────────────

/// Shift-point tables [km/h] at the five load breakpoints
/// (10/25/50/75/100 % throttle).
///
/// Upshift lines carry a normal and a power (sport map) variant. Coastdown
/// lines have a single variant; the power map moves only the upshift lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_up_1_2_normal")]
    pub upshift_1_2_normal: [i32; 5],
    #[serde(default = "default_up_2_3_normal")]
    pub upshift_2_3_normal: [i32; 5],
    #[serde(default = "default_up_3_4_normal")]
    pub upshift_3_4_normal: [i32; 5],
    #[serde(default = "default_up_1_2_power")]
    pub upshift_1_2_power: [i32; 5],
    #[serde(default = "default_up_2_3_power")]
    pub upshift_2_3_power: [i32; 5],
    #[serde(default = "default_up_3_4_power")]
    pub upshift_3_4_power: [i32; 5],
    #[serde(default = "default_down_2_1")]
    pub downshift_2_1: [i32; 5],
    #[serde(default = "default_down_3_2")]
    pub downshift_3_2: [i32; 5],
    #[serde(default = "default_down_4_3")]
    pub downshift_4_3: [i32; 5],
}

fn default_up_1_2_normal() -> [i32; 5] {
    schedule::UPSHIFT_1_2_NORMAL
}
fn default_up_2_3_normal() -> [i32; 5] {
    schedule::UPSHIFT_2_3_NORMAL
}
fn default_up_3_4_normal() -> [i32; 5] {
    schedule::UPSHIFT_3_4_NORMAL
}
fn default_up_1_2_power() -> [i32; 5] {
    schedule::UPSHIFT_1_2_POWER
}
fn default_up_2_3_power() -> [i32; 5] {
    schedule::UPSHIFT_2_3_POWER
}
fn default_up_3_4_power() -> [i32; 5] {
    schedule::UPSHIFT_3_4_POWER
}
fn default_down_2_1() -> [i32; 5] {
    schedule::DOWNSHIFT_2_1
}
fn default_down_3_2() -> [i32; 5] {
    schedule::DOWNSHIFT_3_2
}
fn default_down_4_3() -> [i32; 5] {
    schedule::DOWNSHIFT_4_3
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            upshift_1_2_normal: default_up_1_2_normal(),
            upshift_2_3_normal: default_up_2_3_normal(),
            upshift_3_4_normal: default_up_3_4_normal(),
            upshift_1_2_power: default_up_1_2_power(),
            upshift_2_3_power: default_up_2_3_power(),
            upshift_3_4_power: default_up_3_4_power(),
            downshift_2_1: default_down_2_1(),
            downshift_3_2: default_down_3_2(),
            downshift_4_3: default_down_4_3(),
        }
    }
}

impl ScheduleConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let tables = [
            ("upshift_1_2_normal", &self.upshift_1_2_normal),
            ("upshift_2_3_normal", &self.upshift_2_3_normal),
            ("upshift_3_4_normal", &self.upshift_3_4_normal),
            ("upshift_1_2_power", &self.upshift_1_2_power),
            ("upshift_2_3_power", &self.upshift_2_3_power),
            ("upshift_3_4_power", &self.upshift_3_4_power),
            ("downshift_2_1", &self.downshift_2_1),
            ("downshift_3_2", &self.downshift_3_2),
            ("downshift_4_3", &self.downshift_4_3),
        ];
        for (name, table) in tables {
            for window in table.windows(2) {
                if window[1] < window[0] {
                    return Err(ConfigError::Validation(format!(
                        "{name} must be non-decreasing across load points: {table:?}"
                    )));
                }
            }
            if table[0] < 0 {
                return Err(ConfigError::Validation(format!(
                    "{name} contains a negative speed: {table:?}"
                )));
            }
        }

        // Shift hysteresis: each coastdown line must sit strictly below
        // both variants of the matching upshift line at every load point.
        let pairs = [
            ("downshift_2_1 / upshift_1_2", &self.downshift_2_1, &self.upshift_1_2_normal, &self.upshift_1_2_power),
            ("downshift_3_2 / upshift_2_3", &self.downshift_3_2, &self.upshift_2_3_normal, &self.upshift_2_3_power),
            ("downshift_4_3 / upshift_3_4", &self.downshift_4_3, &self.upshift_3_4_normal, &self.upshift_3_4_power),
        ];
        for (name, down, up_normal, up_power) in pairs {
            for i in 0..5 {
                if down[i] >= up_normal[i] || down[i] >= up_power[i] {
                    return Err(ConfigError::Validation(format!(
                        "{name}: coastdown threshold {} not below upshift threshold at load point {i}",
                        down[i]
                    )));
                }
            }
        }
        Ok(())
    }
}

// ─── Kickdown ───────────────────────────────────────────────────────

/// Kickdown detection and per-gear speed ceilings for the forced downshift.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KickdownConfig {
    /// Throttle rise [percentage points] counted as a sharp application.
    #[serde(default = "default_kd_rise")]
    pub rise_pct: f32,
    /// How long after a sharp rise kickdown stays armed [ms].
    #[serde(default = "default_kd_window")]
    pub window_ms: u64,
    /// Absolute throttle floor for kickdown [%].
    #[serde(default = "default_kd_floor")]
    pub throttle_floor_pct: f32,
    /// Speed below which a 4→3 kickdown is allowed [km/h].
    #[serde(default = "default_kd_4_3")]
    pub max_speed_4_3: f32,
    /// Speed below which a 3→2 kickdown is allowed [km/h].
    #[serde(default = "default_kd_3_2")]
    pub max_speed_3_2: f32,
    /// Speed below which a 2→1 kickdown is allowed [km/h].
    #[serde(default = "default_kd_2_1")]
    pub max_speed_2_1: f32,
}

fn default_kd_rise() -> f32 {
    20.0
}
fn default_kd_window() -> u64 {
    200
}
fn default_kd_floor() -> f32 {
    85.0
}
fn default_kd_4_3() -> f32 {
    120.0
}
fn default_kd_3_2() -> f32 {
    90.0
}
fn default_kd_2_1() -> f32 {
    50.0
}

impl Default for KickdownConfig {
    fn default() -> Self {
        Self {
            rise_pct: default_kd_rise(),
            window_ms: default_kd_window(),
            throttle_floor_pct: default_kd_floor(),
            max_speed_4_3: default_kd_4_3(),
            max_speed_3_2: default_kd_3_2(),
            max_speed_2_1: default_kd_2_1(),
        }
    }
}

impl KickdownConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.rise_pct <= 0.0 || self.window_ms == 0 {
            return Err(ConfigError::Validation(
                "kickdown rise_pct and window_ms must be positive".into(),
            ));
        }
        if !(0.0..100.0).contains(&self.throttle_floor_pct) {
            return Err(ConfigError::Validation(format!(
                "kickdown throttle_floor_pct {} out of range [0, 100)",
                self.throttle_floor_pct
            )));
        }
        Ok(())
    }
}

// ─── Shift timing ───────────────────────────────────────────────────

/// Shift state machine timing gates [ms].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Minimum spacing between commanded shifts.
    #[serde(default = "default_inhibit_ms")]
    pub inhibit_ms: u64,
    /// Confirmation delay before the solenoids move.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    /// Time from solenoid command to mechanical completion.
    #[serde(default = "default_complete_ms")]
    pub complete_ms: u64,
    /// Settle window separating completion from the duration measurement.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

fn default_inhibit_ms() -> u64 {
    800
}
fn default_delay_ms() -> u64 {
    150
}
fn default_complete_ms() -> u64 {
    500
}
fn default_settle_ms() -> u64 {
    200
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            inhibit_ms: default_inhibit_ms(),
            delay_ms: default_delay_ms(),
            complete_ms: default_complete_ms(),
            settle_ms: default_settle_ms(),
        }
    }
}

impl TimingConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.inhibit_ms == 0
            || self.delay_ms == 0
            || self.complete_ms == 0
            || self.settle_ms == 0
        {
            return Err(ConfigError::Validation(
                "all shift timing gates must be positive".into(),
            ));
        }
        if self.delay_ms >= self.complete_ms {
            return Err(ConfigError::Validation(format!(
                "delay_ms {} must be below complete_ms {}",
                self.delay_ms, self.complete_ms
            )));
        }
        Ok(())
    }
}

// ─── Pressure ───────────────────────────────────────────────────────

/// Accumulator duty base levels and temperature compensation.
///
/// Lower duty = firmer engagement (less accumulator back-pressure bleed).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PressureConfig {
    /// Light-throttle base duty [%].
    #[serde(default = "default_acc_soft")]
    pub soft: i32,
    /// Mid-throttle base duty [%]; also the between-shifts hold level.
    #[serde(default = "default_acc_medium")]
    pub medium: i32,
    /// Heavy-throttle base duty [%].
    #[serde(default = "default_acc_firm")]
    pub firm: i32,
    /// Kickdown base duty [%].
    #[serde(default = "default_acc_kickdown")]
    pub kickdown: i32,
    /// Throttle above which the firm level applies [%].
    #[serde(default = "default_firm_throttle")]
    pub firm_throttle_pct: f32,
    /// Throttle below which the soft level applies [%].
    #[serde(default = "default_soft_throttle")]
    pub soft_throttle_pct: f32,
    /// Below this ATF temperature, bias firmer [°C].
    #[serde(default = "default_cold_below")]
    pub cold_below_c: f32,
    #[serde(default = "default_cold_bias")]
    pub cold_bias: i32,
    /// Below this ATF temperature (but not cold), bias slightly firmer [°C].
    #[serde(default = "default_cool_below")]
    pub cool_below_c: f32,
    #[serde(default = "default_cool_bias")]
    pub cool_bias: i32,
    /// Above this ATF temperature, bias softer [°C].
    #[serde(default = "default_hot_above")]
    pub hot_above_c: f32,
    #[serde(default = "default_hot_bias")]
    pub hot_bias: i32,
}

fn default_acc_soft() -> i32 {
    70
}
fn default_acc_medium() -> i32 {
    50
}
fn default_acc_firm() -> i32 {
    30
}
fn default_acc_kickdown() -> i32 {
    20
}
fn default_firm_throttle() -> f32 {
    60.0
}
fn default_soft_throttle() -> f32 {
    25.0
}
fn default_cold_below() -> f32 {
    40.0
}
fn default_cold_bias() -> i32 {
    -20
}
fn default_cool_below() -> f32 {
    60.0
}
fn default_cool_bias() -> i32 {
    -10
}
fn default_hot_above() -> f32 {
    100.0
}
fn default_hot_bias() -> i32 {
    10
}

impl Default for PressureConfig {
    fn default() -> Self {
        Self {
            soft: default_acc_soft(),
            medium: default_acc_medium(),
            firm: default_acc_firm(),
            kickdown: default_acc_kickdown(),
            firm_throttle_pct: default_firm_throttle(),
            soft_throttle_pct: default_soft_throttle(),
            cold_below_c: default_cold_below(),
            cold_bias: default_cold_bias(),
            cool_below_c: default_cool_below(),
            cool_bias: default_cool_bias(),
            hot_above_c: default_hot_above(),
            hot_bias: default_hot_bias(),
        }
    }
}

impl PressureConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        for (name, level) in [
            ("soft", self.soft),
            ("medium", self.medium),
            ("firm", self.firm),
            ("kickdown", self.kickdown),
        ] {
            if !(0..=100).contains(&level) {
                return Err(ConfigError::Validation(format!(
                    "pressure {name} level {level} out of range [0, 100]"
                )));
            }
        }
        if self.kickdown > self.firm || self.firm > self.medium || self.medium > self.soft {
            return Err(ConfigError::Validation(
                "pressure levels must order kickdown <= firm <= medium <= soft".into(),
            ));
        }
        if self.soft_throttle_pct >= self.firm_throttle_pct {
            return Err(ConfigError::Validation(format!(
                "soft_throttle_pct {} must be below firm_throttle_pct {}",
                self.soft_throttle_pct, self.firm_throttle_pct
            )));
        }
        if self.cold_below_c >= self.cool_below_c || self.cool_below_c >= self.hot_above_c {
            return Err(ConfigError::Validation(
                "temperature bands must order cold_below_c < cool_below_c < hot_above_c".into(),
            ));
        }
        Ok(())
    }
}

// ─── Lockup ─────────────────────────────────────────────────────────

/// Torque converter lockup envelope.
///
/// Enable and disable gates are asymmetric (speed 60/50, throttle 70/80)
/// so the clutch does not oscillate at the boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockupConfig {
    /// Lowest gear in which lockup may engage.
    #[serde(default = "default_lockup_gear")]
    pub min_gear: u8,
    /// Speed above which lockup may engage [km/h].
    #[serde(default = "default_lockup_enable_speed")]
    pub enable_speed_kmh: f32,
    /// Speed below which lockup must release [km/h].
    #[serde(default = "default_lockup_disable_speed")]
    pub disable_speed_kmh: f32,
    /// Throttle above which lockup may not engage [%].
    #[serde(default = "default_lockup_throttle_max")]
    pub throttle_max_pct: f32,
    /// Extra throttle beyond `throttle_max_pct` that forces release [%].
    #[serde(default = "default_lockup_unlock_margin")]
    pub unlock_margin_pct: f32,
    /// Minimum ATF temperature for engagement [°C].
    #[serde(default = "default_lockup_min_temp")]
    pub min_fluid_temp_c: f32,
    /// Throttle below which the light-load duty applies [%].
    #[serde(default = "default_lockup_light_throttle")]
    pub light_throttle_pct: f32,
    /// Throttle below which the mid-load duty applies [%].
    #[serde(default = "default_lockup_mid_throttle")]
    pub mid_throttle_pct: f32,
}

fn default_lockup_gear() -> u8 {
    3
}
fn default_lockup_enable_speed() -> f32 {
    60.0
}
fn default_lockup_disable_speed() -> f32 {
    50.0
}
fn default_lockup_throttle_max() -> f32 {
    70.0
}
fn default_lockup_unlock_margin() -> f32 {
    10.0
}
fn default_lockup_min_temp() -> f32 {
    50.0
}
fn default_lockup_light_throttle() -> f32 {
    20.0
}
fn default_lockup_mid_throttle() -> f32 {
    40.0
}

impl Default for LockupConfig {
    fn default() -> Self {
        Self {
            min_gear: default_lockup_gear(),
            enable_speed_kmh: default_lockup_enable_speed(),
            disable_speed_kmh: default_lockup_disable_speed(),
            throttle_max_pct: default_lockup_throttle_max(),
            unlock_margin_pct: default_lockup_unlock_margin(),
            min_fluid_temp_c: default_lockup_min_temp(),
            light_throttle_pct: default_lockup_light_throttle(),
            mid_throttle_pct: default_lockup_mid_throttle(),
        }
    }
}

impl LockupConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        Gear::try_from(self.min_gear)
            .map_err(|e| ConfigError::Validation(format!("lockup min_gear: {e}")))?;
        if self.disable_speed_kmh >= self.enable_speed_kmh {
            return Err(ConfigError::Validation(format!(
                "disable_speed_kmh {} must be below enable_speed_kmh {}",
                self.disable_speed_kmh, self.enable_speed_kmh
            )));
        }
        if self.unlock_margin_pct <= 0.0 {
            return Err(ConfigError::Validation(
                "unlock_margin_pct must be positive".into(),
            ));
        }
        if self.light_throttle_pct >= self.mid_throttle_pct
            || self.mid_throttle_pct >= self.throttle_max_pct
        {
            return Err(ConfigError::Validation(
                "lockup throttle bands must order light < mid < max".into(),
            ));
        }
        Ok(())
    }
}

// ─── Brake assist ───────────────────────────────────────────────────

/// Brake-assist downshift: braking with a closed throttle pulls an early
/// downshift for engine braking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrakeAssistConfig {
    /// Throttle must be below this [%].
    #[serde(default = "default_ba_throttle")]
    pub throttle_max_pct: f32,
    /// Speed below which a braking 4→3 is pulled [km/h].
    #[serde(default = "default_ba_4_3")]
    pub speed_4_3: f32,
    /// Speed below which a braking 3→2 is pulled [km/h].
    #[serde(default = "default_ba_3_2")]
    pub speed_3_2: f32,
}

fn default_ba_throttle() -> f32 {
    5.0
}
fn default_ba_4_3() -> f32 {
    70.0
}
fn default_ba_3_2() -> f32 {
    45.0
}

impl Default for BrakeAssistConfig {
    fn default() -> Self {
        Self {
            throttle_max_pct: default_ba_throttle(),
            speed_4_3: default_ba_4_3(),
            speed_3_2: default_ba_3_2(),
        }
    }
}

// ─── Adaptive ───────────────────────────────────────────────────────

/// Adaptive firmness trim: target duration band and bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaptiveConfig {
    /// A measured duration above this firms the trim [ms].
    #[serde(default = "default_slow_shift_ms")]
    pub slow_shift_ms: u32,
    /// A measured duration below this softens the trim [ms].
    #[serde(default = "default_fast_shift_ms")]
    pub fast_shift_ms: u32,
    /// Trim adjustment per observation [duty %].
    #[serde(default = "default_trim_step")]
    pub step: i8,
    /// Trim bound [duty %]; offsets clamp to ±limit.
    #[serde(default = "default_trim_limit")]
    pub limit: i8,
    /// Skip learning above this throttle [%].
    #[serde(default = "default_trim_throttle_ceiling")]
    pub throttle_ceiling_pct: f32,
}

fn default_slow_shift_ms() -> u32 {
    450
}
fn default_fast_shift_ms() -> u32 {
    350
}
fn default_trim_step() -> i8 {
    2
}
fn default_trim_limit() -> i8 {
    20
}
fn default_trim_throttle_ceiling() -> f32 {
    75.0
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            slow_shift_ms: default_slow_shift_ms(),
            fast_shift_ms: default_fast_shift_ms(),
            step: default_trim_step(),
            limit: default_trim_limit(),
            throttle_ceiling_pct: default_trim_throttle_ceiling(),
        }
    }
}

impl AdaptiveConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.fast_shift_ms >= self.slow_shift_ms {
            return Err(ConfigError::Validation(format!(
                "fast_shift_ms {} must be below slow_shift_ms {}",
                self.fast_shift_ms, self.slow_shift_ms
            )));
        }
        if self.step <= 0 || self.limit <= 0 {
            return Err(ConfigError::Validation(
                "adaptive step and limit must be positive".into(),
            ));
        }
        Ok(())
    }
}

// ─── Limp ───────────────────────────────────────────────────────────

/// Limp-mode latch thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimpConfig {
    /// ATF temperature above which limp latches [°C].
    #[serde(default = "default_overtemp")]
    pub overtemp_c: f32,
    /// Output-stall condition must hold this long before latching [ms].
    #[serde(default = "default_stall_hold")]
    pub stall_hold_ms: u64,
    /// Engine speed above which a zero output reading counts as a stall [rpm].
    #[serde(default = "default_stall_engine")]
    pub stall_min_engine_rpm: f32,
    /// Road speed above which a zero output reading counts as a stall [km/h].
    #[serde(default = "default_stall_speed")]
    pub stall_min_speed_kmh: f32,
}

fn default_overtemp() -> f32 {
    140.0
}
fn default_stall_hold() -> u64 {
    2000
}
fn default_stall_engine() -> f32 {
    1000.0
}
fn default_stall_speed() -> f32 {
    10.0
}

impl Default for LimpConfig {
    fn default() -> Self {
        Self {
            overtemp_c: default_overtemp(),
            stall_hold_ms: default_stall_hold(),
            stall_min_engine_rpm: default_stall_engine(),
            stall_min_speed_kmh: default_stall_speed(),
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
