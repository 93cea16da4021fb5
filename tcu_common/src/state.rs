//! Core state types for the transmission control unit.
//!
//! All enums use `#[repr(u8)]` for compact layout and a stable encoding in
//! diagnostic output.

use serde::{Deserialize, Serialize};

use crate::error::GearError;

// ─── Gear ───────────────────────────────────────────────────────────

/// Forward gear of the four-speed gearbox.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum Gear {
    First = 1,
    Second = 2,
    Third = 3,
    Fourth = 4,
}

impl Gear {
    /// Convert from raw `u8`. Returns `None` for invalid values.
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::First),
            2 => Some(Self::Second),
            3 => Some(Self::Third),
            4 => Some(Self::Fourth),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Zero-based index into per-gear arrays (ratios, etc.).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize - 1
    }

    /// Shift solenoid pattern (S1, S2) that selects this gear.
    ///
    /// | Gear | S1 | S2 |
    /// |------|----|----|
    /// | 1    | lo | lo |
    /// | 2    | hi | lo |
    /// | 3    | lo | hi |
    /// | 4    | hi | hi |
    #[inline]
    pub const fn solenoids(self) -> (bool, bool) {
        match self {
            Self::First => (false, false),
            Self::Second => (true, false),
            Self::Third => (false, true),
            Self::Fourth => (true, true),
        }
    }

    /// Index of the upshift that lands in this gear (1→2 = 0, 2→3 = 1,
    /// 3→4 = 2). `None` for first gear, which no upshift reaches.
    #[inline]
    pub const fn upshift_index(self) -> Option<usize> {
        match self {
            Self::First => None,
            g => Some(g as usize - 2),
        }
    }
}

impl Default for Gear {
    fn default() -> Self {
        Self::First
    }
}

impl TryFrom<u8> for Gear {
    type Error = GearError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_u8(value).ok_or(GearError::Invalid(value))
    }
}

// ─── Shift phase ────────────────────────────────────────────────────

/// Phase of the shift episode state machine.
///
/// Stable → Requested → InProgress → Completing → Stable. Every phase
/// except `Stable` belongs to exactly one shift episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ShiftPhase {
    /// No shift episode active; target tracks current gear.
    Stable = 0,
    /// A gear change was demanded; waiting out the confirmation delay.
    Requested = 1,
    /// Solenoids commanded; hydraulic elements transitioning.
    InProgress = 2,
    /// Mechanically complete; waiting out the settle window.
    Completing = 3,
}

impl Default for ShiftPhase {
    fn default() -> Self {
        Self::Stable
    }
}

// ─── Sensor snapshot ────────────────────────────────────────────────

/// Conditioned sensor values for one control tick.
///
/// Produced by the sensor provider; the core treats it as an immutable
/// snapshot and performs no I/O of its own. Filtering, pulse-to-frequency
/// conversion, and ADC scaling are the provider's responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    /// Filtered throttle position [%], 0..=100.
    pub throttle_pct: f32,
    /// Filtered road speed [km/h].
    pub speed_kmh: f32,
    /// Engine speed [rpm].
    pub engine_rpm: f32,
    /// Output shaft speed [rpm].
    pub output_rpm: f32,
    /// ATF temperature [°C].
    pub fluid_temp_c: f32,
    /// Brake pedal switch.
    pub brake_pressed: bool,
    /// Driver overdrive switch — fourth gear permitted.
    pub overdrive_enabled: bool,
    /// Sport shift map selected.
    pub power_mode: bool,
}

impl Default for SensorSnapshot {
    fn default() -> Self {
        Self {
            throttle_pct: 0.0,
            speed_kmh: 0.0,
            engine_rpm: 0.0,
            output_rpm: 0.0,
            fluid_temp_c: 20.0,
            brake_pressed: false,
            overdrive_enabled: true,
            power_mode: false,
        }
    }
}

impl SensorSnapshot {
    /// Clamp every channel into its physical range.
    ///
    /// The core clamps at ingestion so a bad ADC read can never panic or
    /// escape into the decision logic.
    #[must_use]
    pub fn clamped(mut self) -> Self {
        self.throttle_pct = self.throttle_pct.clamp(0.0, 100.0);
        self.speed_kmh = self.speed_kmh.clamp(0.0, 250.0);
        self.engine_rpm = self.engine_rpm.clamp(0.0, 8000.0);
        self.output_rpm = self.output_rpm.max(0.0);
        self.fluid_temp_c = self.fluid_temp_c.clamp(-40.0, 150.0);
        self
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
