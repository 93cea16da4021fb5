//! Diagnostic data published by the control core at tick end.
//!
//! The snapshot is a read-only view for external consumers (bench tooling,
//! log readers). It is assembled after all control writes for a tick have
//! happened, so a reader always observes a consistent tick.

use heapless::Vec;
use serde::{Deserialize, Serialize};

use crate::consts::SHIFT_LOG_CAPACITY;
use crate::state::{Gear, SensorSnapshot, ShiftPhase};

// ─── Shift log ──────────────────────────────────────────────────────

/// One commanded gear change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShiftEvent {
    /// Monotonic timestamp of the record [ms].
    pub at_ms: u64,
    pub from: Gear,
    pub to: Gear,
    /// Measured episode duration [ms]; zero for operator-forced shifts.
    pub duration_ms: u32,
    /// Kickdown was active at some point during the episode.
    pub kickdown: bool,
}

// ─── Aggregate statistics ───────────────────────────────────────────

/// Aggregate statistics owned by the core task.
///
/// Updated without coordination; diagnostic readers get a copy inside the
/// published snapshot, never a live reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TcuStats {
    /// Total commanded gear changes since power-on (including forced).
    pub total_shifts: u32,
    /// Highest ATF temperature observed since power-on [°C].
    pub max_fluid_temp_c: f32,
    /// Bounded log of recent completed shifts, oldest first.
    pub recent_shifts: Vec<ShiftEvent, SHIFT_LOG_CAPACITY>,
}

impl Default for TcuStats {
    fn default() -> Self {
        Self {
            total_shifts: 0,
            max_fluid_temp_c: -40.0,
            recent_shifts: Vec::new(),
        }
    }
}

impl TcuStats {
    /// Count one commanded gear change.
    #[inline]
    pub fn count_shift(&mut self) {
        self.total_shifts = self.total_shifts.saturating_add(1);
    }

    /// Append to the bounded shift log, evicting the oldest entry when full.
    pub fn log_shift(&mut self, event: ShiftEvent) {
        if self.recent_shifts.is_full() {
            self.recent_shifts.remove(0);
        }
        // Cannot fail after the eviction above.
        let _ = self.recent_shifts.push(event);
    }

    /// Track the running ATF temperature maximum.
    #[inline]
    pub fn observe_temp(&mut self, fluid_temp_c: f32) {
        if fluid_temp_c > self.max_fluid_temp_c {
            self.max_fluid_temp_c = fluid_temp_c;
        }
    }
}

// ─── Snapshot ───────────────────────────────────────────────────────

/// Read-only view of the control core for external consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticSnapshot {
    /// Seconds since power-on.
    pub uptime_s: u64,
    pub gear: Gear,
    pub target_gear: Gear,
    pub shift_phase: ShiftPhase,
    pub accumulator_duty_pct: u8,
    pub lockup_engaged: bool,
    pub lockup_duty_pct: u8,
    pub kickdown_active: bool,
    pub limp_mode: bool,
    /// Raw [`crate::error::FaultFlags`] bits.
    pub fault_bits: u8,
    /// Torque converter slip [%] (reporting only).
    pub slip_pct: f64,
    /// Adaptive firmness trims per upshift (1→2, 2→3, 3→4).
    pub shift_quality_offset: [i8; 3],
    /// Adapted-shift counters per upshift.
    pub shift_count: [u16; 3],
    pub last_shift_duration_ms: u32,
    /// Sensor snapshot the last tick ran on.
    pub sensors: SensorSnapshot,
    pub stats: TcuStats,
}

// ─── Tests ──────────────────────────────────────────────────────────
