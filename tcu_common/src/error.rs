//! Fault taxonomy for the control core.
//!
//! The core never panics and never aborts the cycle: inputs are clamped at
//! ingestion, stale channels read zero, and everything above that degrades.
//! Faults that do matter are collected as bitflags; any CRITICAL flag
//! latches limp mode (hold third gear) until the operator clears it.

use bitflags::bitflags;
use thiserror::Error;

bitflags! {
    /// Latched fault flags, published in the diagnostic snapshot.
    ///
    /// CRITICAL flags (→ limp mode): OVER_TEMP, OUTPUT_STALL, GEAR_FAULT.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FaultFlags: u8 {
        /// ATF temperature above the limp threshold. **CRITICAL → limp**.
        const OVER_TEMP    = 0x01;
        /// Output shaft reads zero while the engine turns at road speed,
        /// held past the stall window. **CRITICAL → limp**.
        const OUTPUT_STALL = 0x02;
        /// Gear state invariant violated (a stable machine disagreeing
        /// with its own target). **CRITICAL → limp**.
        const GEAR_FAULT   = 0x04;
        /// Control cycle exceeded its period budget (informational).
        const CYCLE_OVERRUN = 0x08;
    }
}

impl FaultFlags {
    /// Mask of all CRITICAL flags that latch limp mode.
    pub const CRITICAL_MASK: Self = Self::from_bits_truncate(
        Self::OVER_TEMP.bits() | Self::OUTPUT_STALL.bits() | Self::GEAR_FAULT.bits(),
    );

    /// Returns true if any CRITICAL flag is set.
    #[inline]
    pub const fn has_critical(&self) -> bool {
        self.intersects(Self::CRITICAL_MASK)
    }
}

impl Default for FaultFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// A raw gear encoding failed validation at an interface boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GearError {
    #[error("invalid gear value {0}, expected 1..=4")]
    Invalid(u8),
}

// ─── Tests ──────────────────────────────────────────────────────────
