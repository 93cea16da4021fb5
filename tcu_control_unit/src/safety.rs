//! Limp-mode supervision.
//!
//! Watches for the two conditions that warrant degraded operation:
//! ATF over-temperature and a dead output shaft reading while the engine
//! turns at road speed. The monitor only reports flags; the cycle runner
//! latches them, and only the operator command port unlatches. Limp holds
//! third gear and suspends adaptive learning.

use tcu_common::error::FaultFlags;
use tcu_common::state::SensorSnapshot;

use crate::config::LimpConfig;

/// Per-tick fault evaluation with the stall hold-off window.
#[derive(Debug, Clone, Default)]
pub struct LimpMonitor {
    stall_since_ms: Option<u64>,
}

impl LimpMonitor {
    pub const fn new() -> Self {
        Self {
            stall_since_ms: None,
        }
    }

    /// Evaluate fault conditions for this tick.
    ///
    /// Returned flags are raw observations; latching is the caller's job.
    pub fn evaluate(
        &mut self,
        config: &LimpConfig,
        snap: &SensorSnapshot,
        now_ms: u64,
    ) -> FaultFlags {
        let mut faults = FaultFlags::empty();

        if snap.fluid_temp_c > config.overtemp_c {
            faults |= FaultFlags::OVER_TEMP;
        }

        // A zero output reading with the engine turning at road speed is a
        // sensor or shaft failure either way; give it the hold window to
        // rule out a single stale read.
        let stalled = snap.output_rpm <= 0.0
            && snap.engine_rpm >= config.stall_min_engine_rpm
            && snap.speed_kmh >= config.stall_min_speed_kmh;
        if stalled {
            let since = *self.stall_since_ms.get_or_insert(now_ms);
            if now_ms.saturating_sub(since) >= config.stall_hold_ms {
                faults |= FaultFlags::OUTPUT_STALL;
            }
        } else {
            self.stall_since_ms = None;
        }

        faults
    }

    /// Forget the stall window (operator fault clear).
    pub fn reset(&mut self) {
        self.stall_since_ms = None;
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
