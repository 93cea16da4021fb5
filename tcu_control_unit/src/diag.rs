//! Diagnostic snapshot assembly and publishing.
//!
//! The snapshot is assembled after all control writes for a tick, so a
//! consumer always sees a consistent tick. Publishing goes through the
//! [`DiagnosticSink`] trait; the transport behind it (file, console,
//! network) is not the core's concern. A failed publish logs and drops —
//! the control loop never stalls on diagnostics.

use std::io::Write;

use tracing::warn;

use tcu_common::diag::DiagnosticSnapshot;

use crate::cycle::CycleRunner;
use crate::hal::interface::{Actuator, Clock, SensorProvider};

/// Consumer of per-interval diagnostic snapshots.
pub trait DiagnosticSink {
    fn publish(&mut self, snapshot: &DiagnosticSnapshot);
}

/// Discards every snapshot.
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn publish(&mut self, _snapshot: &DiagnosticSnapshot) {}
}

/// Writes each snapshot as one JSON line.
pub struct JsonLinesSink<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> DiagnosticSink for JsonLinesSink<W> {
    fn publish(&mut self, snapshot: &DiagnosticSnapshot) {
        let result = serde_json::to_writer(&mut self.out, snapshot)
            .map_err(std::io::Error::from)
            .and_then(|()| self.out.write_all(b"\n"));
        if let Err(e) = result {
            warn!(error = %e, "diagnostic publish failed");
        }
    }
}

impl<C: Clock, S: SensorProvider, A: Actuator> CycleRunner<C, S, A> {
    /// Assemble the read-only view of the core for external consumers.
    pub fn diagnostic_snapshot(&self) -> DiagnosticSnapshot {
        DiagnosticSnapshot {
            uptime_s: self.uptime_s(),
            gear: self.state.current_gear,
            target_gear: self.state.target_gear,
            shift_phase: self.state.shift_phase,
            accumulator_duty_pct: self.state.accumulator_duty_pct,
            lockup_engaged: self.state.lockup_engaged,
            lockup_duty_pct: self.state.lockup_duty_pct,
            kickdown_active: self.state.kickdown_active,
            limp_mode: self.state.limp_mode,
            fault_bits: self.state.faults.bits(),
            slip_pct: self.slip_pct,
            shift_quality_offset: self.state.trim.offsets(),
            shift_count: self.state.trim.counts(),
            last_shift_duration_ms: self.state.last_shift_duration_ms,
            sensors: self.last_snapshot,
            stats: self.stats.clone(),
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
