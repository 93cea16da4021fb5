//! Operator command port.
//!
//! A narrow bench-use surface that bypasses the shift state machine:
//! force a gear directly, zero the adaptive trims, latch or clear limp
//! mode. Commands apply between ticks; the next tick runs on the new
//! state.

use tracing::{info, warn};

use tcu_common::error::FaultFlags;
use tcu_common::state::{Gear, ShiftPhase};

use crate::cycle::CycleRunner;
use crate::hal::interface::{Actuator, Clock, SensorProvider};
use crate::shift;

/// Operator command, as received from the bench console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TcuCommand {
    /// Engage a gear immediately, skipping the state machine.
    ForceGear(Gear),
    /// Zero all adaptive trims and counters.
    ResetAdaptive,
    /// Latch (`true`) or clear (`false`) limp mode. Clearing also wipes
    /// latched faults; a still-present condition re-latches next tick.
    SetLimp(bool),
}

/// Result of applying an operator command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Command took effect.
    Applied,
    /// Command declined — reason.
    Rejected(&'static str),
}

impl<C: Clock, S: SensorProvider, A: Actuator> CycleRunner<C, S, A> {
    /// Apply one operator command. Must be called between ticks.
    ///
    /// A declined command leaves all state untouched and is reported
    /// through the outcome (and the log), never by panicking.
    pub fn apply_command(&mut self, command: TcuCommand) -> CommandOutcome {
        match command {
            TcuCommand::ForceGear(gear) => {
                // Even the bench override honors the driver's overdrive
                // switch; fourth must stay unreachable while it is off.
                if gear == Gear::Fourth && !self.last_snapshot.overdrive_enabled {
                    warn!("force-gear declined: overdrive switch is off");
                    return CommandOutcome::Rejected("fourth gear needs the overdrive switch on");
                }
                info!(gear = gear.as_u8(), "operator force-gear");
                let from = self.state.current_gear;
                self.state.target_gear = gear;
                shift::execute_shift(&mut self.state, &mut self.actuator);
                self.state.shift_phase = ShiftPhase::Stable;
                self.state.shift_from = from;
                self.state.episode_kickdown = false;
                self.stats.count_shift();
            }
            TcuCommand::ResetAdaptive => {
                info!("operator adaptive reset");
                self.state.trim.reset();
            }
            TcuCommand::SetLimp(on) => {
                info!(on, "operator limp latch");
                self.state.limp_mode = on;
                if !on {
                    self.state.faults = FaultFlags::empty();
                    self.limp_monitor.reset();
                }
            }
        }
        CommandOutcome::Applied
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
