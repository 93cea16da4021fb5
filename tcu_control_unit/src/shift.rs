//! Timed shift state machine.
//!
//! Stable → Requested → InProgress → Completing → Stable. The inhibit
//! window keeps the box from hunting after a shift, the confirmation delay
//! swallows one-tick noise on throttle and speed, and the settle window
//! separates mechanical completion from the moment the duration is
//! measured for the adaptive learner.
//!
//! The solenoids move exactly once per episode, at the Requested →
//! InProgress edge, after the selection has been confirmed.

use tcu_common::state::{Gear, ShiftPhase, SensorSnapshot};

use crate::config::TcuConfig;
use crate::control::schedule::select_target_gear;
use crate::cycle::TransmissionState;
use crate::hal::interface::Actuator;

/// Episode observation handed to the adaptive learner at completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedShift {
    /// Gear engaged when the episode began.
    pub from: Gear,
    /// Gear the episode shifted into.
    pub to: Gear,
    /// Measured episode duration [ms].
    pub duration_ms: u32,
    /// Kickdown was active at any tick of the episode.
    pub kickdown_seen: bool,
}

/// What advancing the machine by one tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShiftOutcome {
    /// Solenoid transition commanded this tick (from, to).
    pub executed: Option<(Gear, Gear)>,
    /// Episode finished this tick.
    pub completed: Option<CompletedShift>,
}

/// Advance the shift machine by one tick at time `now_ms`.
pub fn advance<A: Actuator>(
    state: &mut TransmissionState,
    config: &TcuConfig,
    snap: &SensorSnapshot,
    now_ms: u64,
    actuator: &mut A,
) -> ShiftOutcome {
    let mut outcome = ShiftOutcome::default();

    // Kickdown observed at any tick of an episode taints its duration
    // measurement for the learner.
    if state.shift_phase != ShiftPhase::Stable && state.kickdown_active {
        state.episode_kickdown = true;
    }

    match state.shift_phase {
        ShiftPhase::Stable => {
            let want = select_target_gear(
                config,
                state.current_gear,
                snap,
                state.kickdown_active,
                state.limp_mode,
            );
            if want != state.current_gear
                && now_ms.saturating_sub(state.last_shift_completed_ms) > config.timing.inhibit_ms
            {
                state.target_gear = want;
                state.shift_from = state.current_gear;
                state.shift_start_ms = now_ms;
                state.episode_kickdown = state.kickdown_active;
                state.shift_phase = ShiftPhase::Requested;
            } else {
                // Stable holds the invariant target == current; a demand
                // inside the inhibit window is simply dropped this tick.
                state.target_gear = state.current_gear;
            }
        }
        ShiftPhase::Requested => {
            if now_ms.saturating_sub(state.shift_start_ms) > config.timing.delay_ms {
                let confirmed = select_target_gear(
                    config,
                    state.current_gear,
                    snap,
                    state.kickdown_active,
                    state.limp_mode,
                );
                if confirmed == state.target_gear {
                    let from = state.shift_from;
                    execute_shift(state, actuator);
                    state.last_shift_completed_ms = now_ms;
                    state.shift_phase = ShiftPhase::InProgress;
                    outcome.executed = Some((from, state.current_gear));
                } else {
                    // Demand evaporated during the delay: no side effect.
                    state.target_gear = state.current_gear;
                    state.shift_phase = ShiftPhase::Stable;
                }
            }
        }
        ShiftPhase::InProgress => {
            if now_ms.saturating_sub(state.shift_start_ms) > config.timing.complete_ms {
                state.shift_phase = ShiftPhase::Completing;
            }
        }
        ShiftPhase::Completing => {
            let episode_ms = config.timing.complete_ms + config.timing.settle_ms;
            if now_ms.saturating_sub(state.shift_start_ms) > episode_ms {
                let duration_ms = now_ms.saturating_sub(state.shift_start_ms) as u32;
                state.last_shift_duration_ms = duration_ms;
                outcome.completed = Some(CompletedShift {
                    from: state.shift_from,
                    to: state.current_gear,
                    duration_ms,
                    kickdown_seen: state.episode_kickdown,
                });
                state.shift_phase = ShiftPhase::Stable;
            }
        }
    }

    outcome
}

/// Command the gear-select solenoid pair for the target gear.
///
/// The only place the gear solenoids change, apart from the operator
/// force-gear path. No intermediate sequencing: both outputs switch in the
/// same tick.
pub fn execute_shift<A: Actuator>(state: &mut TransmissionState, actuator: &mut A) {
    let (s1, s2) = state.target_gear.solenoids();
    actuator.set_gear_solenoids(s1, s2);
    state.current_gear = state.target_gear;
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::sim::RecordingActuator;

    const TICK: u64 = 20;

    fn cruise_snap(throttle: f32, speed: f32) -> SensorSnapshot {
        SensorSnapshot {
            throttle_pct: throttle,
            speed_kmh: speed,
            fluid_temp_c: 80.0,
            ..Default::default()
        }
    }

    /// Tick the machine from `start_ms`, 20 ms per tick, collecting outcomes.
    fn run_ticks(
        state: &mut TransmissionState,
        config: &TcuConfig,
        snap: &SensorSnapshot,
        actuator: &mut RecordingActuator,
        start_ms: u64,
        ticks: usize,
    ) -> Vec<ShiftOutcome> {
        (0..ticks)
            .map(|i| advance(state, config, snap, start_ms + i as u64 * TICK, actuator))
            .collect()
    }

    #[test]
    fn full_upshift_episode_walks_all_phases() {
        let config = TcuConfig::default();
        let mut state = TransmissionState::default();
        let mut actuator = RecordingActuator::default();
        // 30% throttle at 25 km/h demands second (threshold 22).
        let snap = cruise_snap(30.0, 25.0);

        // First tick after the inhibit window: request.
        let outcome = advance(&mut state, &config, &snap, 1000, &mut actuator);
        assert_eq!(state.shift_phase, ShiftPhase::Requested);
        assert_eq!(state.target_gear, Gear::Second);
        assert_eq!(outcome, ShiftOutcome::default());
        assert!(actuator.gear_writes.is_empty());

        // Delay not yet elapsed: still requested, no solenoid movement.
        advance(&mut state, &config, &snap, 1100, &mut actuator);
        assert_eq!(state.shift_phase, ShiftPhase::Requested);
        assert!(actuator.gear_writes.is_empty());

        // Past the delay: confirmed, solenoids move once.
        let outcome = advance(&mut state, &config, &snap, 1160, &mut actuator);
        assert_eq!(state.shift_phase, ShiftPhase::InProgress);
        assert_eq!(outcome.executed, Some((Gear::First, Gear::Second)));
        assert_eq!(state.current_gear, Gear::Second);
        assert_eq!(actuator.gear_writes, vec![(true, false)]);
        assert_eq!(state.last_shift_completed_ms, 1160);

        // Mechanical completion.
        advance(&mut state, &config, &snap, 1520, &mut actuator);
        assert_eq!(state.shift_phase, ShiftPhase::Completing);

        // Settle window ends: duration measured, back to stable.
        let outcome = advance(&mut state, &config, &snap, 1720, &mut actuator);
        assert_eq!(state.shift_phase, ShiftPhase::Stable);
        let done = outcome.completed.unwrap();
        assert_eq!(done.from, Gear::First);
        assert_eq!(done.to, Gear::Second);
        assert_eq!(done.duration_ms, 720);
        assert!(!done.kickdown_seen);
        assert_eq!(state.last_shift_duration_ms, 720);

        // Exactly one solenoid write for the whole episode.
        assert_eq!(actuator.gear_writes.len(), 1);
    }

    #[test]
    fn inhibit_window_blocks_back_to_back_requests() {
        let config = TcuConfig::default();
        let mut state = TransmissionState {
            last_shift_completed_ms: 1000,
            ..Default::default()
        };
        let mut actuator = RecordingActuator::default();
        let snap = cruise_snap(30.0, 25.0);

        // 700 ms after the last shift: inside the window, demand dropped.
        advance(&mut state, &config, &snap, 1700, &mut actuator);
        assert_eq!(state.shift_phase, ShiftPhase::Stable);
        assert_eq!(state.target_gear, state.current_gear);

        // 820 ms after: window open, request accepted.
        advance(&mut state, &config, &snap, 1820, &mut actuator);
        assert_eq!(state.shift_phase, ShiftPhase::Requested);
    }

    #[test]
    fn demand_that_evaporates_during_delay_reverts_without_side_effect() {
        let config = TcuConfig::default();
        let mut state = TransmissionState::default();
        let mut actuator = RecordingActuator::default();

        let demanding = cruise_snap(30.0, 25.0);
        advance(&mut state, &config, &demanding, 1000, &mut actuator);
        assert_eq!(state.shift_phase, ShiftPhase::Requested);

        // Speed falls back below the line before the delay elapses.
        let quiet = cruise_snap(30.0, 18.0);
        let outcome = advance(&mut state, &config, &quiet, 1160, &mut actuator);
        assert_eq!(state.shift_phase, ShiftPhase::Stable);
        assert_eq!(state.current_gear, Gear::First);
        assert_eq!(state.target_gear, Gear::First);
        assert_eq!(outcome, ShiftOutcome::default());
        assert!(actuator.gear_writes.is_empty());
    }

    #[test]
    fn stable_keeps_target_equal_to_current() {
        let config = TcuConfig::default();
        let mut state = TransmissionState::default();
        let mut actuator = RecordingActuator::default();
        let snap = cruise_snap(20.0, 10.0);

        let outcomes = run_ticks(&mut state, &config, &snap, &mut actuator, 1000, 50);
        assert!(outcomes.iter().all(|o| *o == ShiftOutcome::default()));
        assert_eq!(state.shift_phase, ShiftPhase::Stable);
        assert_eq!(state.target_gear, state.current_gear);
    }

    #[test]
    fn kickdown_during_episode_taints_the_observation() {
        let config = TcuConfig::default();
        let mut state = TransmissionState::default();
        let mut actuator = RecordingActuator::default();
        let snap = cruise_snap(30.0, 25.0);

        advance(&mut state, &config, &snap, 1000, &mut actuator);
        assert_eq!(state.shift_phase, ShiftPhase::Requested);
        assert!(!state.episode_kickdown);

        advance(&mut state, &config, &snap, 1160, &mut actuator);
        assert_eq!(state.shift_phase, ShiftPhase::InProgress);

        // Kickdown flashes active while the shift is in flight.
        state.kickdown_active = true;
        advance(&mut state, &config, &snap, 1300, &mut actuator);
        state.kickdown_active = false;

        advance(&mut state, &config, &snap, 1520, &mut actuator);
        let outcome = advance(&mut state, &config, &snap, 1720, &mut actuator);
        assert!(outcome.completed.unwrap().kickdown_seen);
    }

    #[test]
    fn limp_demand_routes_through_the_machine() {
        let config = TcuConfig::default();
        let mut state = TransmissionState {
            limp_mode: true,
            ..Default::default()
        };
        let mut actuator = RecordingActuator::default();
        let snap = cruise_snap(20.0, 20.0);

        advance(&mut state, &config, &snap, 1000, &mut actuator);
        assert_eq!(state.shift_phase, ShiftPhase::Requested);
        assert_eq!(state.target_gear, Gear::Third);

        let outcome = advance(&mut state, &config, &snap, 1160, &mut actuator);
        assert_eq!(outcome.executed, Some((Gear::First, Gear::Third)));
        assert_eq!(state.current_gear, Gear::Third);
        assert_eq!(actuator.gear_writes, vec![(false, true)]);
    }
}
