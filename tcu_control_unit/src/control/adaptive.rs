//! Adaptive firmness trim.
//!
//! After each completed upshift the measured episode duration is compared
//! against the target band: a slow shift firms the trim for that upshift
//! (more pressure next time), a harsh fast shift softens it. Trims are
//! bounded, volatile, and feed back additively into the accumulator duty.
//!
//! Kickdown episodes and heavy-throttle updates are excluded — those
//! durations say more about the driver than about the hydraulics.

use serde::{Deserialize, Serialize};

use tcu_common::state::Gear;

use crate::config::AdaptiveConfig;

/// One completed shift episode, as observed by the state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShiftObservation {
    /// Gear engaged when the episode began.
    pub from: Gear,
    /// Gear the episode shifted into.
    pub to: Gear,
    /// Measured episode duration [ms].
    pub duration_ms: u32,
    /// Kickdown was active at any tick of the episode.
    pub kickdown_seen: bool,
    /// Throttle at the moment of the update [%].
    pub throttle_pct: f32,
}

/// Per-upshift learned duty trims and counters (1→2, 2→3, 3→4).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdaptiveTrim {
    offsets: [i8; 3],
    counts: [u16; 3],
}

impl AdaptiveTrim {
    /// Learned duty offset for upshift `index` [%].
    #[inline]
    pub fn offset(&self, index: usize) -> i8 {
        self.offsets[index]
    }

    #[inline]
    pub fn offsets(&self) -> [i8; 3] {
        self.offsets
    }

    #[inline]
    pub fn counts(&self) -> [u16; 3] {
        self.counts
    }

    /// Zero all trims and counters (operator `reset_adaptive`).
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Feed one completed episode. Returns true when the observation
    /// produced an update (the episode qualified for learning).
    pub fn record(&mut self, config: &AdaptiveConfig, obs: &ShiftObservation) -> bool {
        // Only clean upshifts teach anything.
        if obs.to <= obs.from || obs.kickdown_seen {
            return false;
        }
        if obs.throttle_pct > config.throttle_ceiling_pct {
            return false;
        }
        let Some(i) = obs.to.upshift_index() else {
            return false;
        };

        if obs.duration_ms > config.slow_shift_ms {
            // Too slow: firm it up next time.
            self.offsets[i] = self.offsets[i].saturating_sub(config.step).max(-config.limit);
        } else if obs.duration_ms < config.fast_shift_ms {
            // Harsh: soften.
            self.offsets[i] = self.offsets[i].saturating_add(config.step).min(config.limit);
        }
        self.counts[i] = self.counts[i].saturating_add(1);
        true
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(from: Gear, to: Gear, duration_ms: u32) -> ShiftObservation {
        ShiftObservation {
            from,
            to,
            duration_ms,
            kickdown_seen: false,
            throttle_pct: 30.0,
        }
    }

    #[test]
    fn slow_shift_firms_the_trim() {
        let mut trim = AdaptiveTrim::default();
        assert!(trim.record(&AdaptiveConfig::default(), &obs(Gear::Second, Gear::Third, 500)));
        assert_eq!(trim.offset(1), -2);
        assert_eq!(trim.counts()[1], 1);
    }

    #[test]
    fn fast_shift_softens_the_trim() {
        let mut trim = AdaptiveTrim::default();
        assert!(trim.record(&AdaptiveConfig::default(), &obs(Gear::First, Gear::Second, 300)));
        assert_eq!(trim.offset(0), 2);
    }

    #[test]
    fn in_band_duration_counts_but_does_not_adjust() {
        let mut trim = AdaptiveTrim::default();
        assert!(trim.record(&AdaptiveConfig::default(), &obs(Gear::Third, Gear::Fourth, 400)));
        assert_eq!(trim.offset(2), 0);
        assert_eq!(trim.counts()[2], 1);
    }

    #[test]
    fn trim_clamps_at_bound() {
        let config = AdaptiveConfig::default();
        let mut trim = AdaptiveTrim::default();
        for _ in 0..25 {
            trim.record(&config, &obs(Gear::Second, Gear::Third, 600));
        }
        assert_eq!(trim.offset(1), -20);
        assert_eq!(trim.counts()[1], 25);

        let mut trim = AdaptiveTrim::default();
        for _ in 0..25 {
            trim.record(&config, &obs(Gear::Second, Gear::Third, 100));
        }
        assert_eq!(trim.offset(1), 20);
    }

    #[test]
    fn downshifts_do_not_learn() {
        let mut trim = AdaptiveTrim::default();
        assert!(!trim.record(&AdaptiveConfig::default(), &obs(Gear::Third, Gear::Second, 600)));
        assert!(!trim.record(&AdaptiveConfig::default(), &obs(Gear::Third, Gear::Third, 600)));
        assert_eq!(trim, AdaptiveTrim::default());
    }

    #[test]
    fn kickdown_episodes_do_not_learn() {
        let mut trim = AdaptiveTrim::default();
        let observation = ShiftObservation {
            kickdown_seen: true,
            ..obs(Gear::Second, Gear::Third, 600)
        };
        assert!(!trim.record(&AdaptiveConfig::default(), &observation));
        assert_eq!(trim.offset(1), 0);
        assert_eq!(trim.counts()[1], 0);
    }

    #[test]
    fn heavy_throttle_updates_are_skipped() {
        let mut trim = AdaptiveTrim::default();
        let observation = ShiftObservation {
            throttle_pct: 80.0,
            ..obs(Gear::Second, Gear::Third, 600)
        };
        assert!(!trim.record(&AdaptiveConfig::default(), &observation));
        assert_eq!(trim, AdaptiveTrim::default());
    }

    #[test]
    fn reset_zeroes_everything() {
        let mut trim = AdaptiveTrim::default();
        let config = AdaptiveConfig::default();
        trim.record(&config, &obs(Gear::First, Gear::Second, 600));
        trim.record(&config, &obs(Gear::Second, Gear::Third, 300));
        trim.reset();
        assert_eq!(trim, AdaptiveTrim::default());
    }
}
