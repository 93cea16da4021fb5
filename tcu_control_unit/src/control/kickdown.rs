//! Kickdown detection.
//!
//! Kickdown needs both an absolute high-load throttle and a recent sharp
//! rise; steady high-throttle cruise on a grade does not arm it.

use crate::config::KickdownConfig;

/// Tracks throttle movement across ticks.
///
/// One instance lives on the cycle runner and is updated exactly once per
/// tick, before gear selection.
#[derive(Debug, Clone)]
pub struct KickdownDetector {
    last_throttle_pct: f32,
    last_sharp_rise_ms: Option<u64>,
}

impl KickdownDetector {
    pub const fn new() -> Self {
        Self {
            last_throttle_pct: 0.0,
            last_sharp_rise_ms: None,
        }
    }

    /// Feed this tick's throttle sample; returns whether kickdown is active.
    pub fn update(&mut self, config: &KickdownConfig, throttle_pct: f32, now_ms: u64) -> bool {
        if throttle_pct - self.last_throttle_pct >= config.rise_pct {
            self.last_sharp_rise_ms = Some(now_ms);
        }
        self.last_throttle_pct = throttle_pct;

        throttle_pct > config.throttle_floor_pct
            && self
                .last_sharp_rise_ms
                .is_some_and(|rise| now_ms.saturating_sub(rise) < config.window_ms)
    }
}

impl Default for KickdownDetector {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
