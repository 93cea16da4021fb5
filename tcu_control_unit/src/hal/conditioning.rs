//! Provider-side sensor conditioning primitives.
//!
//! The control core consumes already-conditioned snapshots; these are the
//! building blocks the provider assembles them from: exponential smoothing
//! for the analog channels, lock-free pulse capture for the three speed
//! inputs, and ADC scaling for the fluid temperature sender.

use std::sync::atomic::{AtomicU64, Ordering};

// ─── EMA filter ─────────────────────────────────────────────────────

/// First-order exponential moving average.
///
/// `alpha` in (0, 1]: the weight of the newest sample. The first sample
/// primes the filter directly.
#[derive(Debug, Clone)]
pub struct EmaFilter {
    alpha: f32,
    value: Option<f32>,
}

impl EmaFilter {
    pub fn new(alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(f32::EPSILON, 1.0),
            value: None,
        }
    }

    /// Feed one sample, returning the filtered value.
    pub fn update(&mut self, sample: f32) -> f32 {
        let next = match self.value {
            Some(v) => v + self.alpha * (sample - v),
            None => sample,
        };
        self.value = Some(next);
        next
    }

    /// Current filtered value (zero before the first sample).
    pub fn value(&self) -> f32 {
        self.value.unwrap_or(0.0)
    }
}

// ─── Pulse capture ──────────────────────────────────────────────────

/// Single-writer pulse capture shared between an interrupt handler and the
/// conditioner task.
///
/// The ISR calls [`PulseChannel::record_pulse`]; the conditioner reads a
/// frequency. Both sides use per-field atomics on a monotonic microsecond
/// clock — no mutex, no critical section. A period older than the
/// staleness bound reads as zero, which downstream logic treats naturally
/// (no upshift, forces downshifts, releases lockup).
#[derive(Debug, Default)]
pub struct PulseChannel {
    last_pulse_us: AtomicU64,
    period_us: AtomicU64,
}

impl PulseChannel {
    pub const fn new() -> Self {
        Self {
            last_pulse_us: AtomicU64::new(0),
            period_us: AtomicU64::new(0),
        }
    }

    /// Record one pulse edge (ISR side).
    pub fn record_pulse(&self, now_us: u64) {
        let prev = self.last_pulse_us.swap(now_us, Ordering::Relaxed);
        if prev != 0 && now_us > prev {
            self.period_us.store(now_us - prev, Ordering::Relaxed);
        }
    }

    /// Pulse frequency [Hz]; zero before two pulses or past the staleness
    /// bound (conditioner side).
    pub fn frequency_hz(&self, now_us: u64, stale_bound_us: u64) -> f32 {
        let last = self.last_pulse_us.load(Ordering::Relaxed);
        let period = self.period_us.load(Ordering::Relaxed);
        if last == 0 || period == 0 || now_us.saturating_sub(last) > stale_bound_us {
            return 0.0;
        }
        1_000_000.0 / period as f32
    }
}

// ─── ADC scaling ────────────────────────────────────────────────────

/// ATF temperature [°C] from the thermistor conditioning stage output.
///
/// The sender op-amp maps −40..150 °C onto 0.1..2.0 V as (v − 0.5) · 100;
/// out-of-range readings clamp instead of propagating.
pub fn fluid_temp_from_volts(volts: f32) -> f32 {
    ((volts - 0.5) * 100.0).clamp(-40.0, 150.0)
}

// ─── Tests ──────────────────────────────────────────────────────────
