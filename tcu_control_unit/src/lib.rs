//! # A340E Transmission Control Unit
//!
//! Shift-control core for a four-speed hydraulic-electronic automatic
//! transmission. A single 50 Hz run-to-completion task reads a conditioned
//! sensor snapshot, selects the target gear from throttle/speed shift-point
//! tables, walks a timed shift state machine that commands the two
//! gear-select solenoids, modulates accumulator back-pressure (shift
//! firmness) and the torque converter lockup clutch, and learns a bounded
//! per-upshift firmness trim from measured shift duration.
//!
//! ## Tick pipeline
//!
//! 1. Sensor snapshot ingest (defensive range clamps)
//! 2. Limp supervision (over-temp, output stall)
//! 3. Kickdown detection
//! 4. Gear selection + shift state machine
//! 5. Adaptive trim update on episode completion
//! 6. Accumulator pressure duty
//! 7. Lockup clutch duty
//! 8. Diagnostic snapshot publish (every Nth tick)
//!
//! All runtime state is owned by the cycle task. The tick performs no
//! blocking I/O; sensor reads return the most recent prepared snapshot.

pub mod command;
pub mod config;
pub mod control;
pub mod cycle;
pub mod diag;
pub mod hal;
pub mod safety;
pub mod shift;
