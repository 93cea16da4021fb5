//! Control engine root.
//!
//! Gear selection from shift-point tables, kickdown detection, accumulator
//! pressure (shift firmness), lockup clutch envelope, adaptive firmness
//! trim, and the diagnostic slip computation.

pub mod adaptive;
pub mod kickdown;
pub mod lockup;
pub mod pressure;
pub mod schedule;
pub mod slip;
