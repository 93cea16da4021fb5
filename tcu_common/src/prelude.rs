//! Convenience re-exports of the types nearly every consumer needs.

pub use crate::diag::{DiagnosticSnapshot, ShiftEvent, TcuStats};
pub use crate::error::{FaultFlags, GearError};
pub use crate::state::{Gear, SensorSnapshot, ShiftPhase};
