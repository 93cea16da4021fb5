//! # TCU Common
//!
//! Shared vocabulary for the A340E transmission control unit workspace:
//! gear and shift-phase enums, the per-tick sensor snapshot, driveline
//! constants, the fault taxonomy, and the diagnostic snapshot the control
//! core publishes at tick end.
//!
//! Everything here is plain data. The control logic lives in
//! `tcu_control_unit`; external consumers (bench tooling, log readers)
//! depend only on this crate.

pub mod consts;
pub mod diag;
pub mod error;
pub mod state;

pub mod prelude;
