//! Structured logging facility for revfeed
//!
//! - Single initialization point via `init(profile)`
//! - Structured logging macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//! - Test capture mode for deterministic assertions
//!
//! # Usage
//!
//! ```rust
//! use revfeed_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```
//!
//! Every event carries `component`, `op` and `event`. Operations that end in
//! failure also carry `err_kind` and `err_code` taken from [`crate::errors::ExError`].

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
