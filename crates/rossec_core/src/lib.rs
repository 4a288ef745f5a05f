//! rossec_core: ROS-agnostic lifecycle semantics for the ros_sec_test runner.
//!
//! Design goals:
//! - Pure, testable logic (no ROS or transport deps).
//! - Explicit types; no macro wizardry.
//! - One structured error type shared by every crate in the workspace.

pub mod error;

/// Lifecycle state machine, transition engine and ROS wire id tables.
pub mod lifecycle;
