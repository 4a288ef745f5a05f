//! rossec_core::lifecycle
//!
//! Lifecycle semantics of a ROS 2 managed node, without any transport.
//!
//! The runner uses these tables to pick wire ids for the transitions it
//! requests and to interpret the state ids a target reports. The in-memory
//! target uses the engine to answer those requests.

mod engine;
mod ros;
mod state;
mod transition;

pub use engine::{
    available_transitions, begin, drive, finish, finish_with_error_handling,
    goal_state_for_transition, run_callback, CallbackResult, LifecycleCallbacks,
};
pub use ros::{
    ros_ids, ros_state_ids, ros_transition_id, shutdown_id_matches_state,
    shutdown_ros_id_for_state, transition_from_ros_id,
};
pub use state::{State, ALL_STATES};
pub use transition::Transition;
