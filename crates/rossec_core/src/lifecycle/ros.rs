use super::{State, Transition};

/// `lifecycle_msgs/msg/Transition` ids.
pub mod ros_ids {
    pub const TRANSITION_CREATE: u8 = 0;
    pub const TRANSITION_CONFIGURE: u8 = 1;
    pub const TRANSITION_CLEANUP: u8 = 2;
    pub const TRANSITION_ACTIVATE: u8 = 3;
    pub const TRANSITION_DEACTIVATE: u8 = 4;
    pub const TRANSITION_UNCONFIGURED_SHUTDOWN: u8 = 5;
    pub const TRANSITION_INACTIVE_SHUTDOWN: u8 = 6;
    pub const TRANSITION_ACTIVE_SHUTDOWN: u8 = 7;
    pub const TRANSITION_DESTROY: u8 = 8;
}

/// `lifecycle_msgs/msg/State` ids.
pub mod ros_state_ids {
    pub const PRIMARY_STATE_UNKNOWN: u8 = 0;
    pub const PRIMARY_STATE_UNCONFIGURED: u8 = 1;
    pub const PRIMARY_STATE_INACTIVE: u8 = 2;
    pub const PRIMARY_STATE_ACTIVE: u8 = 3;
    pub const PRIMARY_STATE_FINALIZED: u8 = 4;
    pub const TRANSITION_STATE_CONFIGURING: u8 = 10;
    pub const TRANSITION_STATE_CLEANINGUP: u8 = 11;
    pub const TRANSITION_STATE_SHUTTINGDOWN: u8 = 12;
    pub const TRANSITION_STATE_ACTIVATING: u8 = 13;
    pub const TRANSITION_STATE_DEACTIVATING: u8 = 14;
    pub const TRANSITION_STATE_ERRORPROCESSING: u8 = 15;
}

/// Map a wire transition id onto the core transition.
///
/// CREATE/DESTROY are process concerns and have no core counterpart. The
/// three shutdown ids all collapse to `Transition::Shutdown`.
pub fn transition_from_ros_id(id: u8) -> Option<Transition> {
    match id {
        ros_ids::TRANSITION_CONFIGURE => Some(Transition::Configure),
        ros_ids::TRANSITION_CLEANUP => Some(Transition::Cleanup),
        ros_ids::TRANSITION_ACTIVATE => Some(Transition::Activate),
        ros_ids::TRANSITION_DEACTIVATE => Some(Transition::Deactivate),
        ros_ids::TRANSITION_UNCONFIGURED_SHUTDOWN
        | ros_ids::TRANSITION_INACTIVE_SHUTDOWN
        | ros_ids::TRANSITION_ACTIVE_SHUTDOWN => Some(Transition::Shutdown),
        _ => None,
    }
}

/// The shutdown id a target expects when asked to shut down from `state`.
pub fn shutdown_ros_id_for_state(state: State) -> Option<u8> {
    match state {
        State::Unconfigured => Some(ros_ids::TRANSITION_UNCONFIGURED_SHUTDOWN),
        State::Inactive => Some(ros_ids::TRANSITION_INACTIVE_SHUTDOWN),
        State::Active => Some(ros_ids::TRANSITION_ACTIVE_SHUTDOWN),
        _ => None,
    }
}

/// Wire transition id for `transition` started from `start`.
pub fn ros_transition_id(start: State, transition: Transition) -> Option<u8> {
    match transition {
        Transition::Configure => Some(ros_ids::TRANSITION_CONFIGURE),
        Transition::Cleanup => Some(ros_ids::TRANSITION_CLEANUP),
        Transition::Activate => Some(ros_ids::TRANSITION_ACTIVATE),
        Transition::Deactivate => Some(ros_ids::TRANSITION_DEACTIVATE),
        Transition::Shutdown => shutdown_ros_id_for_state(start),
    }
}

/// Shutdown ids are only accepted from the state they name.
pub fn shutdown_id_matches_state(id: u8, state: State) -> bool {
    match transition_from_ros_id(id) {
        Some(Transition::Shutdown) => shutdown_ros_id_for_state(state) == Some(id),
        _ => true,
    }
}
