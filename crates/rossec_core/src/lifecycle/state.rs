use super::ros::ros_state_ids;

/// Managed-node lifecycle states, primary and intermediate.
///
/// Primary states are the only ones a runner can ask a target to settle in:
/// Unconfigured, Inactive, Active, Finalized. The intermediate ones are only
/// observable through `get_state` while a target is busy running a callback.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum State {
    // Primary
    Unconfigured,
    Inactive,
    Active,
    Finalized,

    // Intermediate
    Configuring,
    CleaningUp,
    Activating,
    Deactivating,
    ShuttingDown,
    ErrorProcessing,
}

impl State {
    /// Wire id (`lifecycle_msgs/msg/State`).
    pub const fn id(self) -> u8 {
        match self {
            State::Unconfigured => ros_state_ids::PRIMARY_STATE_UNCONFIGURED,
            State::Inactive => ros_state_ids::PRIMARY_STATE_INACTIVE,
            State::Active => ros_state_ids::PRIMARY_STATE_ACTIVE,
            State::Finalized => ros_state_ids::PRIMARY_STATE_FINALIZED,
            State::Configuring => ros_state_ids::TRANSITION_STATE_CONFIGURING,
            State::CleaningUp => ros_state_ids::TRANSITION_STATE_CLEANINGUP,
            State::ShuttingDown => ros_state_ids::TRANSITION_STATE_SHUTTINGDOWN,
            State::Activating => ros_state_ids::TRANSITION_STATE_ACTIVATING,
            State::Deactivating => ros_state_ids::TRANSITION_STATE_DEACTIVATING,
            State::ErrorProcessing => ros_state_ids::TRANSITION_STATE_ERRORPROCESSING,
        }
    }

    /// Inverse of [`State::id`]; `None` for ids outside the protocol.
    pub fn from_id(id: u8) -> Option<State> {
        ALL_STATES.into_iter().find(|s| s.id() == id)
    }

    pub const fn is_primary(self) -> bool {
        matches!(
            self,
            State::Unconfigured | State::Inactive | State::Active | State::Finalized
        )
    }

    pub const fn is_transitioning(self) -> bool {
        !self.is_primary()
    }

    /// Label reported in `GetState` responses.
    pub const fn label(self) -> &'static str {
        match self {
            State::Unconfigured => "unconfigured",
            State::Inactive => "inactive",
            State::Active => "active",
            State::Finalized => "finalized",
            State::Configuring => "configuring",
            State::CleaningUp => "cleaningup",
            State::Activating => "activating",
            State::Deactivating => "deactivating",
            State::ShuttingDown => "shuttingdown",
            State::ErrorProcessing => "errorprocessing",
        }
    }
}

/// Every lifecycle state, primary first.
pub const ALL_STATES: [State; 10] = [
    State::Unconfigured,
    State::Inactive,
    State::Active,
    State::Finalized,
    State::Configuring,
    State::CleaningUp,
    State::Activating,
    State::Deactivating,
    State::ShuttingDown,
    State::ErrorProcessing,
];
