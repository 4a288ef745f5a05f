//! Lifecycle service payloads.
//!
//! Transport-agnostic mirrors of `lifecycle_msgs/srv/ChangeState` and
//! `lifecycle_msgs/srv/GetState`. A transport binding maps its own message
//! types onto these.

/// A request/response service kind.
pub trait ServiceType: Send + Sync + 'static {
    /// Last path segment of the endpoint, e.g. `change_state`.
    const NAME: &'static str;

    type Request: Clone + Send + Sync + 'static;
    type Response: Send + 'static;
}

/// `lifecycle_msgs/srv/ChangeState`.
#[derive(Debug, Copy, Clone)]
pub struct ChangeState;

impl ServiceType for ChangeState {
    const NAME: &'static str = "change_state";
    type Request = change_state::Request;
    type Response = change_state::Response;
}

/// `lifecycle_msgs/srv/GetState`.
#[derive(Debug, Copy, Clone)]
pub struct GetState;

impl ServiceType for GetState {
    const NAME: &'static str = "get_state";
    type Request = get_state::Request;
    type Response = get_state::Response;
}

pub mod change_state {
    /// Wire transition id (`lifecycle_msgs/msg/Transition`).
    #[derive(Debug, Copy, Clone, Eq, PartialEq)]
    pub struct Request {
        pub transition_id: u8,
    }

    /// Whether the target accepted and completed the transition.
    #[derive(Debug, Copy, Clone, Eq, PartialEq)]
    pub struct Response {
        pub success: bool,
    }
}

pub mod get_state {
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
    pub struct Request;

    /// Wire state id (`lifecycle_msgs/msg/State`) and its label.
    #[derive(Debug, Clone, Eq, PartialEq)]
    pub struct Response {
        pub state_id: u8,
        pub label: String,
    }
}
