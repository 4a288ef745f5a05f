/// Externally requested lifecycle transitions.
///
/// The implicit `ON_*_SUCCESS/FAILURE/ERROR` edges are not listed here; they are
/// modeled by `finish(intermediate, via, CallbackResult)`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Transition {
    Configure,
    Cleanup,
    Activate,
    Deactivate,
    Shutdown,
}

impl Transition {
    /// Compact id used in error payloads. Shutdown collapses the three wire
    /// shutdown ids into one; use `ros_transition_id` for the wire value.
    pub const fn id(self) -> u8 {
        match self {
            Transition::Configure => 1,
            Transition::Cleanup => 2,
            Transition::Activate => 3,
            Transition::Deactivate => 4,
            Transition::Shutdown => 5,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Transition::Configure => "configure",
            Transition::Cleanup => "cleanup",
            Transition::Activate => "activate",
            Transition::Deactivate => "deactivate",
            Transition::Shutdown => "shutdown",
        }
    }
}
