use crate::error::{CoreError, Result};

use super::{State, Transition};

/// Outcome of a lifecycle callback on the managed side.
///
/// - Success: move on to the goal state
/// - Failure: fall back to the stable state the transition started from
/// - Error: enter `ErrorProcessing`, then `on_error()` decides recovery
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CallbackResult {
    Success,
    Failure,
    Error,
}

/// Hooks a managed entity runs while a transition is in flight.
pub trait LifecycleCallbacks {
    fn on_configure(&mut self) -> CallbackResult;
    fn on_activate(&mut self) -> CallbackResult;
    fn on_deactivate(&mut self) -> CallbackResult;
    fn on_cleanup(&mut self) -> CallbackResult;
    fn on_shutdown(&mut self) -> CallbackResult;

    /// Runs after any callback returned `CallbackResult::Error`.
    /// Success recovers to Unconfigured, anything else finalizes.
    fn on_error(&mut self) -> CallbackResult;
}

/// Dispatch `transition` to the matching callback.
pub fn run_callback(transition: Transition, callbacks: &mut dyn LifecycleCallbacks) -> CallbackResult {
    match transition {
        Transition::Configure => callbacks.on_configure(),
        Transition::Activate => callbacks.on_activate(),
        Transition::Deactivate => callbacks.on_deactivate(),
        Transition::Cleanup => callbacks.on_cleanup(),
        Transition::Shutdown => callbacks.on_shutdown(),
    }
}

/// Enter the intermediate state for `via`, starting from a stable state.
///
/// Rejects transitions that are not edges of the lifecycle graph, including
/// any request made while the entity is already transitioning.
pub fn begin(current: State, via: Transition) -> Result<State> {
    use State::*;
    use Transition::*;

    let next = match (current, via) {
        (Unconfigured, Configure) => Configuring,
        (Inactive, Activate) => Activating,
        (Active, Deactivate) => Deactivating,
        (Inactive, Cleanup) => CleaningUp,
        (Unconfigured | Inactive | Active, Shutdown) => ShuttingDown,
        _ => {
            return Err(CoreError::invalid_transition_lifecycle(
                current.id(),
                via.id(),
            ))
        }
    };

    Ok(next)
}

/// Leave an intermediate state according to the callback outcome.
pub fn finish(intermediate: State, via: Transition, result: CallbackResult) -> Result<State> {
    use CallbackResult::*;
    use State::*;
    use Transition::*;

    let next = match (intermediate, via, result) {
        (Configuring, Configure, Success) => Inactive,
        (Configuring, Configure, Failure) => Unconfigured,
        (Activating, Activate, Success) => Active,
        (Activating, Activate, Failure) => Inactive,
        (Deactivating, Deactivate, Success) => Inactive,
        (Deactivating, Deactivate, Failure) => Active,
        (CleaningUp, Cleanup, Success) => Unconfigured,
        (CleaningUp, Cleanup, Failure) => Inactive,

        // shutdown is terminal whatever the callback says
        (ShuttingDown, Shutdown, _) => Finalized,

        (Configuring, Configure, Error)
        | (Activating, Activate, Error)
        | (Deactivating, Deactivate, Error)
        | (CleaningUp, Cleanup, Error) => ErrorProcessing,

        _ => {
            return Err(CoreError::invalid_transition_lifecycle(
                intermediate.id(),
                via.id(),
            ))
        }
    };

    Ok(next)
}

/// `finish`, then resolve `ErrorProcessing` with the `on_error` outcome.
///
/// `on_error` is only consulted when `finish` lands in `ErrorProcessing`;
/// a missing outcome there is treated as failure.
pub fn finish_with_error_handling(
    intermediate: State,
    via: Transition,
    result: CallbackResult,
    on_error: Option<CallbackResult>,
) -> Result<State> {
    let state = finish(intermediate, via, result)?;
    if state != State::ErrorProcessing {
        return Ok(state);
    }

    Ok(match on_error {
        Some(CallbackResult::Success) => State::Unconfigured,
        _ => State::Finalized,
    })
}

/// Run a full transition against `callbacks`.
///
/// Returns `(intermediate_state, final_stable_state)`.
pub fn drive(
    current: State,
    via: Transition,
    callbacks: &mut dyn LifecycleCallbacks,
) -> Result<(State, State)> {
    let intermediate = begin(current, via)?;
    let result = run_callback(via, callbacks);
    // shutdown errors finalize directly, so on_error must not run for them
    let settled = finish(intermediate, via, result)?;
    let on_error = (settled == State::ErrorProcessing).then(|| callbacks.on_error());
    let final_state = finish_with_error_handling(intermediate, via, result, on_error)?;
    Ok((intermediate, final_state))
}

/// Stable state reached when `transition` succeeds from `start`.
pub fn goal_state_for_transition(start: State, transition: Transition) -> Result<State> {
    let intermediate = begin(start, transition)?;
    finish(intermediate, transition, CallbackResult::Success)
}

/// Transitions a target in `state` will accept. Empty while busy or finalized.
pub fn available_transitions(state: State) -> &'static [Transition] {
    use State::*;
    use Transition::*;

    match state {
        Unconfigured => &[Configure, Shutdown],
        Inactive => &[Activate, Cleanup, Shutdown],
        Active => &[Deactivate, Shutdown],
        Finalized => &[],
        Configuring | CleaningUp | Activating | Deactivating | ShuttingDown | ErrorProcessing => {
            &[]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Domain, ErrorKind, Payload};

    struct Scripted {
        result: CallbackResult,
        on_error: CallbackResult,
        error_calls: usize,
    }

    impl Scripted {
        fn new(result: CallbackResult, on_error: CallbackResult) -> Self {
            Self {
                result,
                on_error,
                error_calls: 0,
            }
        }
    }

    impl LifecycleCallbacks for Scripted {
        fn on_configure(&mut self) -> CallbackResult {
            self.result
        }
        fn on_activate(&mut self) -> CallbackResult {
            self.result
        }
        fn on_deactivate(&mut self) -> CallbackResult {
            self.result
        }
        fn on_cleanup(&mut self) -> CallbackResult {
            self.result
        }
        fn on_shutdown(&mut self) -> CallbackResult {
            self.result
        }
        fn on_error(&mut self) -> CallbackResult {
            self.error_calls += 1;
            self.on_error
        }
    }

    #[test]
    fn invalid_transition_has_payload() {
        let e = begin(State::Active, Transition::Cleanup).unwrap_err();
        assert_eq!(e.kind, ErrorKind::InvalidTransition);
        assert_eq!(e.domain, Domain::Lifecycle);
        assert_eq!(
            e.payload,
            Payload::LifecycleTransition {
                from_state: State::Active.id(),
                via_transition: Transition::Cleanup.id(),
            }
        );
    }

    #[test]
    fn finalized_rejects_shutdown() {
        assert!(begin(State::Finalized, Transition::Shutdown).is_err());
        assert!(begin(State::Activating, Transition::Shutdown).is_err());
    }

    #[test]
    fn on_error_only_runs_after_error() {
        let mut cb = Scripted::new(CallbackResult::Failure, CallbackResult::Success);
        let (mid, end) = drive(State::Inactive, Transition::Activate, &mut cb).unwrap();
        assert_eq!(mid, State::Activating);
        assert_eq!(end, State::Inactive);
        assert_eq!(cb.error_calls, 0);

        let mut cb = Scripted::new(CallbackResult::Error, CallbackResult::Failure);
        let (_, end) = drive(State::Inactive, Transition::Activate, &mut cb).unwrap();
        assert_eq!(end, State::Finalized);
        assert_eq!(cb.error_calls, 1);
    }

    #[test]
    fn shutdown_error_still_finalizes_without_error_processing() {
        let mut cb = Scripted::new(CallbackResult::Error, CallbackResult::Success);
        let (_, end) = drive(State::Active, Transition::Shutdown, &mut cb).unwrap();
        assert_eq!(end, State::Finalized);
        assert_eq!(cb.error_calls, 0);
    }

    #[test]
    fn available_transitions_follow_begin() {
        for state in super::super::ALL_STATES {
            for transition in available_transitions(state) {
                assert!(begin(state, *transition).is_ok(), "{state:?} {transition:?}");
            }
        }
    }
}
