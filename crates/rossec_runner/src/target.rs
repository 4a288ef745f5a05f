//! Loopback managed node served on a [`MemoryBus`].
//!
//! Answers `change_state`/`get_state` the way a ROS 2 lifecycle node does,
//! using the core transition engine and user callbacks. Used to exercise
//! the runner end to end without a middleware.

use std::sync::{Arc, Mutex, MutexGuard};

use rossec_core::error::{CoreError, Domain, ErrorKind, Result};
use rossec_core::lifecycle::{
    available_transitions, drive, goal_state_for_transition, shutdown_id_matches_state,
    transition_from_ros_id, LifecycleCallbacks, State,
};
use tracing::{info, warn};

use crate::client::{change_state_service_name, get_state_service_name};
use crate::error::log_core_error;
use crate::srv::{change_state, get_state, ChangeState, GetState};
use crate::transport::{MemoryBus, ServiceHandle};

struct Managed {
    state: State,
    callbacks: Box<dyn LifecycleCallbacks + Send>,
    requests: Vec<u8>,
}

/// A managed node living on a [`MemoryBus`]. Its services stay advertised
/// until it is dropped.
pub struct LifecycleTarget {
    name: String,
    managed: Arc<Mutex<Managed>>,
    _change_state: ServiceHandle,
    _get_state: ServiceHandle,
}

impl LifecycleTarget {
    /// Advertise `/<name>/change_state` and `/<name>/get_state` on `bus`.
    /// Starts in `Unconfigured`.
    pub fn serve(
        bus: &MemoryBus,
        name: impl Into<String>,
        callbacks: Box<dyn LifecycleCallbacks + Send>,
    ) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(CoreError::error()
                .domain(Domain::Lifecycle)
                .kind(ErrorKind::InvalidArgument)
                .msg("node name must not be empty")
                .build());
        }

        let managed = Arc::new(Mutex::new(Managed {
            state: State::Unconfigured,
            callbacks,
            requests: Vec::new(),
        }));

        let on_change = Arc::clone(&managed);
        let node = name.clone();
        let change = bus.advertise::<ChangeState, _, _>(
            change_state_service_name(&name),
            move |req: change_state::Request| {
                let managed = Arc::clone(&on_change);
                let node = node.clone();
                async move {
                    // callbacks are synchronous and may take arbitrarily long
                    let work = tokio::task::spawn_blocking(move || {
                        handle_change_state(&managed, &node, req)
                    });
                    match work.await {
                        Ok(resp) => Some(resp),
                        Err(err) => {
                            warn!(error = %err, "change_state handler did not complete");
                            None
                        }
                    }
                }
            },
        );

        let on_get = Arc::clone(&managed);
        let get = bus.advertise::<GetState, _, _>(
            get_state_service_name(&name),
            move |_req: get_state::Request| {
                let state = lock(&on_get).state;
                async move {
                    Some(get_state::Response {
                        state_id: state.id(),
                        label: state.label().to_string(),
                    })
                }
            },
        );

        Ok(Self {
            name,
            managed,
            _change_state: change,
            _get_state: get,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> State {
        lock(&self.managed).state
    }

    /// Transition ids received so far, in arrival order.
    pub fn received_transitions(&self) -> Vec<u8> {
        lock(&self.managed).requests.clone()
    }
}

fn handle_change_state(
    managed: &Mutex<Managed>,
    node: &str,
    req: change_state::Request,
) -> change_state::Response {
    let mut managed = lock(managed);
    managed.requests.push(req.transition_id);

    let current = managed.state;
    let Some(transition) = transition_from_ros_id(req.transition_id)
        .filter(|_| shutdown_id_matches_state(req.transition_id, current))
        .filter(|t| available_transitions(current).contains(t))
    else {
        warn!(
            node,
            transition_id = req.transition_id,
            state = current.label(),
            "transition id not valid here"
        );
        return change_state::Response { success: false };
    };

    match drive(current, transition, managed.callbacks.as_mut()) {
        Ok((_intermediate, goal)) => {
            managed.state = goal;
            info!(
                node,
                transition = transition.label(),
                from = current.label(),
                to = goal.label(),
                "transition complete"
            );
            // the callbacks may have refused; only reaching the goal counts
            let expected = goal_state_for_transition(current, transition);
            change_state::Response {
                success: expected.is_ok_and(|g| g == goal),
            }
        }
        Err(err) => {
            log_core_error(&err);
            change_state::Response { success: false }
        }
    }
}

fn lock(managed: &Mutex<Managed>) -> MutexGuard<'_, Managed> {
    match managed.lock() {
        Ok(guard) => guard,
        Err(poison) => {
            warn!("lifecycle target mutex poisoned");
            poison.into_inner()
        }
    }
}
