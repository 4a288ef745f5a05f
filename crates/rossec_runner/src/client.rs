use std::time::Duration;

use rossec_core::error::{CoreError, Domain, ErrorKind, Payload, Result};
use rossec_core::lifecycle::{ros_ids, ros_transition_id, State, Transition};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::RunnerConfig;
use crate::error::log_core_error;
use crate::rpc::call_once_ready;
use crate::srv::{change_state, get_state, ChangeState, GetState, ServiceType};
use crate::transport::{ServiceClient, Transport};

/// `/<target>/<service>`.
pub fn service_name(target_node_name: &str, service: &str) -> String {
    format!("/{target_node_name}/{service}")
}

pub fn change_state_service_name(target_node_name: &str) -> String {
    service_name(target_node_name, ChangeState::NAME)
}

pub fn get_state_service_name(target_node_name: &str) -> String {
    service_name(target_node_name, GetState::NAME)
}

/// Drives one remote managed node through its lifecycle.
///
/// Holds the node's `change_state` and `get_state` endpoints for its whole
/// lifetime. Every call owns its own pending request, so the client can be
/// shared between tasks; the order in which concurrent transitions reach
/// the target is up to the caller.
pub struct LifecycleServiceClient {
    target_node_name: String,
    client_change_state: Box<dyn ServiceClient<ChangeState>>,
    client_get_state: Box<dyn ServiceClient<GetState>>,
    default_timeout: Duration,
    poll_slice: Duration,
    cancel: CancellationToken,
}

impl LifecycleServiceClient {
    /// Bind to `target_node_name` with default timeouts.
    pub fn new<T: Transport>(
        transport: &T,
        target_node_name: impl Into<String>,
        cancel: CancellationToken,
    ) -> Self {
        Self::from_config(transport, &RunnerConfig::new(target_node_name), cancel)
    }

    pub fn from_config<T: Transport>(
        transport: &T,
        config: &RunnerConfig,
        cancel: CancellationToken,
    ) -> Self {
        let target = config.target_node.as_str();
        Self::from_clients(
            config,
            transport.create_client::<ChangeState>(&change_state_service_name(target)),
            transport.create_client::<GetState>(&get_state_service_name(target)),
            cancel,
        )
    }

    /// Use endpoints created elsewhere (e.g. instrumented ones).
    pub fn from_clients(
        config: &RunnerConfig,
        client_change_state: Box<dyn ServiceClient<ChangeState>>,
        client_get_state: Box<dyn ServiceClient<GetState>>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            target_node_name: config.target_node.clone(),
            client_change_state,
            client_get_state,
            default_timeout: config.default_timeout,
            poll_slice: config.poll_slice,
            cancel,
        }
    }

    pub fn target_node_name(&self) -> &str {
        &self.target_node_name
    }

    pub fn change_state_service_name(&self) -> &str {
        self.client_change_state.service_name()
    }

    pub fn get_state_service_name(&self) -> &str {
        self.client_get_state.service_name()
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Wire id of the target's current state.
    pub async fn get_state(&self, time_out: Duration) -> Result<u8> {
        let resp = call_once_ready(
            self.client_get_state.as_ref(),
            get_state::Request,
            time_out,
            self.poll_slice,
            &self.cancel,
        )
        .await?;
        Ok(resp.state_id)
    }

    /// Like [`get_state`](Self::get_state), decoded into a [`State`].
    pub async fn current_state(&self, time_out: Duration) -> Result<State> {
        let id = self.get_state(time_out).await?;
        State::from_id(id).ok_or_else(|| {
            let err = CoreError::warn()
                .domain(Domain::Lifecycle)
                .kind(ErrorKind::ProtocolViolation)
                .msgf(format_args!(
                    "{} reported unknown lifecycle state id {id}",
                    self.target_node_name
                ))
                .payload(Payload::Code(u32::from(id)))
                .build();
            log_core_error(&err);
            err
        })
    }

    /// Send one transition request and return the target's answer.
    ///
    /// An answer with `success == false` is still `Ok`: the target replied,
    /// it just refused or failed the transition.
    pub async fn try_change_state(
        &self,
        transition_id: u8,
        time_out: Duration,
    ) -> Result<change_state::Response> {
        info!(
            node = %self.target_node_name,
            transition_id,
            "requesting lifecycle transition"
        );
        let resp = call_once_ready(
            self.client_change_state.as_ref(),
            change_state::Request { transition_id },
            time_out,
            self.poll_slice,
            &self.cancel,
        )
        .await?;

        if !resp.success {
            warn!(
                node = %self.target_node_name,
                transition_id,
                "target answered but did not complete the transition"
            );
        }
        Ok(resp)
    }

    /// `true` iff the target answered the request.
    ///
    /// This does not mean the target reached the goal state; follow up with
    /// [`get_state`](Self::get_state) when that matters.
    pub async fn change_state(&self, transition_id: u8, time_out: Duration) -> bool {
        self.try_change_state(transition_id, time_out).await.is_ok()
    }

    pub async fn configure(&self) -> bool {
        self.change_state(ros_ids::TRANSITION_CONFIGURE, self.default_timeout)
            .await
    }

    pub async fn activate(&self) -> bool {
        self.change_state(ros_ids::TRANSITION_ACTIVATE, self.default_timeout)
            .await
    }

    pub async fn deactivate(&self) -> bool {
        self.change_state(ros_ids::TRANSITION_DEACTIVATE, self.default_timeout)
            .await
    }

    pub async fn cleanup(&self) -> bool {
        self.change_state(ros_ids::TRANSITION_CLEANUP, self.default_timeout)
            .await
    }

    /// Shut the target down from whatever primary state it is in.
    ///
    /// The wire protocol has one shutdown id per start state, so the current
    /// state is queried first. Returns `false` without sending a transition
    /// if the query fails or the target has no shutdown edge (finalized or
    /// mid-transition).
    pub async fn shutdown(&self) -> bool {
        let state = match self.current_state(self.default_timeout).await {
            Ok(state) => state,
            Err(_) => return false,
        };

        match ros_transition_id(state, Transition::Shutdown) {
            Some(transition_id) => self.change_state(transition_id, self.default_timeout).await,
            None => {
                warn!(
                    node = %self.target_node_name,
                    state = state.label(),
                    "no shutdown transition from current state"
                );
                false
            }
        }
    }
}
