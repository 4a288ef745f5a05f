//! Synchronous facade for callers that do not run inside tokio.

use std::time::Duration;

use rossec_core::error::{CoreError, Domain, ErrorKind, Result};
use rossec_core::lifecycle::State;
use tokio::runtime::{Builder, Runtime};

use crate::client::LifecycleServiceClient;
use crate::srv::change_state;

/// A [`LifecycleServiceClient`] plus the runtime that drives it.
///
/// Each call blocks the calling thread until the underlying bounded wait
/// finishes. Must not be used from within an async context.
pub struct BlockingLifecycleClient {
    runtime: Runtime,
    inner: LifecycleServiceClient,
}

impl BlockingLifecycleClient {
    pub fn new(inner: LifecycleServiceClient) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(|e| {
                CoreError::error()
                    .domain(Domain::Other)
                    .kind(ErrorKind::Other)
                    .msgf(format_args!("failed to build runtime: {e}"))
                    .build()
            })?;
        Ok(Self { runtime, inner })
    }

    pub fn client(&self) -> &LifecycleServiceClient {
        &self.inner
    }

    pub fn get_state(&self, time_out: Duration) -> Result<u8> {
        self.runtime.block_on(self.inner.get_state(time_out))
    }

    pub fn current_state(&self, time_out: Duration) -> Result<State> {
        self.runtime.block_on(self.inner.current_state(time_out))
    }

    pub fn try_change_state(
        &self,
        transition_id: u8,
        time_out: Duration,
    ) -> Result<change_state::Response> {
        self.runtime
            .block_on(self.inner.try_change_state(transition_id, time_out))
    }

    pub fn change_state(&self, transition_id: u8, time_out: Duration) -> bool {
        self.runtime
            .block_on(self.inner.change_state(transition_id, time_out))
    }

    pub fn configure(&self) -> bool {
        self.runtime.block_on(self.inner.configure())
    }

    pub fn activate(&self) -> bool {
        self.runtime.block_on(self.inner.activate())
    }

    pub fn deactivate(&self) -> bool {
        self.runtime.block_on(self.inner.deactivate())
    }

    pub fn cleanup(&self) -> bool {
        self.runtime.block_on(self.inner.cleanup())
    }

    pub fn shutdown(&self) -> bool {
        self.runtime.block_on(self.inner.shutdown())
    }
}
