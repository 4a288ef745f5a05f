//! Request/response transport seam.
//!
//! The runner never talks to a middleware directly. A binding implements
//! [`Transport`] (endpoint creation) and [`ServiceClient`] (availability
//! probe + dispatch); everything above works against these traits.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::sync::oneshot;

use crate::srv::ServiceType;

pub mod memory;

pub use memory::{MemoryBus, ServiceHandle};

/// Boxed future returned by transport trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Client end of one named service.
pub trait ServiceClient<S: ServiceType>: Send + Sync {
    /// Fully qualified endpoint name.
    fn service_name(&self) -> &str;

    /// Resolve to `true` once the service is reachable, `false` if `timeout`
    /// passes first.
    fn wait_for_service(&self, timeout: Duration) -> BoxFuture<'_, bool>;

    /// Dispatch `request` without waiting for the answer.
    fn send_request(&self, request: S::Request) -> PendingCall<S::Response>;
}

/// Factory for service clients.
pub trait Transport {
    fn create_client<S: ServiceType>(&self, service_name: &str) -> Box<dyn ServiceClient<S>>;
}

/// An in-flight request.
///
/// Resolves with `Some(response)`, or with `None` when the remote side answered
/// without a payload or went away before answering.
#[derive(Debug)]
pub struct PendingCall<T> {
    rx: oneshot::Receiver<Option<T>>,
    outcome: Option<Option<T>>,
}

/// Producer side of a [`PendingCall`], held by the transport.
#[derive(Debug)]
pub struct Responder<T> {
    tx: oneshot::Sender<Option<T>>,
}

impl<T> PendingCall<T> {
    pub fn channel() -> (Responder<T>, PendingCall<T>) {
        let (tx, rx) = oneshot::channel();
        (
            Responder { tx },
            PendingCall {
                rx,
                outcome: None,
            },
        )
    }

    /// A call that is already resolved with `outcome`.
    pub fn resolved(outcome: Option<T>) -> Self {
        let (responder, mut pending) = Self::channel();
        responder.respond(outcome);
        pending.poll_now();
        pending
    }

    pub fn is_ready(&self) -> bool {
        self.outcome.is_some()
    }

    /// Wait at most `slice` for the call to resolve. Returns readiness.
    pub async fn wait_for(&mut self, slice: Duration) -> bool {
        if self.poll_now() {
            return true;
        }
        match tokio::time::timeout(slice, &mut self.rx).await {
            Ok(received) => {
                self.outcome = Some(received.unwrap_or(None));
                true
            }
            Err(_) => false,
        }
    }

    /// Consume the call. `None` if it never resolved or resolved empty.
    pub fn into_response(self) -> Option<T> {
        self.outcome.flatten()
    }

    fn poll_now(&mut self) -> bool {
        if self.outcome.is_some() {
            return true;
        }
        match self.rx.try_recv() {
            Ok(value) => {
                self.outcome = Some(value);
                true
            }
            Err(oneshot::error::TryRecvError::Closed) => {
                self.outcome = Some(None);
                true
            }
            Err(oneshot::error::TryRecvError::Empty) => false,
        }
    }
}

impl<T> Responder<T> {
    /// Deliver the answer. Ignored if the caller already gave up.
    pub fn respond(self, response: Option<T>) {
        let _ = self.tx.send(response);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn pending_call_resolves_with_payload() {
        let (responder, mut pending) = PendingCall::<u8>::channel();
        assert!(!pending.wait_for(Duration::from_millis(100)).await);
        assert!(!pending.is_ready());

        responder.respond(Some(7));
        assert!(pending.wait_for(Duration::from_millis(100)).await);
        assert_eq!(pending.into_response(), Some(7));
    }

    #[tokio::test]
    async fn dropped_responder_resolves_empty() {
        let (responder, mut pending) = PendingCall::<u8>::channel();
        drop(responder);
        assert!(pending.wait_for(Duration::from_millis(100)).await);
        assert_eq!(pending.into_response(), None);
    }

    #[test]
    fn resolved_call_is_ready_immediately() {
        let pending = PendingCall::resolved(Some("ok"));
        assert!(pending.is_ready());
        assert_eq!(pending.into_response(), Some("ok"));
    }
}
