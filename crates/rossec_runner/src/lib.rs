//! rossec_runner
//!
//! Runner-side lifecycle control for ros_sec_test: drives an attack node
//! through configure/activate/deactivate/cleanup/shutdown over its
//! `change_state` and `get_state` services, with a hard timeout per call.
//!
//! Design rules:
//! - The middleware is reached only through the `transport` traits.
//! - One request per operation, no retries; failures are logged and returned.
//! - Cancellation is an injected token, never a global flag.

pub mod blocking;
pub mod client;
pub mod config;
pub mod error;
pub mod rpc;
pub mod srv;
pub mod target;
pub mod transport;
pub mod wait;

pub use blocking::BlockingLifecycleClient;
pub use client::{change_state_service_name, get_state_service_name, LifecycleServiceClient};
pub use config::RunnerConfig;
pub use target::LifecycleTarget;
pub use transport::{MemoryBus, PendingCall, ServiceClient, Transport};
pub use wait::{wait_for_result, WaitStatus};

// Re-export core types that runner users will commonly need
pub use rossec_core::error::{CoreError, ErrorKind, Result};
pub use rossec_core::lifecycle::{ros_ids, CallbackResult, LifecycleCallbacks, State};
pub use tokio_util::sync::CancellationToken;
