//! In-process service registry.
//!
//! Lets a runner talk to a loopback lifecycle target (or a scripted fake) by
//! name, with the same availability/dispatch semantics a middleware binding
//! provides. Handlers run on spawned tokio tasks, so a slow handler never
//! blocks the caller.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, warn};

use super::{BoxFuture, PendingCall, ServiceClient, Transport};
use crate::srv::ServiceType;

type Handler<S> = Arc<
    dyn Fn(<S as ServiceType>::Request) -> BoxFuture<'static, Option<<S as ServiceType>::Response>>
        + Send
        + Sync,
>;

struct Entry {
    id: u64,
    handler: Arc<dyn Any + Send + Sync>,
}

struct Inner {
    services: Mutex<HashMap<String, Entry>>,
    // bumped on every advertise/withdraw so waiters can re-check
    generation: watch::Sender<u64>,
    next_id: AtomicU64,
}

/// Shared, cloneable registry of named services.
#[derive(Clone)]
pub struct MemoryBus {
    inner: Arc<Inner>,
}

/// Keeps a service advertised; dropping it withdraws the service.
#[must_use = "the service is withdrawn when the handle is dropped"]
pub struct ServiceHandle {
    inner: Arc<Inner>,
    name: String,
    id: u64,
}

impl MemoryBus {
    pub fn new() -> Self {
        let (generation, _rx) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                services: Mutex::new(HashMap::new()),
                generation,
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Advertise `name`, answering each request with `handler`.
    ///
    /// A handler resolving to `None` models a server that answers without a
    /// payload. Advertising a name twice replaces the earlier server.
    pub fn advertise<S, F, Fut>(&self, name: impl Into<String>, handler: F) -> ServiceHandle
    where
        S: ServiceType,
        F: Fn(S::Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Option<S::Response>> + Send + 'static,
    {
        let name = name.into();
        let handler: Handler<S> = Arc::new(
            move |req: S::Request| -> BoxFuture<'static, Option<S::Response>> {
                Box::pin(handler(req))
            },
        );
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);

        let replaced = self
            .inner
            .lock_services()
            .insert(
                name.clone(),
                Entry {
                    id,
                    handler: Arc::new(handler),
                },
            )
            .is_some();
        if replaced {
            warn!(service = %name, "service re-advertised; previous server replaced");
        }
        self.inner.bump();
        debug!(service = %name, "service advertised");

        ServiceHandle {
            inner: Arc::clone(&self.inner),
            name,
            id,
        }
    }

    pub fn is_advertised(&self, name: &str) -> bool {
        self.inner.lock_services().contains_key(name)
    }

    /// Names currently advertised, sorted.
    pub fn service_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.lock_services().keys().cloned().collect();
        names.sort();
        names
    }

    fn handler<S: ServiceType>(&self, name: &str) -> Option<Handler<S>> {
        let erased = self
            .inner
            .lock_services()
            .get(name)
            .map(|entry| Arc::clone(&entry.handler))?;
        match erased.downcast::<Handler<S>>() {
            Ok(handler) => Some((*handler).clone()),
            Err(_) => {
                warn!(service = %name, expected = S::NAME, "service advertised with a different type");
                None
            }
        }
    }
}

impl Default for MemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MemoryBus {
    fn create_client<S: ServiceType>(&self, service_name: &str) -> Box<dyn ServiceClient<S>> {
        Box::new(MemoryClient::<S> {
            bus: self.clone(),
            name: service_name.to_string(),
            _service: PhantomData,
        })
    }
}

impl Inner {
    fn lock_services(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        match self.services.lock() {
            Ok(guard) => guard,
            Err(poison) => {
                warn!("memory bus registry mutex poisoned");
                poison.into_inner()
            }
        }
    }

    fn bump(&self) {
        self.generation.send_modify(|g| *g += 1);
    }
}

impl ServiceHandle {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for ServiceHandle {
    fn drop(&mut self) {
        let mut services = self.inner.lock_services();
        // only withdraw if nobody re-advertised the name since
        if services.get(&self.name).is_some_and(|e| e.id == self.id) {
            services.remove(&self.name);
            drop(services);
            self.inner.bump();
            debug!(service = %self.name, "service withdrawn");
        }
    }
}

struct MemoryClient<S> {
    bus: MemoryBus,
    name: String,
    _service: PhantomData<fn() -> S>,
}

impl<S: ServiceType> ServiceClient<S> for MemoryClient<S> {
    fn service_name(&self) -> &str {
        &self.name
    }

    fn wait_for_service(&self, timeout: Duration) -> BoxFuture<'_, bool> {
        Box::pin(async move {
            let deadline = tokio::time::Instant::now() + timeout;
            let mut changes = self.bus.inner.generation.subscribe();
            loop {
                if self.bus.is_advertised(&self.name) {
                    return true;
                }
                match tokio::time::timeout_at(deadline, changes.changed()).await {
                    Ok(Ok(())) => continue,
                    _ => return self.bus.is_advertised(&self.name),
                }
            }
        })
    }

    fn send_request(&self, request: S::Request) -> PendingCall<S::Response> {
        let (responder, pending) = PendingCall::channel();

        let Some(handler) = self.bus.handler::<S>(&self.name) else {
            debug!(service = %self.name, "no server; request answered empty");
            responder.respond(None);
            return pending;
        };

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    responder.respond(handler(request).await);
                });
            }
            Err(_) => {
                warn!(service = %self.name, "send_request called outside a tokio runtime");
                responder.respond(None);
            }
        }
        pending
    }
}
