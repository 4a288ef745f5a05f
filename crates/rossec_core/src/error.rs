use std::borrow::Cow;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Convenient result alias for rossec crates.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Log/handling importance. Maps onto tracing levels in the runner.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub enum Severity {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

/// Where an error came from (helps triage and routing).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Domain {
    Lifecycle,
    Rpc,
    Config,
    Other,
}

/// Stable error "kind" for matching/branching.
///
/// The four RPC outcomes (`ServiceUnavailable`, `Timeout`, `RemoteCallFailed`,
/// `Cancelled`) are what the runner hands back to the attack sequencer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ErrorKind {
    InvalidArgument,
    InvalidTransition,
    ServiceUnavailable,
    Timeout,
    RemoteCallFailed,
    Cancelled,
    ProtocolViolation,
    Other,
}

/// Optional structured payload for rich context without forcing allocation.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Payload {
    None,

    /// Generic key/value context (usually no heap alloc if using &str).
    Context {
        key: &'static str,
        value: Cow<'static, str>,
    },

    /// Lifecycle-specific context.
    LifecycleTransition {
        from_state: u8,
        via_transition: u8,
    },

    /// Remote service the failed call was addressed to.
    Service {
        name: Cow<'static, str>,
        timeout_ms: u64,
    },

    /// Arbitrary numeric detail (e.g. an unknown wire id).
    Code(u32),
}

/// The one error type that crosses module boundaries in rossec crates.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
#[error("{severity:?}: {message}")]
pub struct CoreError {
    pub domain: Domain,
    pub kind: ErrorKind,
    pub severity: Severity,
    pub message: Cow<'static, str>,
    pub payload: Payload,
}

impl CoreError {
    // ---------------- Fluent entry points ----------------

    #[inline]
    pub fn warn() -> ErrB {
        ErrB::new(Severity::Warn)
    }
    #[inline]
    pub fn error() -> ErrB {
        ErrB::new(Severity::Error)
    }

    /// Construct a lifecycle InvalidTransition error with structured context.
    pub fn invalid_transition_lifecycle(from_state: u8, via_transition: u8) -> Self {
        CoreError::warn()
            .domain(Domain::Lifecycle)
            .kind(ErrorKind::InvalidTransition)
            .msg("invalid lifecycle transition")
            .payload(Payload::LifecycleTransition {
                from_state,
                via_transition,
            })
            .build()
    }

    /// The endpoint did not show up within the timeout; nothing was sent.
    pub fn service_unavailable(service: impl Into<String>, timeout: Duration) -> Self {
        let service = service.into();
        CoreError::error()
            .domain(Domain::Rpc)
            .kind(ErrorKind::ServiceUnavailable)
            .msgf(format_args!("service {service} is not available"))
            .payload(Payload::service(service, timeout))
            .build()
    }

    /// The request was sent but no answer arrived before the deadline.
    pub fn timeout(service: impl Into<String>, timeout: Duration) -> Self {
        let service = service.into();
        CoreError::error()
            .domain(Domain::Rpc)
            .kind(ErrorKind::Timeout)
            .msgf(format_args!(
                "server timed out after {}ms while calling service {service}",
                timeout.as_millis()
            ))
            .payload(Payload::service(service, timeout))
            .build()
    }

    /// An answer arrived but carried no payload.
    pub fn remote_call_failed(service: impl Into<String>, timeout: Duration) -> Self {
        let service = service.into();
        CoreError::error()
            .domain(Domain::Rpc)
            .kind(ErrorKind::RemoteCallFailed)
            .msgf(format_args!("failed to call service {service}"))
            .payload(Payload::service(service, timeout))
            .build()
    }

    /// The runner is shutting down; the in-flight call was abandoned.
    pub fn cancelled(service: impl Into<String>, timeout: Duration) -> Self {
        let service = service.into();
        CoreError::warn()
            .domain(Domain::Rpc)
            .kind(ErrorKind::Cancelled)
            .msgf(format_args!("call to service {service} cancelled by shutdown"))
            .payload(Payload::service(service, timeout))
            .build()
    }
}

impl Payload {
    fn service(name: String, timeout: Duration) -> Self {
        Payload::Service {
            name: Cow::Owned(name),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

/// Fluent builder that behaves like iterator chains (takes self, returns Self).
/// Defaults:
/// - domain = Other
/// - kind = Other
/// - message = ""
/// - payload = None
#[derive(Debug, Clone)]
pub struct ErrB {
    domain: Domain,
    kind: ErrorKind,
    severity: Severity,
    message: Cow<'static, str>,
    payload: Payload,
}

impl ErrB {
    #[inline]
    fn new(severity: Severity) -> Self {
        Self {
            domain: Domain::Other,
            kind: ErrorKind::Other,
            severity,
            message: Cow::Borrowed(""),
            payload: Payload::None,
        }
    }

    /// Set/override the domain (defaults to Domain::Other).
    #[inline]
    pub fn domain(mut self, d: Domain) -> Self {
        self.domain = d;
        self
    }

    /// Set/override the kind (defaults to ErrorKind::Other).
    #[inline]
    pub fn kind(mut self, k: ErrorKind) -> Self {
        self.kind = k;
        self
    }

    #[inline]
    pub fn msg(mut self, m: impl Into<Cow<'static, str>>) -> Self {
        self.message = m.into();
        self
    }

    /// Formatting-friendly message setter.
    #[inline]
    pub fn msgf(mut self, args: fmt::Arguments<'_>) -> Self {
        self.message = Cow::Owned(args.to_string());
        self
    }

    /// Only one payload: this replaces any previous payload.
    #[inline]
    pub fn payload(mut self, p: Payload) -> Self {
        self.payload = p;
        self
    }

    #[inline]
    pub fn build(self) -> CoreError {
        CoreError {
            domain: self.domain,
            kind: self.kind,
            severity: self.severity,
            message: self.message,
            payload: self.payload,
        }
    }
}

impl From<ErrB> for CoreError {
    fn from(b: ErrB) -> Self {
        b.build()
    }
}
