use rossec_core::error::{CoreError, Payload, Severity};

/// Emit `err` through tracing at the level its severity asks for.
pub fn log_core_error(err: &CoreError) {
    let service = match &err.payload {
        Payload::Service { name, .. } => name.as_ref(),
        _ => "",
    };
    let kind = err.kind;

    match err.severity {
        Severity::Trace => tracing::trace!(?kind, service, "{err}"),
        Severity::Debug => tracing::debug!(?kind, service, "{err}"),
        Severity::Info => tracing::info!(?kind, service, "{err}"),
        Severity::Warn => tracing::warn!(?kind, service, "{err}"),
        Severity::Error | Severity::Fatal => tracing::error!(?kind, service, "{err}"),
    }
}
