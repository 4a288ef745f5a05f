//! One request, one bounded wait, one outcome.

use std::time::Duration;

use rossec_core::error::{CoreError, Result};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::log_core_error;
use crate::srv::ServiceType;
use crate::transport::ServiceClient;
use crate::wait::{wait_for_result, WaitStatus};

/// Call `client` once and wait for the answer.
///
/// `time_out` bounds the availability probe and, separately, the wait for
/// the answer. Failures are logged here and returned; nothing is retried:
/// - not reachable: `ServiceUnavailable`, nothing sent
/// - no answer in time: `Timeout`, the request is abandoned
/// - `cancel` fired: `Cancelled`
/// - answered without payload: `RemoteCallFailed`
pub async fn call_once_ready<S: ServiceType>(
    client: &dyn ServiceClient<S>,
    request: S::Request,
    time_out: Duration,
    poll_slice: Duration,
    cancel: &CancellationToken,
) -> Result<S::Response> {
    let service = client.service_name();

    let available = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(report(CoreError::cancelled(service, time_out))),
        up = client.wait_for_service(time_out) => up,
    };
    if !available {
        return Err(report(CoreError::service_unavailable(service, time_out)));
    }

    debug!(service, "dispatching request");
    let mut pending = client.send_request(request);

    match wait_for_result(&mut pending, time_out, poll_slice, cancel).await {
        WaitStatus::Ready => {}
        WaitStatus::Timeout => return Err(report(CoreError::timeout(service, time_out))),
        WaitStatus::Aborted => return Err(report(CoreError::cancelled(service, time_out))),
    }

    pending
        .into_response()
        .ok_or_else(|| report(CoreError::remote_call_failed(service, time_out)))
}

fn report(err: CoreError) -> CoreError {
    log_core_error(&err);
    err
}
