use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::transport::PendingCall;

/// Default polling slice for [`wait_for_result`].
pub const DEFAULT_POLL_SLICE: Duration = Duration::from_millis(100);

/// How a bounded wait ended.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum WaitStatus {
    /// The call resolved (possibly with an empty payload).
    Ready,
    /// The deadline passed first.
    Timeout,
    /// `cancel` fired while waiting.
    Aborted,
}

/// Wait for `pending` to resolve, at most `time_to_wait`.
///
/// Waits in slices of `slice` (or whatever is left of the deadline, if less),
/// checking `cancel` between slices. A resolved call is reported as `Ready`
/// even if cancellation fired in the same slice.
pub async fn wait_for_result<T>(
    pending: &mut PendingCall<T>,
    time_to_wait: Duration,
    slice: Duration,
    cancel: &CancellationToken,
) -> WaitStatus {
    let end = Instant::now() + time_to_wait;
    // a zero slice would spin
    let slice = slice.max(Duration::from_millis(1));

    loop {
        if pending.is_ready() {
            return WaitStatus::Ready;
        }
        if cancel.is_cancelled() {
            return WaitStatus::Aborted;
        }

        let time_left = end.saturating_duration_since(Instant::now());
        if time_left.is_zero() {
            return WaitStatus::Timeout;
        }

        if pending.wait_for(time_left.min(slice)).await {
            return WaitStatus::Ready;
        }
    }
}
