//! Per-call deadlines for storage operations

use std::future::Future;
use std::time::Duration;

use core_kernel::PortError;

/// Runs a storage call, failing with [`PortError::Timeout`] once `limit` elapses
///
/// The timeout is transient, so the background drivers retry the item on
/// their next tick.
pub async fn with_deadline<T, F>(operation: &'static str, limit: Duration, call: F) -> Result<T, PortError>
where
    F: Future<Output = Result<T, PortError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(operation, timeout_ms = limit.as_millis() as u64, "storage call timed out");
            Err(PortError::timeout(operation, limit.as_millis() as u64))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_slow_call_times_out() {
        let result: Result<(), PortError> = with_deadline("offers.get", Duration::from_millis(500), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        let err = result.unwrap_err();
        assert!(err.is_transient());
        assert_eq!(err.to_string(), "Timeout after 500ms: offers.get");
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_call_passes_through() {
        let result = with_deadline("policies.next_sequence", Duration::from_millis(500), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            Ok::<_, PortError>(7u64)
        })
        .await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_inner_error_is_kept() {
        let result: Result<(), PortError> = with_deadline("quotes.get", Duration::from_secs(1), async {
            Err(PortError::not_found("Quote", "QTE-1"))
        })
        .await;
        assert!(result.unwrap_err().is_not_found());
    }
}
