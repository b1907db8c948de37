use async_trait::async_trait;
use log::debug;
use std::future::Future;

use super::ledger_commit::{CommitReceipt, LedgerCommit};
use crate::constants::MAX_CAS_ATTEMPTS;
use crate::errors::{Error, Result};

/// Storage contract for applying a [`LedgerCommit`] as a single atomic write.
///
/// Implementations must:
/// - reject an `EntityWrite::Update` whose stored version differs from
///   `expected_version` with [`Error::ConcurrentModification`];
/// - apply each balance change as an increment computed inside the storage
///   transaction, enforcing its guard, and record a balance ledger entry;
/// - apply nothing at all if any step fails.
#[async_trait]
pub trait LedgerStoreTrait: Send + Sync {
    async fn commit(&self, commit: LedgerCommit) -> Result<CommitReceipt>;
}

/// Re-runs `op` when it loses an optimistic concurrency race.
///
/// `op` must re-read the entity it transitions on every attempt so that a
/// retry re-validates the state machine against fresh data.
pub(crate) async fn retry_on_conflict<T, F, Fut>(label: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Err(Error::ConcurrentModification(reason)) if attempt < MAX_CAS_ATTEMPTS => {
                debug!(
                    "{}: lost a concurrent write (attempt {}): {}",
                    label, attempt, reason
                );
                attempt += 1;
            }
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_retry_on_conflict_retries_then_succeeds() {
        let calls = AtomicUsize::new(0);
        let result = retry_on_conflict("test", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(Error::ConcurrentModification("stale".to_string()))
                } else {
                    Ok(n)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_on_conflict_gives_up() {
        let calls = AtomicUsize::new(0);
        let result: Result<()> = retry_on_conflict("test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(Error::ConcurrentModification("stale".to_string())) }
        })
        .await;
        assert!(matches!(result, Err(Error::ConcurrentModification(_))));
        assert_eq!(calls.load(Ordering::SeqCst), MAX_CAS_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_retry_on_conflict_does_not_retry_other_errors() {
        let calls = AtomicUsize::new(0);
        let result: Result<()> = retry_on_conflict("test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(Error::InvalidState("closed".to_string())) }
        })
        .await;
        assert!(matches!(result, Err(Error::InvalidState(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
