//! Bounded upstream calls.
//!
//! Every network operation in Subjekt runs under an explicit deadline. Expiry
//! drops (cancels) the inner future and surfaces as [`SubjektError::Timeout`],
//! which callers treat the same as a transport failure.

use std::future::Future;
use std::time::Duration;

use crate::error::{Result, SubjektError};

/// Run `fut` with a deadline of `limit`.
pub async fn with_timeout<T, F>(limit: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(SubjektError::Timeout(limit)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn passes_through_fast_results() {
        let out = with_timeout(Duration::from_secs(1), async { Ok::<_, SubjektError>(7) })
            .await
            .unwrap();
        assert_eq!(out, 7);
    }

    #[tokio::test]
    async fn passes_through_inner_errors() {
        let err = with_timeout(Duration::from_secs(1), async {
            Err::<(), _>(SubjektError::Network("refused".into()))
        })
        .await
        .unwrap_err();
        assert!(matches!(err, SubjektError::Network(_)));
    }

    #[tokio::test]
    async fn expires_slow_futures_near_the_bound() {
        let start = Instant::now();
        let err = with_timeout(Duration::from_millis(50), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, SubjektError>(())
        })
        .await
        .unwrap_err();

        assert!(matches!(err, SubjektError::Timeout(_)));
        assert!(start.elapsed() < Duration::from_millis(500));
    }
}
