//! Caller-supplied deadlines for datastore calls.
//!
//! Dropping any future returned by the token store cancels the in-flight
//! datastore call. A [`Deadline`] does the same on a timer and reports the
//! cancellation as [`StoreError::Timeout`] instead of blocking indefinitely.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::StoreResult;
use crate::error::StoreError;

/// Time limit applied to datastore calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Deadline {
    /// No limit.
    #[default]
    None,

    /// Limit each datastore call to this duration.
    Timeout(Duration),

    /// Abort any datastore call still running at this instant.
    At(Instant),
}

impl Deadline {
    /// Builds a per-call deadline from an optional timeout.
    #[must_use]
    pub fn from_timeout(timeout: Option<Duration>) -> Self {
        timeout.map_or(Self::None, Self::Timeout)
    }

    /// Builds an absolute deadline `after` from now.
    #[must_use]
    pub fn after(after: Duration) -> Self {
        Self::At(Instant::now() + after)
    }

    /// Returns `true` if this is an absolute deadline that has already passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        match self {
            Self::At(at) => Instant::now() >= *at,
            Self::None | Self::Timeout(_) => false,
        }
    }

    /// Runs `fut` under this deadline.
    ///
    /// On expiry the future is dropped and `Timeout { operation }` is returned.
    ///
    /// # Errors
    ///
    /// Returns the future's own error, or `Timeout` if the deadline expires first.
    pub async fn run<F, T>(self, operation: &'static str, fut: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        match self {
            Self::None => fut.await,
            Self::Timeout(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| StoreError::timeout(operation))?,
            Self::At(at) => tokio::time::timeout_at(at, fut)
                .await
                .map_err(|_| StoreError::timeout(operation))?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn slow() -> StoreResult<u8> {
        tokio::time::sleep(Duration::from_millis(500)).await;
        Ok(1)
    }

    #[test]
    fn test_from_timeout() {
        assert_eq!(Deadline::from_timeout(None), Deadline::None);
        assert_eq!(
            Deadline::from_timeout(Some(Duration::from_secs(2))),
            Deadline::Timeout(Duration::from_secs(2))
        );
    }

    #[tokio::test]
    async fn test_no_deadline_passes_through() {
        let value = Deadline::None.run("noop", async { Ok(7) }).await.unwrap();
        assert_eq!(value, 7);

        let err = Deadline::None
            .run::<_, ()>("noop", async { Err(StoreError::storage("boom")) })
            .await
            .unwrap_err();
        assert!(err.is_storage());
    }

    #[tokio::test]
    async fn test_timeout_expires() {
        let err = Deadline::Timeout(Duration::from_millis(10))
            .run("get_access", slow())
            .await
            .unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "Operation timed out: get_access");
    }

    #[tokio::test]
    async fn test_absolute_deadline_expires() {
        let deadline = Deadline::after(Duration::from_millis(10));
        let err = deadline.run("get_client", slow()).await.unwrap_err();
        assert!(err.is_timeout());
        assert!(deadline.is_expired());
    }

    #[tokio::test]
    async fn test_deadline_not_reached() {
        let value = Deadline::after(Duration::from_secs(5))
            .run("get_client", async { Ok("ok") })
            .await
            .unwrap();
        assert_eq!(value, "ok");
    }
}
