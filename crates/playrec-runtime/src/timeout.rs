//! Deadlines around surface requests and generation calls.

use std::future::Future;
use std::time::Duration;

use playrec_protocols::ProviderError;

/// Await `future` for at most `deadline`, mapping expiry through `on_timeout`.
pub async fn with_deadline<T, E, F>(
    deadline: Duration,
    future: F,
    on_timeout: impl FnOnce() -> E,
) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(deadline, future).await {
        Ok(result) => result,
        Err(_) => Err(on_timeout()),
    }
}

/// Deadline for one generation call.
pub async fn generation_deadline<T, F>(deadline: Duration, future: F) -> Result<T, ProviderError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    with_deadline(deadline, future, || ProviderError::Timeout(deadline.as_secs())).await
}
