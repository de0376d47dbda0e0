//! Fixed-delay retry for read requests.

use std::time::Duration;

use reqwest::StatusCode;

use super::ApiError;

/// Retry policy for the read paths (cart, address, rating, product fetches).
///
/// Only HTTP 429 responses are retried, with a fixed delay between attempts
/// and no backoff. Any other failure propagates immediately. Mutation
/// requests are never wrapped in this policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub attempts: u32,
    /// Fixed wait between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_millis(1500),
        }
    }
}

/// Send a request up to `policy.attempts` times, sleeping `policy.delay`
/// between attempts that were rate limited.
///
/// `send` builds and sends a fresh request per attempt. The final response
/// is returned as-is - a 429 that survives the last attempt is mapped to an
/// error by the caller's status check.
pub(crate) async fn send_with_retry<F, Fut>(
    policy: RetryPolicy,
    mut send: F,
) -> Result<reqwest::Response, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    let mut attempt = 1;
    loop {
        let response = send().await?;
        if response.status() == StatusCode::TOO_MANY_REQUESTS && attempt < policy.attempts {
            tracing::debug!(attempt, "Rate limited; retrying after fixed delay");
            tokio::time::sleep(policy.delay).await;
            attempt += 1;
            continue;
        }
        return Ok(response);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.attempts, 3);
        assert_eq!(policy.delay, Duration::from_millis(1500));
    }
}
