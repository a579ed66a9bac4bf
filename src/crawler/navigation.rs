//! Bounded-retry page navigation

use crate::browser::Page;
use std::time::Duration;

/// How many times to try an operation and how long to wait between tries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_millis(1000))
    }
}

/// Loads `url` into `page`, retrying with a fixed delay
///
/// Returns `true` on the first successful load and `false` once every attempt
/// has failed. Failures are logged, never raised: callers must check the
/// result before using the page.
pub async fn attempt_navigate(page: &mut dyn Page, url: &str, policy: RetryPolicy) -> bool {
    for attempt in 1..=policy.attempts {
        match page.goto(url).await {
            Ok(()) => return true,
            Err(e) => {
                tracing::debug!(
                    "{} going to {} (attempt {}/{}), retrying",
                    e,
                    url,
                    attempt,
                    policy.attempts
                );
                tokio::time::sleep(policy.delay).await;
            }
        }
    }

    false
}
