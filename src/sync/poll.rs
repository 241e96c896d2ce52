// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-ConvoFolders-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Convo Folders and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Timer-driven probes. Both loops stop as soon as their future is dropped, which is how a
//! torn-down host context abandons them.

use std::time::Duration;

/// Probes immediately, then every `interval` until `probe` yields a value. No upper bound.
pub async fn wait_until<T, F>(interval: Duration, mut probe: F) -> T
where
    F: FnMut() -> Option<T>,
{
    let mut attempts = 0u64;
    loop {
        attempts += 1;
        if let Some(found) = probe() {
            tracing::debug!(attempts, "startup poll satisfied");
            return found;
        }
        tokio::time::sleep(interval).await;
    }
}

/// Fixed interval, fixed number of attempts. Supplements notification delivery for events
/// that may be missed; never replaces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl RetryPolicy {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// Upper bound on how long [`RetryPolicy::run`] can take.
    pub fn budget(&self) -> Duration {
        self.interval * self.max_attempts
    }

    /// Waits one interval before each probe; `None` once every attempt came back empty.
    pub async fn run<T, F>(&self, mut probe: F) -> Option<T>
    where
        F: FnMut() -> Option<T>,
    {
        for attempt in 1..=self.max_attempts {
            tokio::time::sleep(self.interval).await;
            if let Some(found) = probe() {
                tracing::debug!(attempt, "retry probe satisfied");
                return Some(found);
            }
        }
        tracing::warn!(
            attempts = self.max_attempts,
            "retry probe gave up without a match"
        );
        None
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::time::Duration;

    use tokio::time::Instant;

    use super::{wait_until, RetryPolicy};

    #[tokio::test(start_paused = true)]
    async fn wait_until_checks_immediately_then_on_interval() {
        let calls = Cell::new(0u32);
        let start = Instant::now();
        let value = wait_until(Duration::from_millis(500), || {
            calls.set(calls.get() + 1);
            (calls.get() == 4).then_some("sidebar")
        })
        .await;

        assert_eq!(value, "sidebar");
        assert_eq!(calls.get(), 4);
        assert_eq!(start.elapsed(), Duration::from_millis(1_500));
    }

    #[tokio::test(start_paused = true)]
    async fn retry_policy_gives_up_after_max_attempts() {
        let policy = RetryPolicy::new(Duration::from_millis(50), 20);
        let calls = Cell::new(0u32);
        let start = Instant::now();
        let found: Option<()> = policy
            .run(|| {
                calls.set(calls.get() + 1);
                None
            })
            .await;

        assert!(found.is_none());
        assert_eq!(calls.get(), 20);
        assert_eq!(start.elapsed(), policy.budget());
    }

    #[tokio::test(start_paused = true)]
    async fn retry_policy_returns_first_hit() {
        let policy = RetryPolicy::new(Duration::from_millis(50), 20);
        let calls = Cell::new(0u32);
        let found = policy
            .run(|| {
                calls.set(calls.get() + 1);
                (calls.get() == 3).then_some(7)
            })
            .await;
        assert_eq!(found, Some(7));
    }
}
