// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Background removal of expired tokens.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::tokens::TokenStore;
use crate::time_utils::{format_millis, now_millis};

const MIN_PERIOD: Duration = Duration::from_secs(1);

/// Purge expired tokens every `period` until the runtime shuts down.
///
/// The first purge happens one full period after startup.
pub fn spawn_token_purge(tokens: TokenStore, period: Duration) -> JoinHandle<()> {
    let period = period.max(MIN_PERIOD);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval.tick().await;

        loop {
            interval.tick().await;
            run_once(&tokens, now_millis()).await;
        }
    })
}

async fn run_once(tokens: &TokenStore, now: i64) -> usize {
    match tokens.purge_expired(now).await {
        Ok(purged) => {
            if purged > 0 {
                tracing::info!(purged, at = %format_millis(now), "Purged expired tokens");
            }
            purged
        }
        Err(e) => {
            tracing::warn!(error = %e, "Token purge failed");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db::Db;

    #[tokio::test]
    async fn test_run_once_purges() {
        let mut config = Config::test_default();
        config.token_expire_time = Duration::from_secs(1);
        let tokens = TokenStore::new(Db::open_in_memory().unwrap(), &config);
        tokens.issue(1).await.unwrap();

        assert_eq!(run_once(&tokens, now_millis() - 60_000).await, 0);
        assert_eq!(run_once(&tokens, now_millis() + 60_000).await, 1);
    }
}
