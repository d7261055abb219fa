//! Background cleanup of expired blacklist entries.
//!
//! A blacklisted token only needs to be remembered until its own `exp`; after
//! that, signature verification rejects it anyway.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info};

use super::{now_unix, CredentialStore};

#[derive(Clone, Copy, Debug)]
pub struct PurgeConfig {
    interval: Duration,
}

impl PurgeConfig {
    /// Default: purge once per hour.
    #[must_use]
    pub fn new() -> Self {
        Self {
            interval: Duration::from_secs(60 * 60),
        }
    }

    /// `0` disables the worker.
    #[must_use]
    pub fn with_interval_seconds(mut self, seconds: u64) -> Self {
        self.interval = Duration::from_secs(seconds);
        self
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        !self.interval.is_zero()
    }
}

impl Default for PurgeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn the purge loop, or return `None` when disabled.
pub fn spawn_blacklist_purge(
    store: Arc<dyn CredentialStore>,
    config: PurgeConfig,
) -> Option<tokio::task::JoinHandle<()>> {
    if !config.enabled() {
        debug!("blacklist purge disabled");
        return None;
    }

    Some(tokio::spawn(async move {
        loop {
            sleep(config.interval()).await;

            match store.purge_expired_tokens(now_unix()).await {
                Ok(0) => debug!("no expired blacklist entries"),
                Ok(removed) => info!(removed, "purged expired blacklist entries"),
                Err(err) => error!("blacklist purge failed: {err:#}"),
            }
        }
    }))
}
