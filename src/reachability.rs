//! Network reachability tracking.
//!
//! A single process-wide boolean: `true` while outbound provider calls are
//! expected to work. Connectivity signals flip it through
//! [`ReachabilityMonitor::set_online`]; an optional background probe does the
//! same from the result of a periodic HEAD request. Only the latest signal is
//! kept.

use crate::retry::{with_retry, RetryConfig};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Shared online/offline state. Clones observe and update the same value.
#[derive(Debug, Clone)]
pub struct ReachabilityMonitor {
    state: Arc<watch::Sender<bool>>,
}

impl ReachabilityMonitor {
    pub fn new(online: bool) -> Self {
        let (sender, _) = watch::channel(online);
        Self {
            state: Arc::new(sender),
        }
    }

    pub fn is_online(&self) -> bool {
        *self.state.borrow()
    }

    /// Record a connectivity transition. Repeating the current state is a no-op.
    pub fn set_online(&self, online: bool) {
        let changed = self.state.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });

        if changed {
            if online {
                info!("Network reachable, translation providers enabled");
            } else {
                info!("Network unreachable, showing source text until reconnect");
            }
        }
    }

    /// Receiver notified on every online/offline transition.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }

    /// Probe `url` once (with a short retry) and record the result.
    ///
    /// Any HTTP response counts as reachable; only transport failures mark
    /// the network offline.
    pub async fn probe(&self, client: &reqwest::Client, url: &str) -> bool {
        let result = with_retry(
            &RetryConfig::connectivity_probe(),
            "Connectivity probe",
            || async { head(client, url).await },
        )
        .await;

        let online = result.is_ok();
        debug!("Connectivity probe of {}: online={}", url, online);
        self.set_online(online);
        online
    }

    /// Run [`probe`](Self::probe) every `interval` until the task is aborted.
    pub fn spawn_probe(
        &self,
        client: reqwest::Client,
        url: String,
        interval: Duration,
    ) -> JoinHandle<()> {
        let monitor = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                monitor.probe(&client, &url).await;
            }
        })
    }
}

impl Default for ReachabilityMonitor {
    fn default() -> Self {
        Self::new(true)
    }
}

async fn head(client: &reqwest::Client, url: &str) -> Result<()> {
    client
        .head(url)
        .send()
        .await
        .with_context(|| format!("Connectivity probe to {} failed", url))?;
    Ok(())
}
