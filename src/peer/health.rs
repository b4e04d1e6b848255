//! Peer-health lifecycle monitoring.
//!
//! After a snapshot restore populates the registry, the health monitor is
//! (re)started against it. It periodically scans all peers and downgrades
//! those whose last update is older than the configured staleness threshold,
//! so the query layer stops treating their restored data as live.

use crate::config::Config;
use crate::peer::{PeerRegistry, PeerState};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Background monitor over the peer registry.
pub struct HealthMonitor {
    registry: Arc<PeerRegistry>,
    interval: Duration,
    stale_after: Duration,
    shutdown: Arc<AtomicBool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl HealthMonitor {
    /// Create a monitor over the given registry.
    pub fn new(config: &Config, registry: Arc<PeerRegistry>) -> Self {
        Self {
            registry,
            interval: config.health_check_interval,
            stale_after: config.stale_after,
            shutdown: Arc::new(AtomicBool::new(false)),
            handle: Mutex::new(None),
        }
    }

    /// (Re)start the periodic scan task.
    ///
    /// Requires a Tokio runtime; without one the monitor stays passive and
    /// [`check_peers`](Self::check_peers) can be driven manually.
    pub fn restart(&self) {
        self.shutdown.store(false, Ordering::Relaxed);

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!("no async runtime, health monitor not started");
            return;
        };

        let registry = Arc::clone(&self.registry);
        let shutdown = Arc::clone(&self.shutdown);
        let interval = self.interval;
        let stale_after = self.stale_after;

        let task = runtime.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // First tick completes immediately; skip it.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if shutdown.load(Ordering::Relaxed) {
                    break;
                }
                Self::check_registry(&registry, stale_after);
            }
        });

        if let Some(previous) = self.handle.lock().replace(task) {
            previous.abort();
        }
    }

    /// Stop the scan task.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(task) = self.handle.lock().take() {
            task.abort();
        }
    }

    /// Run one scan over this monitor's registry. Returns the number of
    /// peers downgraded.
    pub fn check_peers(&self) -> usize {
        Self::check_registry(&self.registry, self.stale_after)
    }

    fn check_registry(registry: &PeerRegistry, stale_after: Duration) -> usize {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;
        let threshold = now - stale_after.as_secs() as i64;

        let mut downgraded = 0;
        for peer in registry.peers_in_order() {
            let status = peer.status();
            if status.state.is_online() && status.last_update < threshold {
                warn!(
                    peer = %peer.name(),
                    id = %peer.id(),
                    last_update = status.last_update,
                    "peer went stale, marking down"
                );
                peer.update_status(|s| s.state = PeerState::Down);
                downgraded += 1;
            }
        }
        downgraded
    }
}

impl std::fmt::Debug for HealthMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthMonitor")
            .field("interval", &self.interval)
            .field("stale_after", &self.stale_after)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peer::{Connection, Peer};

    fn online_peer(id: &str, last_update: i64) -> Arc<Peer> {
        let peer = Peer::new(Connection {
            name: id.to_string(),
            id: id.to_string(),
            ..Default::default()
        });
        peer.update_status(|s| {
            s.state = PeerState::Up;
            s.last_update = last_update;
        });
        Arc::new(peer)
    }

    fn now_secs() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64
    }

    #[test]
    fn test_stale_peer_marked_down() {
        let registry = Arc::new(PeerRegistry::new());
        registry.replace(vec![
            online_peer("fresh", now_secs()),
            online_peer("stale", now_secs() - 3600),
        ]);

        let config = Config::default().with_stale_after(Duration::from_secs(300));
        let monitor = HealthMonitor::new(&config, Arc::clone(&registry));

        assert_eq!(monitor.check_peers(), 1);
        assert!(registry.get("fresh").unwrap().is_online());
        assert!(!registry.get("stale").unwrap().is_online());

        // A second scan finds nothing left to downgrade.
        assert_eq!(monitor.check_peers(), 0);
    }

    #[test]
    fn test_offline_peer_untouched() {
        let registry = Arc::new(PeerRegistry::new());
        let peer = online_peer("p", now_secs() - 3600);
        peer.update_status(|s| s.state = PeerState::Pending);
        registry.replace(vec![peer]);

        let config = Config::default().with_stale_after(Duration::from_secs(300));
        let monitor = HealthMonitor::new(&config, Arc::clone(&registry));

        assert_eq!(monitor.check_peers(), 0);
        assert_eq!(registry.get("p").unwrap().status().state, PeerState::Pending);
    }

    #[tokio::test]
    async fn test_restart_and_shutdown() {
        let registry = Arc::new(PeerRegistry::new());
        let config = Config::default();
        let monitor = HealthMonitor::new(&config, registry);

        monitor.restart();
        assert!(monitor.handle.lock().is_some());
        monitor.shutdown();
        assert!(monitor.handle.lock().is_none());
    }
}
