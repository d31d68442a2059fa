//! Backend liveness poller
//!
//! Runs on its own task, independent of the conversation controller. The only
//! thing it shares with presentation is an online/offline flag.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::gateway::ChatGateway;

/// Shortest polling period; `tokio::time::interval` rejects zero
const MIN_INTERVAL: Duration = Duration::from_secs(1);

pub struct HealthMonitor {
    gateway: Arc<dyn ChatGateway>,
    interval: Duration,
    online: watch::Sender<bool>,
}

impl HealthMonitor {
    /// Create a monitor and the receiver for its online flag. The flag starts
    /// out `true` until the first check says otherwise. Intervals under a
    /// second are raised to one second.
    pub fn new(gateway: Arc<dyn ChatGateway>, interval: Duration) -> (Self, watch::Receiver<bool>) {
        let (online, rx) = watch::channel(true);
        if interval < MIN_INTERVAL {
            warn!("Health interval {:?} too short; using {:?}", interval, MIN_INTERVAL);
        }
        let interval = interval.max(MIN_INTERVAL);
        (
            Self {
                gateway,
                interval,
                online,
            },
            rx,
        )
    }

    /// Run one health check and publish the result.
    pub async fn check_once(&self) -> bool {
        let online = match self.gateway.health().await {
            Ok(status) => {
                debug!(
                    "Health check: status={}, rag_initialized={:?}",
                    status.status, status.rag_initialized
                );
                true
            }
            Err(e) => {
                debug!("Health check failed: {}", e);
                false
            }
        };

        let changed = self.online.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
        if changed {
            if online {
                info!("Assistant backend is reachable again");
            } else {
                warn!("Assistant backend is unreachable");
            }
        }

        online
    }

    /// Check immediately, then on every interval tick, until every receiver
    /// has been dropped.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if self.online.is_closed() {
                    debug!("Health monitor stopping: no listeners left");
                    break;
                }
                self.check_once().await;
            }
        })
    }
}
