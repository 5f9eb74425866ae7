//! Report Broadcaster
//!
//! Fan-out of recomputed Wi-Fi reports to live subscribers.
//! No history: a subscriber only sees reports published after it joined.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;

use crate::logic::threat::types::WifiReport;

/// Shared report handed to every subscriber
pub type SharedReport = Arc<WifiReport>;

#[derive(Debug, Clone)]
pub struct Broadcaster {
    tx: broadcast::Sender<SharedReport>,
    published: Arc<AtomicU64>,
}

impl Broadcaster {
    /// `capacity` reports are buffered per subscriber; lagging subscribers
    /// lose the oldest.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            published: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Fire-and-forget. Returns how many subscribers the report reached.
    pub fn publish(&self, report: WifiReport) -> usize {
        self.published.fetch_add(1, Ordering::Relaxed);
        match self.tx.send(Arc::new(report)) {
            Ok(receivers) => {
                log::debug!("Report published to {} subscribers", receivers);
                receivers
            }
            // No subscribers right now
            Err(_) => 0,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SharedReport> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn published_count(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_BROADCAST_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::threat::wifi::no_networks_report;
    use tokio::sync::broadcast::error::{RecvError, TryRecvError};

    fn report(ssid: &str) -> WifiReport {
        WifiReport {
            ssid: ssid.to_string(),
            ..no_networks_report()
        }
    }

    #[tokio::test]
    async fn test_every_subscriber_receives() {
        let broadcaster = Broadcaster::new(8);
        let mut a = broadcaster.subscribe();
        let mut b = broadcaster.subscribe();

        assert_eq!(broadcaster.publish(report("HomeNet")), 2);

        assert_eq!(a.recv().await.unwrap().ssid, "HomeNet");
        assert_eq!(b.recv().await.unwrap().ssid, "HomeNet");
    }

    #[tokio::test]
    async fn test_late_subscriber_gets_no_history() {
        let broadcaster = Broadcaster::new(8);
        broadcaster.publish(report("before"));

        let mut late = broadcaster.subscribe();
        assert!(matches!(late.try_recv(), Err(TryRecvError::Empty)));

        broadcaster.publish(report("after"));
        assert_eq!(late.recv().await.unwrap().ssid, "after");
    }

    #[test]
    fn test_publish_without_subscribers_does_not_fail() {
        let broadcaster = Broadcaster::default();
        assert_eq!(broadcaster.publish(report("nobody")), 0);
        assert_eq!(broadcaster.published_count(), 1);
    }

    #[tokio::test]
    async fn test_lagging_subscriber_skips_oldest() {
        let broadcaster = Broadcaster::new(2);
        let mut slow = broadcaster.subscribe();

        for ssid in ["one", "two", "three"] {
            broadcaster.publish(report(ssid));
        }

        assert!(matches!(slow.recv().await, Err(RecvError::Lagged(1))));
        assert_eq!(slow.recv().await.unwrap().ssid, "two");
    }

    #[test]
    fn test_subscriber_count_tracks_drops() {
        let broadcaster = Broadcaster::new(4);
        let rx = broadcaster.subscribe();
        assert_eq!(broadcaster.subscriber_count(), 1);
        drop(rx);
        assert_eq!(broadcaster.subscriber_count(), 0);
    }
}
