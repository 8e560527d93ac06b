//! Reminder scheduler.
//!
//! Periodically scans the reminder store and delivers everything that has
//! come due. Delivered reminders are deleted; failed ones stay in the store
//! and are retried on the next scan.

use agent_state::{Clock, Reminder, ReminderId, ReminderStore};
use chat_transport::{SendOptions, Transport};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Text delivered for a due reminder.
pub fn reminder_text(text: &str) -> String {
    format!("⏰ **Reminder!**\n\n{}", text)
}

/// Result of one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Clears the in-flight flag when a scan ends, including by cancellation.
struct ScanGuard<'a>(&'a AtomicBool);

impl Drop for ScanGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct ReminderScheduler {
    store: ReminderStore,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    interval: Duration,
    scanning: AtomicBool,
}

impl ReminderScheduler {
    pub fn new(
        store: ReminderStore,
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
        interval: Duration,
    ) -> Self {
        Self {
            store,
            transport,
            clock,
            interval,
            scanning: AtomicBool::new(false),
        }
    }

    /// Deliver every reminder due at `now`.
    ///
    /// Returns `None` without scanning if another scan is still running.
    pub async fn tick(&self, now: DateTime<Utc>) -> Option<ScanReport> {
        if self
            .scanning
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Reminder scan already in flight, skipping");
            return None;
        }
        let _guard = ScanGuard(&self.scanning);

        let mut report = ScanReport::default();
        for (id, reminder) in self.store.due_before(now).await {
            if self.deliver(&id, &reminder).await {
                report.delivered += 1;
            } else {
                report.failed += 1;
            }
        }

        if report.delivered > 0 || report.failed > 0 {
            info!(
                "Reminder scan: {} delivered, {} failed",
                report.delivered, report.failed
            );
        }
        Some(report)
    }

    async fn deliver(&self, id: &ReminderId, reminder: &Reminder) -> bool {
        let text = reminder_text(&reminder.text);
        match self
            .transport
            .send(reminder.user_id, &text, &SendOptions::default())
            .await
        {
            Ok(()) => {
                self.store.delete(id).await;
                info!("Delivered reminder {} to user {}", id, reminder.user_id);
                true
            }
            Err(e) => {
                warn!(
                    "Failed to deliver reminder {} to user {}, will retry: {}",
                    id, reminder.user_id, e
                );
                false
            }
        }
    }

    /// Run the scheduler forever, one scan per interval.
    ///
    /// Scans run inline, so a slow scan delays the next one instead of
    /// overlapping it. When the earliest pending reminder falls due before
    /// the next interval tick, the scan runs at its due time instead.
    pub async fn run(&self) {
        info!("Starting reminder scheduler, interval: {:?}", self.interval);

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker.tick().await;

        loop {
            self.tick(self.clock.now()).await;

            match early_wake(self.store.next_due().await, self.clock.now(), self.interval) {
                Some(wait) => {
                    tokio::select! {
                        _ = ticker.tick() => {}
                        _ = tokio::time::sleep(wait) => {}
                    }
                }
                None => {
                    ticker.tick().await;
                }
            }
        }
    }
}

/// Delay until `next_due` when it lands inside the coming interval.
///
/// Overdue reminders are left to the regular tick so a failing delivery is
/// not retried in a tight loop.
fn early_wake(
    next_due: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    interval: Duration,
) -> Option<Duration> {
    let wait = (next_due? - now).to_std().ok()?;
    (!wait.is_zero() && wait < interval).then_some(wait)
}

/// Spawn the scheduler as a background task.
pub fn spawn_scheduler(scheduler: Arc<ReminderScheduler>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        scheduler.run().await;
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_state::ManualClock;
    use agent_state::SystemClock;
    use async_trait::async_trait;
    use chat_transport::{MockTransport, ParseMode, PeerId, TransportError};
    use chrono::TimeZone;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    /// Blocks every send until released.
    #[derive(Default)]
    struct GatedTransport {
        entered: Notify,
        release: Notify,
        sends: AtomicUsize,
    }

    #[async_trait]
    impl Transport for GatedTransport {
        async fn send(
            &self,
            _peer: PeerId,
            _text: &str,
            _options: &SendOptions,
        ) -> Result<(), TransportError> {
            self.entered.notify_one();
            self.release.notified().await;
            self.sends.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn scheduler(store: ReminderStore, transport: MockTransport) -> ReminderScheduler {
        ReminderScheduler::new(
            store,
            Arc::new(transport),
            Arc::new(ManualClock::new(start())),
            Duration::from_secs(30),
        )
    }

    #[tokio::test]
    async fn test_due_reminder_delivered_once_and_removed() {
        let store = ReminderStore::new();
        let due = start() + chrono::Duration::seconds(60);
        store.insert(42, 7, due, "buy milk", start()).await.unwrap();

        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|peer, text, options| {
                *peer == 42
                    && text == "⏰ **Reminder!**\n\nbuy milk"
                    && options.parse_mode == ParseMode::Markdown
            })
            .times(1)
            .returning(|_, _, _| Ok(()));
        let scheduler = scheduler(store.clone(), transport);

        let report = scheduler.tick(due + chrono::Duration::seconds(1)).await.unwrap();
        assert_eq!(report, ScanReport { delivered: 1, failed: 0 });
        assert!(store.is_empty().await);

        let report = scheduler.tick(due + chrono::Duration::seconds(2)).await.unwrap();
        assert_eq!(report, ScanReport::default());
    }

    #[tokio::test]
    async fn test_not_yet_due_is_left_alone() {
        let store = ReminderStore::new();
        store
            .insert(42, 7, start() + chrono::Duration::seconds(5), "later", start())
            .await
            .unwrap();

        let mut transport = MockTransport::new();
        transport.expect_send().times(0);
        let scheduler = scheduler(store.clone(), transport);

        let report = scheduler.tick(start()).await.unwrap();
        assert_eq!(report, ScanReport::default());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_failed_delivery_is_retried() {
        let store = ReminderStore::new();
        let due = start() + chrono::Duration::seconds(1);
        store.insert(42, 7, due, "retry me", start()).await.unwrap();

        let mut transport = MockTransport::new();
        let mut seq = mockall::Sequence::new();
        transport
            .expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Err(TransportError::SendFailed("offline".into())));
        transport
            .expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));
        let scheduler = scheduler(store.clone(), transport);

        let report = scheduler.tick(due).await.unwrap();
        assert_eq!(report, ScanReport { delivered: 0, failed: 1 });
        assert_eq!(store.len().await, 1);

        let report = scheduler.tick(due).await.unwrap();
        assert_eq!(report, ScanReport { delivered: 1, failed: 0 });
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_one_failure_does_not_block_others() {
        let store = ReminderStore::new();
        let due = start() + chrono::Duration::seconds(1);
        store.insert(1, 1, due, "a", start()).await.unwrap();
        store.insert(2, 2, due, "b", start()).await.unwrap();

        let mut transport = MockTransport::new();
        transport.expect_send().times(2).returning(|peer, _, _| {
            if peer == 1 {
                Err(TransportError::SendFailed("blocked".into()))
            } else {
                Ok(())
            }
        });
        let scheduler = scheduler(store.clone(), transport);

        let report = scheduler.tick(due).await.unwrap();
        assert_eq!(report, ScanReport { delivered: 1, failed: 1 });
        assert_eq!(store.list_for_user(1).await.len(), 1);
        assert!(store.list_for_user(2).await.is_empty());
    }

    #[tokio::test]
    async fn test_overlapping_tick_is_skipped() {
        let store = ReminderStore::new();
        let due = start() + chrono::Duration::seconds(1);
        store.insert(42, 7, due, "once", start()).await.unwrap();

        let transport = Arc::new(GatedTransport::default());
        let scheduler = Arc::new(ReminderScheduler::new(
            store.clone(),
            transport.clone(),
            Arc::new(ManualClock::new(start())),
            Duration::from_secs(30),
        ));

        let first = tokio::spawn({
            let scheduler = scheduler.clone();
            async move { scheduler.tick(due).await }
        });
        transport.entered.notified().await;

        assert_eq!(scheduler.tick(due).await, None);

        transport.release.notify_one();
        let report = first.await.unwrap();
        assert_eq!(report, Some(ScanReport { delivered: 1, failed: 0 }));
        assert_eq!(transport.sends.load(Ordering::SeqCst), 1);
        assert!(store.is_empty().await);

        assert_eq!(scheduler.tick(due).await, Some(ScanReport::default()));
    }

    #[test]
    fn test_early_wake() {
        let interval = Duration::from_secs(30);
        let now = start();

        assert_eq!(early_wake(None, now, interval), None);
        assert_eq!(
            early_wake(Some(now + chrono::Duration::seconds(5)), now, interval),
            Some(Duration::from_secs(5))
        );
        assert_eq!(early_wake(Some(now + chrono::Duration::seconds(60)), now, interval), None);
        assert_eq!(early_wake(Some(now), now, interval), None);
        assert_eq!(early_wake(Some(now - chrono::Duration::seconds(5)), now, interval), None);
    }

    #[tokio::test]
    async fn test_run_wakes_for_reminder_due_before_next_tick() {
        let store = ReminderStore::new();
        let now = Utc::now();
        store
            .insert(42, 7, now + chrono::Duration::milliseconds(100), "soon", now)
            .await
            .unwrap();

        let mut transport = MockTransport::new();
        transport.expect_send().times(1).returning(|_, _, _| Ok(()));
        let scheduler = Arc::new(ReminderScheduler::new(
            store.clone(),
            Arc::new(transport),
            Arc::new(SystemClock),
            Duration::from_secs(3600),
        ));
        let handle = spawn_scheduler(scheduler);

        let delivered = tokio::time::timeout(Duration::from_secs(5), async {
            while !store.is_empty().await {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
        handle.abort();

        tokio_test::assert_ok!(delivered);
    }
}
