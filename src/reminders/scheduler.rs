use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Datelike, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::error::{SchedulerError, StorageError};
use super::store::KeyValueStore;
use super::trigger::SchedulerTrigger;

/// Opaque id the scheduler hands out for a scheduled trigger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TriggerHandle(pub String);

/// The platform notification scheduler. It only schedules and cancels;
/// there is no update and no way to read triggers back.
#[async_trait]
pub trait NotificationScheduler: Send + Sync {
    async fn cancel_all(&self) -> Result<(), SchedulerError>;
    async fn schedule(&self, trigger: &SchedulerTrigger) -> Result<TriggerHandle, SchedulerError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScheduledEntry {
    handle: TriggerHandle,
    trigger: SchedulerTrigger,
}

#[derive(Serialize, Deserialize, Default)]
struct ScheduledTable {
    #[serde(default)]
    triggers: Vec<ScheduledEntry>,
}

/// A trigger that came due.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub trigger: SchedulerTrigger,
    pub fired_at: NaiveDateTime,
}

/// Device-local weekly scheduler whose table survives restarts.
pub struct LocalScheduler {
    entries: Mutex<Vec<ScheduledEntry>>,
    kv: Arc<dyn KeyValueStore>,
    key: String,
}

impl LocalScheduler {
    pub fn open(kv: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let entries = match kv.get(&key) {
            Ok(Some(bytes)) => std::str::from_utf8(&bytes)
                .ok()
                .and_then(|text| toml::from_str::<ScheduledTable>(text).ok())
                .map(|table| table.triggers)
                .unwrap_or_else(|| {
                    warn!(key = %key, "scheduled trigger table is corrupt, starting empty");
                    Vec::new()
                }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(key = %key, error = %e, "could not read scheduled triggers");
                Vec::new()
            }
        };
        debug!(count = entries.len(), "scheduler opened");

        Self {
            entries: Mutex::new(entries),
            kv,
            key,
        }
    }

    /// Write the table. Callers hold the entries lock so writes land in order.
    async fn persist(&self, entries: &[ScheduledEntry]) -> Result<(), SchedulerError> {
        let table = ScheduledTable {
            triggers: entries.to_vec(),
        };
        let text = toml::to_string(&table).map_err(StorageError::from)?;
        let kv = self.kv.clone();
        let key = self.key.clone();
        tokio::task::spawn_blocking(move || kv.set(&key, text.as_bytes()))
            .await
            .map_err(StorageError::from)??;
        Ok(())
    }

    #[cfg(test)]
    pub async fn pending(&self) -> Vec<SchedulerTrigger> {
        self.entries
            .lock()
            .await
            .iter()
            .map(|e| e.trigger.clone())
            .collect()
    }

    /// Triggers whose weekly occurrence falls in `(from, to]`, device-local.
    pub async fn due_between(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Vec<SchedulerTrigger> {
        if to <= from {
            return Vec::new();
        }
        self.entries
            .lock()
            .await
            .iter()
            .filter(|e| occurs_between(&e.trigger, from, to))
            .map(|e| e.trigger.clone())
            .collect()
    }
}

#[async_trait]
impl NotificationScheduler for LocalScheduler {
    async fn cancel_all(&self) -> Result<(), SchedulerError> {
        let mut entries = self.entries.lock().await;
        let removed = entries.len();
        self.persist(&[]).await?;
        entries.clear();
        debug!(removed, "cancelled all triggers");
        Ok(())
    }

    async fn schedule(&self, trigger: &SchedulerTrigger) -> Result<TriggerHandle, SchedulerError> {
        let mut entries = self.entries.lock().await;
        let handle = TriggerHandle(Uuid::new_v4().to_string());
        entries.push(ScheduledEntry {
            handle: handle.clone(),
            trigger: trigger.clone(),
        });
        if let Err(e) = self.persist(&entries).await {
            entries.pop();
            return Err(e);
        }
        Ok(handle)
    }
}

fn occurs_between(trigger: &SchedulerTrigger, from: NaiveDateTime, to: NaiveDateTime) -> bool {
    // Anything older than a week would have fired on a later date too
    let start = from.date().max(to.date() - chrono::Duration::days(7));
    start
        .iter_days()
        .take_while(|day| *day <= to.date())
        .filter(|day| day.weekday() == trigger.weekday)
        .filter_map(|day| day.and_hms_opt(trigger.hour, trigger.minute, 0))
        .any(|at| from < at && at <= to)
}

/// Poll the scheduler and forward due triggers until the receiver is gone.
pub fn spawn_delivery(
    scheduler: Arc<LocalScheduler>,
    every: Duration,
    deliveries: mpsc::UnboundedSender<Delivery>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        let mut last = Local::now().naive_local();

        loop {
            ticker.tick().await;
            let now = Local::now().naive_local();
            if !deliver_due(&scheduler, last, now, &deliveries).await || deliveries.is_closed() {
                debug!("delivery receiver closed, stopping");
                return;
            }
            last = now;
        }
    })
}

/// Send every trigger due in `(from, to]`. False once the receiver is gone.
async fn deliver_due(
    scheduler: &LocalScheduler,
    from: NaiveDateTime,
    to: NaiveDateTime,
    deliveries: &mpsc::UnboundedSender<Delivery>,
) -> bool {
    for trigger in scheduler.due_between(from, to).await {
        info!(title = %trigger.title, weekday = %trigger.weekday, "reminder due");
        let delivery = Delivery {
            trigger,
            fired_at: to,
        };
        if deliveries.send(delivery).is_err() {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Weekday};

    use super::super::store::memory::MemoryKeyValueStore;
    use super::*;

    fn trigger(title: &str, weekday: Weekday, hour: u32, minute: u32) -> SchedulerTrigger {
        SchedulerTrigger {
            title: title.to_string(),
            body: None,
            hour,
            minute,
            weekday,
        }
    }

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        // 2024-01-01 is a Monday
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn schedule_and_cancel_all() {
        let kv = Arc::new(MemoryKeyValueStore::default());
        let scheduler = LocalScheduler::open(kv, "scheduled");

        let a = scheduler.schedule(&trigger("a", Weekday::Mon, 9, 0)).await.unwrap();
        let b = scheduler.schedule(&trigger("b", Weekday::Tue, 9, 0)).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(scheduler.pending().await.len(), 2);

        scheduler.cancel_all().await.unwrap();
        assert!(scheduler.pending().await.is_empty());
    }

    #[tokio::test]
    async fn table_survives_reopen() {
        let kv = Arc::new(MemoryKeyValueStore::default());
        let scheduler = LocalScheduler::open(kv.clone(), "scheduled");
        let mut t = trigger("Vitamins", Weekday::Wed, 14, 0);
        t.body = Some("with food".to_string());
        scheduler.schedule(&t).await.unwrap();

        let reopened = LocalScheduler::open(kv, "scheduled");
        assert_eq!(reopened.pending().await, vec![t]);
    }

    #[tokio::test]
    async fn failed_persist_leaves_table_unchanged() {
        let kv = Arc::new(MemoryKeyValueStore::default());
        let scheduler = LocalScheduler::open(kv.clone(), "scheduled");
        scheduler.schedule(&trigger("a", Weekday::Mon, 9, 0)).await.unwrap();

        kv.fail_writes(true);
        assert!(scheduler.schedule(&trigger("b", Weekday::Mon, 9, 0)).await.is_err());
        assert!(scheduler.cancel_all().await.is_err());
        assert_eq!(scheduler.pending().await.len(), 1);
    }

    #[tokio::test]
    async fn corrupt_table_opens_empty() {
        let kv = Arc::new(MemoryKeyValueStore::default());
        kv.put_raw("scheduled", b"triggers = 12");
        let scheduler = LocalScheduler::open(kv, "scheduled");
        assert!(scheduler.pending().await.is_empty());
    }

    #[tokio::test]
    async fn due_between_matches_weekday_and_time() {
        let kv = Arc::new(MemoryKeyValueStore::default());
        let scheduler = LocalScheduler::open(kv, "scheduled");
        scheduler.schedule(&trigger("monday", Weekday::Mon, 14, 0)).await.unwrap();
        scheduler.schedule(&trigger("tuesday", Weekday::Tue, 14, 0)).await.unwrap();

        let due = scheduler.due_between(at(1, 13, 59), at(1, 14, 0)).await;
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].title, "monday");

        // Lower bound is exclusive
        assert!(scheduler.due_between(at(1, 14, 0), at(1, 14, 1)).await.is_empty());

        // Window spanning midnight into Tuesday
        let due = scheduler.due_between(at(1, 23, 0), at(2, 14, 30)).await;
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].title, "tuesday");

        assert!(scheduler.due_between(at(2, 15, 0), at(2, 15, 0)).await.is_empty());
    }
    #[tokio::test]
    async fn due_triggers_are_delivered_with_fire_time() {
        let kv = Arc::new(MemoryKeyValueStore::default());
        let scheduler = LocalScheduler::open(kv, "scheduled");
        scheduler.schedule(&trigger("monday", Weekday::Mon, 14, 0)).await.unwrap();
        scheduler.schedule(&trigger("friday", Weekday::Fri, 14, 0)).await.unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        assert!(deliver_due(&scheduler, at(1, 13, 59), at(1, 14, 0), &tx).await);

        let delivery = rx.try_recv().unwrap();
        assert_eq!(delivery.trigger.title, "monday");
        assert_eq!(delivery.fired_at, at(1, 14, 0));
        assert!(rx.try_recv().is_err());

        drop(rx);
        assert!(!deliver_due(&scheduler, at(1, 13, 59), at(1, 14, 0), &tx).await);
    }

    #[tokio::test]
    async fn delivery_loop_stops_when_receiver_is_dropped() {
        let kv = Arc::new(MemoryKeyValueStore::default());
        let scheduler = Arc::new(LocalScheduler::open(kv, "scheduled"));
        let (tx, rx) = mpsc::unbounded_channel();

        let handle = spawn_delivery(scheduler, Duration::from_millis(5), tx);
        drop(rx);

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("delivery loop kept running")
            .unwrap();
    }
}
