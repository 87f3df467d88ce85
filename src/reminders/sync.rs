use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, info, warn};

use super::definition::ReminderDefinition;
use super::error::SyncError;
use super::permission::{Authorization, PermissionGate};
use super::scheduler::NotificationScheduler;
use super::store::ReminderStore;
use super::trigger::expand_all;

/// Summary of a sync that reached both the scheduler and the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Committed {
    pub reminders: usize,
    pub triggers: usize,
    /// Reminders left out of the schedule because they are incomplete.
    pub skipped: usize,
}

/// Replaces the scheduler's whole trigger set with the expansion of a
/// reminder list, then persists the list.
///
/// Steps run in a fixed order: permission, cancel-all, schedule, persist.
/// Scheduler handles are never kept, so there is no incremental update.
pub struct SyncEngine {
    gate: PermissionGate,
    scheduler: Arc<dyn NotificationScheduler>,
    store: ReminderStore,
    in_flight: AtomicBool,
}

struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl SyncEngine {
    pub fn new(
        gate: PermissionGate,
        scheduler: Arc<dyn NotificationScheduler>,
        store: ReminderStore,
    ) -> Self {
        Self {
            gate,
            scheduler,
            store,
            in_flight: AtomicBool::new(false),
        }
    }

    #[cfg(test)]
    pub fn is_syncing(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub async fn sync(&self, reminders: &[ReminderDefinition]) -> Result<Committed, SyncError> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(SyncError::AlreadyRunning);
        }
        let _guard = InFlight(&self.in_flight);
        self.replace_all(reminders).await
    }

    async fn replace_all(&self, reminders: &[ReminderDefinition]) -> Result<Committed, SyncError> {
        if self.gate.ensure_authorized().await == Authorization::Denied {
            warn!("sync aborted: notification permission denied");
            return Err(SyncError::PermissionDenied);
        }

        // Must finish before anything new is scheduled
        self.scheduler
            .cancel_all()
            .await
            .map_err(SyncError::SchedulingFailed)?;
        debug!("cleared scheduled triggers");

        let triggers = expand_all(reminders);
        let skipped = reminders.iter().filter(|r| !r.is_complete()).count();
        if skipped > 0 {
            debug!(skipped, "incomplete reminders left unscheduled");
        }

        if let Err(e) = try_join_all(triggers.iter().map(|t| self.scheduler.schedule(t))).await {
            warn!(error = %e, "scheduling failed, clearing partial schedule");
            if let Err(cleanup) = self.scheduler.cancel_all().await {
                warn!(error = %cleanup, "could not clear partial schedule");
            }
            return Err(SyncError::SchedulingFailed(e));
        }

        self.store
            .persist(reminders.to_vec())
            .await
            .map_err(|source| SyncError::PersistFailed {
                scheduled: triggers.len(),
                source,
            })?;

        info!(
            reminders = reminders.len(),
            triggers = triggers.len(),
            skipped,
            "sync committed"
        );
        Ok(Committed {
            reminders: reminders.len(),
            triggers: triggers.len(),
            skipped,
        })
    }
}
