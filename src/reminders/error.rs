use thiserror::Error;

/// Failures of the durable key-value store.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not encode reminder list: {0}")]
    Encode(#[from] toml::ser::Error),

    #[error("Storage rejected write: {0}")]
    Rejected(String),

    #[error("Storage write did not finish: {0}")]
    Interrupted(#[from] tokio::task::JoinError),
}

/// Failures reported by a notification scheduler.
#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Scheduler rejected trigger: {0}")]
    Rejected(String),

    #[error("Scheduler storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Outcome of a failed sync, as surfaced to the user.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Notification permission is required. Allow notifications and save again.")]
    PermissionDenied,

    #[error("Could not schedule reminders: {0}")]
    SchedulingFailed(#[source] SchedulerError),

    #[error(
        "Reminders are scheduled ({scheduled} triggers) but could not be saved; \
         they will be lost after restart: {source}"
    )]
    PersistFailed {
        scheduled: usize,
        #[source]
        source: StorageError,
    },

    #[error("A save is already in progress")]
    AlreadyRunning,
}
