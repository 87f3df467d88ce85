pub mod definition;
pub mod error;
pub mod model;
pub mod permission;
pub mod scheduler;
pub mod store;
pub mod sync;
pub mod trigger;

pub use definition::{ReminderDefinition, ReminderList};
pub use error::SyncError;
pub use model::ReminderListModel;
pub use permission::{LocalAuthorizer, PermissionGate, PermissionPrompt};
pub use scheduler::{Delivery, LocalScheduler};
pub use store::{FileKeyValueStore, KeyValueStore, ReminderStore};
pub use sync::{Committed, SyncEngine};
