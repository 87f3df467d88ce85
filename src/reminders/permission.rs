use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

use super::error::StorageError;
use super::store::KeyValueStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    Granted,
    Denied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorizationStatus {
    Undetermined,
    Granted,
    Denied,
}

/// The platform's notification authorization.
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn status(&self) -> AuthorizationStatus;

    /// Ask the user. Implementations must not prompt again after a denial.
    async fn request_authorization(&self) -> Authorization;
}

/// One-shot authorization check run before every sync.
#[derive(Clone)]
pub struct PermissionGate {
    authorizer: Arc<dyn Authorizer>,
}

impl PermissionGate {
    pub fn new(authorizer: Arc<dyn Authorizer>) -> Self {
        Self { authorizer }
    }

    pub async fn ensure_authorized(&self) -> Authorization {
        match self.authorizer.status().await {
            AuthorizationStatus::Granted => Authorization::Granted,
            AuthorizationStatus::Denied => Authorization::Denied,
            AuthorizationStatus::Undetermined => self.authorizer.request_authorization().await,
        }
    }
}

/// A question for the user; answer `true` to allow notifications.
#[derive(Debug)]
pub struct PermissionPrompt {
    pub reply: oneshot::Sender<bool>,
}

#[derive(Serialize, Deserialize)]
struct AuthorizationRecord {
    status: AuthorizationStatus,
}

/// Authorization kept by this app: a grant is persisted, a denial lasts
/// for the rest of the process.
pub struct LocalAuthorizer {
    status: Mutex<AuthorizationStatus>,
    kv: Arc<dyn KeyValueStore>,
    key: String,
    prompts: mpsc::UnboundedSender<PermissionPrompt>,
}

impl LocalAuthorizer {
    pub fn new(
        kv: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
        prompts: mpsc::UnboundedSender<PermissionPrompt>,
    ) -> Self {
        let key = key.into();
        let status = match kv.get(&key) {
            Ok(Some(bytes)) => std::str::from_utf8(&bytes)
                .ok()
                .and_then(|text| toml::from_str::<AuthorizationRecord>(text).ok())
                .map(|record| record.status)
                .filter(|status| *status == AuthorizationStatus::Granted)
                .unwrap_or(AuthorizationStatus::Undetermined),
            Ok(None) => AuthorizationStatus::Undetermined,
            Err(e) => {
                warn!(error = %e, "could not read authorization state");
                AuthorizationStatus::Undetermined
            }
        };

        Self {
            status: Mutex::new(status),
            kv,
            key,
            prompts,
        }
    }

    fn current(&self) -> AuthorizationStatus {
        match self.status.lock() {
            Ok(status) => *status,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    async fn record(&self, status: AuthorizationStatus) {
        match self.status.lock() {
            Ok(mut current) => *current = status,
            Err(poisoned) => *poisoned.into_inner() = status,
        }

        if status == AuthorizationStatus::Granted {
            if let Err(e) = self.persist_grant().await {
                warn!(error = %e, "could not persist notification grant");
            }
        }
    }

    async fn persist_grant(&self) -> Result<(), StorageError> {
        let record = AuthorizationRecord {
            status: AuthorizationStatus::Granted,
        };
        let text = toml::to_string(&record)?;
        let kv = self.kv.clone();
        let key = self.key.clone();
        tokio::task::spawn_blocking(move || kv.set(&key, text.as_bytes())).await?
    }
}

#[async_trait]
impl Authorizer for LocalAuthorizer {
    async fn status(&self) -> AuthorizationStatus {
        self.current()
    }

    async fn request_authorization(&self) -> Authorization {
        match self.current() {
            AuthorizationStatus::Granted => return Authorization::Granted,
            AuthorizationStatus::Denied => return Authorization::Denied,
            AuthorizationStatus::Undetermined => {}
        }

        let (reply, answer) = oneshot::channel();
        if self.prompts.send(PermissionPrompt { reply }).is_err() {
            warn!("no one to ask for notification permission");
            return Authorization::Denied;
        }

        // A dropped prompt counts as a refusal
        let granted = answer.await.unwrap_or(false);
        if granted {
            info!("notification permission granted");
            self.record(AuthorizationStatus::Granted).await;
            Authorization::Granted
        } else {
            info!("notification permission denied");
            self.record(AuthorizationStatus::Denied).await;
            Authorization::Denied
        }
    }
}
