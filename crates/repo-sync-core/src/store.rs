//! Repository persistence.
//!
//! The store is the only writer of repository status and secure values. It
//! applies the patch operations reconciliation returns, moving newly created
//! secrets into the [`SecretStore`] so that repositories only ever hold a
//! reference.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::model::{Repository, WebhookStatus};
use crate::patch::{PatchOp, PatchOperation, PatchValue, WEBHOOK_SECRET_PATH, WEBHOOK_STATUS_PATH};
use crate::secrets::{webhook_secret_name, SecretError, SecretStore, SecureValue};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("repository not found: {name}")]
    NotFound { name: String },

    #[error("unsupported patch: {op:?} {path}")]
    UnsupportedPatch { op: PatchOperation, path: String },

    #[error("secret storage failed: {0}")]
    Secret(#[from] SecretError),
}

/// Storage for repository resources, keyed by name.
#[async_trait]
pub trait RepositoryStore: Send + Sync {
    async fn get(&self, name: &str) -> Result<Option<Repository>, StoreError>;

    /// Insert or replace a repository.
    async fn put(&self, repository: Repository) -> Result<(), StoreError>;

    /// Remove a repository and any secret it owns, returning what was removed.
    async fn delete(&self, name: &str) -> Result<Option<Repository>, StoreError>;

    /// All repositories ordered by name.
    async fn list(&self) -> Result<Vec<Repository>, StoreError>;

    /// Apply patch operations atomically and return the updated repository.
    ///
    /// Only `replace` on the webhook status and webhook secret paths is
    /// supported; anything else is rejected before any change is made.
    async fn apply_patch(&self, name: &str, ops: &[PatchOp]) -> Result<Repository, StoreError>;
}

enum Change {
    Status(WebhookStatus),
    Secret(SecureValue),
}

fn to_change(op: &PatchOp) -> Result<Change, StoreError> {
    match (op.op, op.path.as_str(), &op.value) {
        (PatchOperation::Replace, WEBHOOK_STATUS_PATH, PatchValue::WebhookStatus(status)) => {
            Ok(Change::Status(status.clone()))
        }
        (PatchOperation::Replace, WEBHOOK_SECRET_PATH, PatchValue::Secure(secret)) => {
            Ok(Change::Secret(secret.clone()))
        }
        _ => Err(StoreError::UnsupportedPatch {
            op: op.op,
            path: op.path.clone(),
        }),
    }
}

/// Thread-safe in-memory repository store.
#[derive(Clone)]
pub struct InMemoryRepositoryStore {
    repositories: Arc<RwLock<BTreeMap<String, Repository>>>,
    secrets: Arc<dyn SecretStore>,
}

impl InMemoryRepositoryStore {
    pub fn new(secrets: Arc<dyn SecretStore>) -> Self {
        Self {
            repositories: Arc::new(RwLock::new(BTreeMap::new())),
            secrets,
        }
    }
}

#[async_trait]
impl RepositoryStore for InMemoryRepositoryStore {
    async fn get(&self, name: &str) -> Result<Option<Repository>, StoreError> {
        Ok(self.repositories.read().await.get(name).cloned())
    }

    async fn put(&self, repository: Repository) -> Result<(), StoreError> {
        self.repositories
            .write()
            .await
            .insert(repository.name.clone(), repository);
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<Option<Repository>, StoreError> {
        let removed = self.repositories.write().await.remove(name);
        if removed.is_some() {
            self.secrets.delete(&webhook_secret_name(name)).await?;
        }
        Ok(removed)
    }

    async fn list(&self) -> Result<Vec<Repository>, StoreError> {
        Ok(self.repositories.read().await.values().cloned().collect())
    }

    #[instrument(skip(self, ops), fields(op_count = ops.len()))]
    async fn apply_patch(&self, name: &str, ops: &[PatchOp]) -> Result<Repository, StoreError> {
        let changes = ops.iter().map(to_change).collect::<Result<Vec<_>, _>>()?;

        let mut repositories = self.repositories.write().await;
        let current = repositories
            .get(name)
            .ok_or_else(|| StoreError::NotFound {
                name: name.to_string(),
            })?;

        let mut updated = current.clone();
        for change in changes {
            match change {
                Change::Status(status) => updated.status.webhook = Some(status),
                Change::Secret(SecureValue::Create(value)) => {
                    let secret_name = webhook_secret_name(name);
                    self.secrets.put(&secret_name, value).await?;
                    debug!(secret = %secret_name, "Stored webhook secret");
                    updated.secure.webhook_secret = Some(SecureValue::Name(secret_name));
                }
                Change::Secret(reference @ SecureValue::Name(_)) => {
                    updated.secure.webhook_secret = Some(reference);
                }
            }
        }

        repositories.insert(name.to_string(), updated.clone());
        Ok(updated)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
