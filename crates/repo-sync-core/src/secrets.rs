//! # Secrets Module
//!
//! Secure handling of webhook secrets.
//!
//! A repository never carries a raw secret at rest. Reconciliation produces a
//! [`SecureValue::Create`] holding a freshly generated value; the store moves
//! that value into a [`SecretStore`] and keeps only a [`SecureValue::Name`]
//! reference on the repository.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use zeroize::Zeroize;

/// Secure container for secret values
///
/// Secret values are never included in Debug output or logs and are wiped
/// from memory on drop.
#[derive(Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretValue {
    inner: String,
}

impl SecretValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            inner: value.into(),
        }
    }

    /// Generate a new random secret (UUID v4).
    pub fn generate() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }

    /// Get secret as string (only for immediate use)
    pub fn expose_secret(&self) -> &str {
        &self.inner
    }

    /// Check if secret is empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Get secret length without exposing content
    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretValue")
            .field("length", &self.len())
            .field("value", &"[REDACTED]")
            .finish()
    }
}

impl Drop for SecretValue {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}

/// A secret that is either being created or already stored.
///
/// Wire format is `{"create": "<value>"}` or `{"name": "<secret name>"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SecureValue {
    /// Raw value to be written to the secret store
    Create(SecretValue),

    /// Reference to a value held by the secret store
    Name(String),
}

/// Name under which a repository's webhook secret is stored.
pub fn webhook_secret_name(repository: &str) -> String {
    format!("{}-webhook-secret", repository)
}

/// Errors from secret storage.
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("secret not found: {name}")]
    NotFound { name: String },

    #[error("secret store unavailable: {message}")]
    Unavailable { message: String },
}

/// Storage for secret values, keyed by name.
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn get(&self, name: &str) -> Result<SecretValue, SecretError>;

    async fn put(&self, name: &str, value: SecretValue) -> Result<(), SecretError>;

    /// Remove a secret. Removing an absent secret succeeds.
    async fn delete(&self, name: &str) -> Result<(), SecretError>;
}

/// Resolve the webhook secret a repository refers to.
///
/// Returns `None` when the repository has no webhook secret at all.
pub async fn resolve_webhook_secret(
    store: &dyn SecretStore,
    secure: &crate::model::SecureValues,
) -> Result<Option<SecretValue>, SecretError> {
    match &secure.webhook_secret {
        None => Ok(None),
        Some(SecureValue::Create(value)) => Ok(Some(value.clone())),
        Some(SecureValue::Name(name)) => store.get(name).await.map(Some),
    }
}

/// Thread-safe in-memory secret store for testing and single-process use.
#[derive(Clone, Default)]
pub struct InMemorySecretStore {
    secrets: Arc<RwLock<HashMap<String, SecretValue>>>,
}

impl InMemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored secrets.
    pub async fn len(&self) -> usize {
        self.secrets.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.secrets.read().await.is_empty()
    }
}

#[async_trait]
impl SecretStore for InMemorySecretStore {
    async fn get(&self, name: &str) -> Result<SecretValue, SecretError> {
        self.secrets
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| SecretError::NotFound {
                name: name.to_string(),
            })
    }

    async fn put(&self, name: &str, value: SecretValue) -> Result<(), SecretError> {
        self.secrets.write().await.insert(name.to_string(), value);
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), SecretError> {
        self.secrets.write().await.remove(name);
        Ok(())
    }
}

#[cfg(test)]
#[path = "secrets_tests.rs"]
mod tests;
