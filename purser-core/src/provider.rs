use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::types::{SecretEntry, SecretRef};

/// The contract every backend adapter satisfies. The collection pipeline
/// depends only on this trait, never on concrete adapters.
///
/// `get` reports a missing key as a `found == false` entry, not an error;
/// errors are reserved for connectivity, permission, and malformed-response
/// failures. Write and delete operations default to unsupported since many
/// backends are read-only.
#[async_trait]
pub trait Provider: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    /// Single-value lookup.
    async fn get(&self, reference: &SecretRef) -> Result<SecretEntry, ProviderError>;

    /// Namespace-sync lookup: every entry beneath `location`.
    async fn get_all(&self, reference: &SecretRef) -> Result<Vec<SecretEntry>, ProviderError>;

    async fn put(&self, _reference: &SecretRef, _value: &str) -> Result<(), ProviderError> {
        Err(ProviderError::unsupported(self.name(), "put"))
    }

    async fn put_all(
        &self,
        _reference: &SecretRef,
        _values: &BTreeMap<String, String>,
    ) -> Result<(), ProviderError> {
        Err(ProviderError::unsupported(self.name(), "put_all"))
    }

    async fn delete(&self, _reference: &SecretRef) -> Result<(), ProviderError> {
        Err(ProviderError::unsupported(self.name(), "delete"))
    }

    async fn delete_all(&self, _reference: &SecretRef) -> Result<(), ProviderError> {
        Err(ProviderError::unsupported(self.name(), "delete_all"))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider `{provider}` is unavailable: {message}")]
    Unavailable { provider: String, message: String },
    #[error("`{key}` not found at `{location}` in provider `{provider}`")]
    NotFound {
        provider: String,
        location: String,
        key: String,
    },
    #[error("provider `{provider}` does not support {operation}")]
    Unsupported {
        provider: String,
        operation: String,
    },
    #[error("no provider registered under `{0}`")]
    UnknownProvider(String),
}

impl ProviderError {
    pub fn unavailable(provider: impl Into<String>, message: impl Into<String>) -> Self {
        ProviderError::Unavailable {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn not_found(reference: &SecretRef, provider: impl Into<String>) -> Self {
        ProviderError::NotFound {
            provider: provider.into(),
            location: reference.location.clone(),
            key: reference.key.clone(),
        }
    }

    pub fn unsupported(provider: impl Into<String>, operation: impl Into<String>) -> Self {
        ProviderError::Unsupported {
            provider: provider.into(),
            operation: operation.into(),
        }
    }
}

type ProviderBuilder = Box<dyn Fn() -> Result<Arc<dyn Provider>, ProviderError> + Send + Sync>;

/// Name → constructor table, passed into the collector explicitly. There is
/// no process-wide registry; embedders and tests compose their own.
#[derive(Default)]
pub struct ProviderRegistry {
    builders: BTreeMap<String, ProviderBuilder>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, kind: &str, builder: F)
    where
        F: Fn() -> Result<Arc<dyn Provider>, ProviderError> + Send + Sync + 'static,
    {
        self.builders.insert(kind.to_string(), Box::new(builder));
    }

    pub fn build(&self, kind: &str) -> Result<Arc<dyn Provider>, ProviderError> {
        match self.builders.get(kind) {
            Some(builder) => builder(),
            None => Err(ProviderError::UnknownProvider(kind.to_string())),
        }
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.builders.contains_key(kind)
    }

    pub fn kinds(&self) -> Vec<&str> {
        self.builders.keys().map(String::as_str).collect()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}
