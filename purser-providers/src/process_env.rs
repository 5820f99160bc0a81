use async_trait::async_trait;
use tracing::debug;

use purser_core::{Provider, ProviderError, SecretEntry, SecretRef};

const NAME: &str = "process_env";

/// Reads the process environment. `get` looks up the reference's
/// effective key as a variable name; `get_all` snapshots the entire
/// environment (the location is irrelevant for both). Read-only.
#[derive(Debug, Default)]
pub struct ProcessEnv;

impl ProcessEnv {
    pub fn new() -> Self {
        ProcessEnv
    }
}

#[async_trait]
impl Provider for ProcessEnv {
    fn name(&self) -> &str {
        NAME
    }

    async fn get(&self, reference: &SecretRef) -> Result<SecretEntry, ProviderError> {
        let key = reference.effective_key();
        match std::env::var(key) {
            Ok(value) => Ok(reference.found(value)),
            Err(_) => {
                debug!(key, "environment variable not set");
                Ok(reference.missing())
            }
        }
    }

    async fn get_all(&self, reference: &SecretRef) -> Result<Vec<SecretEntry>, ProviderError> {
        Ok(std::env::vars()
            .map(|(k, v)| reference.found_with_key(k, v))
            .collect())
    }
}
