use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use purser_core::{Provider, ProviderError, SecretEntry, SecretRef};

const NAME: &str = "inmemory";

/// Map-backed store keyed by full path (`prod/billing/FOO`). Meant for
/// tests and embedding; not registered in the default registry since an
/// empty instance resolves nothing.
#[derive(Debug, Default)]
pub struct InMemory {
    data: Mutex<BTreeMap<String, String>>,
}

impl InMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        InMemory {
            data: Mutex::new(
                pairs
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        // A poisoned lock means a panicking test thread; the data itself
        // cannot be mid-write.
        self.data.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Provider for InMemory {
    fn name(&self) -> &str {
        NAME
    }

    async fn get(&self, reference: &SecretRef) -> Result<SecretEntry, ProviderError> {
        match self.lock().get(&reference.location) {
            Some(value) => Ok(reference.found(value.clone())),
            None => Ok(reference.missing()),
        }
    }

    async fn get_all(&self, reference: &SecretRef) -> Result<Vec<SecretEntry>, ProviderError> {
        let prefix = format!("{}/", reference.location);
        Ok(self
            .lock()
            .iter()
            .filter(|(k, _)| k.starts_with(&prefix))
            .map(|(k, v)| reference.found_with_key(k.clone(), v.clone()))
            .collect())
    }

    async fn put(&self, reference: &SecretRef, value: &str) -> Result<(), ProviderError> {
        self.lock()
            .insert(reference.location.clone(), value.to_string());
        Ok(())
    }

    async fn put_all(
        &self,
        reference: &SecretRef,
        values: &BTreeMap<String, String>,
    ) -> Result<(), ProviderError> {
        let mut data = self.lock();
        for (key, value) in values {
            data.insert(format!("{}/{key}", reference.location), value.clone());
        }
        Ok(())
    }

    async fn delete(&self, reference: &SecretRef) -> Result<(), ProviderError> {
        self.lock().remove(&reference.location);
        Ok(())
    }

    async fn delete_all(&self, reference: &SecretRef) -> Result<(), ProviderError> {
        let prefix = format!("{}/", reference.location);
        self.lock().retain(|k, _| !k.starts_with(&prefix));
        Ok(())
    }
}
