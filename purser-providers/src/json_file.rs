use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::Path;

use async_trait::async_trait;

use purser_core::{Provider, ProviderError, SecretEntry, SecretRef};

const NAME: &str = "json_file";

/// Flat JSON map file store; the reference's location is the file path
/// and the document is an object of string values.
#[derive(Debug, Default)]
pub struct JsonFile;

impl JsonFile {
    pub fn new() -> Self {
        JsonFile
    }

    fn read(&self, path: &str) -> Result<BTreeMap<String, String>, ProviderError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ProviderError::unavailable(NAME, format!("{path}: {e}")))?;
        serde_json::from_str(&content)
            .map_err(|e| ProviderError::unavailable(NAME, format!("{path}: {e}")))
    }

    fn read_or_empty(&self, path: &str) -> Result<BTreeMap<String, String>, ProviderError> {
        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| ProviderError::unavailable(NAME, format!("{path}: {e}"))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(ProviderError::unavailable(NAME, format!("{path}: {e}"))),
        }
    }

    fn write(&self, path: &str, kvs: &BTreeMap<String, String>) -> Result<(), ProviderError> {
        if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| ProviderError::unavailable(NAME, format!("{path}: {e}")))?;
        }
        let content = serde_json::to_string_pretty(kvs)
            .map_err(|e| ProviderError::unavailable(NAME, e.to_string()))?;
        std::fs::write(path, content)
            .map_err(|e| ProviderError::unavailable(NAME, format!("{path}: {e}")))
    }
}

#[async_trait]
impl Provider for JsonFile {
    fn name(&self) -> &str {
        NAME
    }

    async fn get(&self, reference: &SecretRef) -> Result<SecretEntry, ProviderError> {
        let kvs = self.read(&reference.location)?;
        match kvs.get(reference.effective_key()) {
            Some(value) => Ok(reference.found(value.clone())),
            None => Ok(reference.missing()),
        }
    }

    async fn get_all(&self, reference: &SecretRef) -> Result<Vec<SecretEntry>, ProviderError> {
        let kvs = self.read(&reference.location)?;
        Ok(kvs
            .into_iter()
            .map(|(k, v)| reference.found_with_key(k, v))
            .collect())
    }

    async fn put(&self, reference: &SecretRef, value: &str) -> Result<(), ProviderError> {
        let mut kvs = self.read_or_empty(&reference.location)?;
        kvs.insert(reference.effective_key().to_string(), value.to_string());
        self.write(&reference.location, &kvs)
    }

    async fn put_all(
        &self,
        reference: &SecretRef,
        values: &BTreeMap<String, String>,
    ) -> Result<(), ProviderError> {
        let mut kvs = self.read_or_empty(&reference.location)?;
        kvs.extend(values.clone());
        self.write(&reference.location, &kvs)
    }

    async fn delete(&self, reference: &SecretRef) -> Result<(), ProviderError> {
        let mut kvs = self.read(&reference.location)?;
        kvs.remove(reference.effective_key());
        self.write(&reference.location, &kvs)
    }

    async fn delete_all(&self, reference: &SecretRef) -> Result<(), ProviderError> {
        match std::fs::remove_file(&reference.location) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ProviderError::unavailable(
                NAME,
                format!("{}: {e}", reference.location),
            )),
        }
    }
}
