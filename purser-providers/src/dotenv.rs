use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use purser_core::{Provider, ProviderError, SecretEntry, SecretRef};

const NAME: &str = "dotenv";

/// `.env` file store; the reference's location is the file path. Supports
/// the full operation matrix: put creates the file (and parent
/// directories) on demand, delete-all removes it.
#[derive(Debug, Default)]
pub struct Dotenv;

impl Dotenv {
    pub fn new() -> Self {
        Dotenv
    }

    fn read(&self, path: &str) -> Result<BTreeMap<String, String>, ProviderError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ProviderError::unavailable(NAME, format!("{path}: {e}")))?;
        Ok(parse(&content))
    }

    fn write(&self, path: &str, kvs: &BTreeMap<String, String>) -> Result<(), ProviderError> {
        if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| ProviderError::unavailable(NAME, format!("{path}: {e}")))?;
        }
        std::fs::write(path, serialize(kvs))
            .map_err(|e| ProviderError::unavailable(NAME, format!("{path}: {e}")))
    }

    /// Like `read`, but a file that does not exist yet is an empty map;
    /// used by the write paths.
    fn read_or_empty(&self, path: &str) -> Result<BTreeMap<String, String>, ProviderError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(parse(&content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(ProviderError::unavailable(NAME, format!("{path}: {e}"))),
        }
    }
}

#[async_trait]
impl Provider for Dotenv {
    fn name(&self) -> &str {
        NAME
    }

    async fn get(&self, reference: &SecretRef) -> Result<SecretEntry, ProviderError> {
        let kvs = self.read(&reference.location)?;
        match kvs.get(reference.effective_key()) {
            Some(value) => Ok(reference.found(value.clone())),
            None => {
                debug!(key = reference.effective_key(), file = %reference.location, "key not in file");
                Ok(reference.missing())
            }
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

fn parse(content: &str) -> BTreeMap<String, String> {
    let mut kvs = BTreeMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        if let Some((key, value)) = line.split_once('=') {
            kvs.insert(key.trim().to_string(), unquote(value.trim()).to_string());
        }
    }
    kvs
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

fn serialize(kvs: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    for (key, value) in kvs {
        out.push_str(key);
        out.push('=');
        out.push_str(value);
        out.push('\n');
    }
    out
}
