use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

use purser_core::{Provider, ProviderError, SecretEntry, SecretRef};

const NAME: &str = "hashicorp_vault";
const TOKEN_HEADER: &str = "X-Vault-Token";

/// HashiCorp Vault KV v2 adapter over the REST API. The reference's
/// location is the logical path including the data segment, e.g.
/// `secret/data/prod/billing`, mirroring the vault CLI's own addressing.
#[derive(Debug)]
pub struct HashicorpVault {
    client: reqwest::Client,
    address: Url,
    token: String,
}

impl HashicorpVault {
    /// Configuration is environment based, as with the vendor tooling:
    /// `VAULT_ADDR` and `VAULT_TOKEN`.
    pub fn from_env() -> Result<Self, ProviderError> {
        let address = std::env::var("VAULT_ADDR")
            .map_err(|_| ProviderError::unavailable(NAME, "VAULT_ADDR is not set"))?;
        let token = std::env::var("VAULT_TOKEN")
            .map_err(|_| ProviderError::unavailable(NAME, "VAULT_TOKEN is not set"))?;
        Self::new(&address, &token)
    }

    pub fn new(address: &str, token: &str) -> Result<Self, ProviderError> {
        let address = Url::parse(address)
            .map_err(|e| ProviderError::unavailable(NAME, format!("invalid VAULT_ADDR: {e}")))?;
        Ok(HashicorpVault {
            client: reqwest::Client::new(),
            address,
            token: token.to_string(),
        })
    }

    fn endpoint(&self, location: &str) -> Result<Url, ProviderError> {
        self.address
            .join(&format!("v1/{}", location.trim_start_matches('/')))
            .map_err(|e| ProviderError::unavailable(NAME, format!("invalid location: {e}")))
    }

    /// Reads the secret at `location`; `None` when the path does not
    /// exist. Vault returns the kv payload as either `data{}` or
    /// `data.data{}` depending on the engine version.
    async fn read_secret(
        &self,
        location: &str,
    ) -> Result<Option<BTreeMap<String, String>>, ProviderError> {
        let response = self
            .client
            .get(self.endpoint(location)?)
            .header(TOKEN_HEADER, &self.token)
            .send()
            .await
            .map_err(|e| ProviderError::unavailable(NAME, e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(location, "secret not present");
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(ProviderError::unavailable(
                NAME,
                format!("vault returned {} for {location}", response.status()),
            ));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::unavailable(NAME, e.to_string()))?;
        let data = match body.get("data") {
            Some(data) => match data.get("data") {
                Some(inner) if inner.is_object() => inner,
                _ => data,
            },
            None => {
                return Err(ProviderError::unavailable(
                    NAME,
                    format!("malformed response for {location}: no data"),
                ))
            }
        };

        let mut kvs = BTreeMap::new();
        if let Some(map) = data.as_object() {
            for (key, value) in map {
                let value = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                kvs.insert(key.clone(), value);
            }
        }
        Ok(Some(kvs))
    }

    async fn write_secret(
        &self,
        location: &str,
        kvs: &BTreeMap<String, String>,
    ) -> Result<(), ProviderError> {
        let response = self
            .client
            .post(self.endpoint(location)?)
            .header(TOKEN_HEADER, &self.token)
            .json(&json!({ "data": kvs }))
            .send()
            .await
            .map_err(|e| ProviderError::unavailable(NAME, e.to_string()))?;
        if !response.status().is_success() {
            return Err(ProviderError::unavailable(
                NAME,
                format!("vault returned {} for {location}", response.status()),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl Provider for HashicorpVault {
    fn name(&self) -> &str {
        NAME
    }

    async fn get(&self, reference: &SecretRef) -> Result<SecretEntry, ProviderError> {
        let Some(kvs) = self.read_secret(&reference.location).await? else {
            return Ok(reference.missing());
        };
        match kvs.get(reference.effective_key()) {
            Some(value) => Ok(reference.found(value.clone())),
            None => Ok(reference.missing()),
        }
    }

    async fn get_all(&self, reference: &SecretRef) -> Result<Vec<SecretEntry>, ProviderError> {
        let Some(kvs) = self.read_secret(&reference.location).await? else {
            return Ok(Vec::new());
        };
        Ok(kvs
            .into_iter()
            .map(|(k, v)| reference.found_with_key(k, v))
            .collect())
    }

    async fn put(&self, reference: &SecretRef, value: &str) -> Result<(), ProviderError> {
        let mut kvs = self.read_secret(&reference.location).await?.unwrap_or_default();
        kvs.insert(reference.effective_key().to_string(), value.to_string());
        self.write_secret(&reference.location, &kvs).await
    }

    async fn put_all(
        &self,
        reference: &SecretRef,
        values: &BTreeMap<String, String>,
    ) -> Result<(), ProviderError> {
        let mut kvs = self.read_secret(&reference.location).await?.unwrap_or_default();
        kvs.extend(values.clone());
        self.write_secret(&reference.location, &kvs).await
    }

    async fn delete(&self, reference: &SecretRef) -> Result<(), ProviderError> {
        let Some(mut kvs) = self.read_secret(&reference.location).await? else {
            return Ok(());
        };
        kvs.remove(reference.effective_key());
        self.write_secret(&reference.location, &kvs).await
    }

    async fn delete_all(&self, reference: &SecretRef) -> Result<(), ProviderError> {
        let response = self
            .client
            .delete(self.endpoint(&reference.location)?)
            .header(TOKEN_HEADER, &self.token)
            .send()
            .await
            .map_err(|e| ProviderError::unavailable(NAME, e.to_string()))?;
        if !response.status().is_success() && response.status() != StatusCode::NOT_FOUND {
            return Err(ProviderError::unavailable(
                NAME,
                format!("vault returned {} for {}", response.status(), reference.location),
            ));
        }
        Ok(())
    }
}
