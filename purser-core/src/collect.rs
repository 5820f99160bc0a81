use std::sync::Arc;

use tracing::debug;

use crate::drift;
use crate::manifest::{Manifest, ProviderSpec};
use crate::provider::{Provider, ProviderError, ProviderRegistry};
use crate::resolver::{has_unresolved_placeholders, Resolver};
use crate::types::{
    sort_by_key_desc, DriftedEntry, SecretEntry, SecretRef, Severity, DEFAULT_REDACT_WITH,
};

#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("instance `{0}` is not declared in the manifest")]
    UnknownInstance(String),
    #[error(
        "provider `{provider}`: location `{location}` still contains unresolved placeholders"
    )]
    UnresolvedLocation { provider: String, location: String },
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Walks the manifest's backend instances, resolves references, invokes the
/// backend contract, applies remap/severity/redaction policy and produces
/// one flat, ordered entry list.
///
/// Collection is all-or-nothing: the first hard error from any non-optional
/// lookup aborts the pass and partial results are discarded, so a caller
/// about to inject secrets into a process never proceeds on an incomplete
/// set. Backends are called sequentially, one reference at a time.
pub struct Collector {
    manifest: Manifest,
    resolver: Resolver,
    registry: ProviderRegistry,
}

impl Collector {
    pub fn new(manifest: Manifest, registry: ProviderRegistry) -> Self {
        let resolver = Resolver::new(manifest.options());
        Collector {
            manifest,
            resolver,
            registry,
        }
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Collects every instance in the manifest, concatenated and sorted
    /// descending by key for deterministic, reviewable output.
    pub async fn collect(&self) -> Result<Vec<SecretEntry>, CollectError> {
        let mut entries = Vec::new();
        for name in self.manifest.providers.keys() {
            entries.extend(self.collect_provider(name).await?);
        }
        sort_by_key_desc(&mut entries);
        Ok(entries)
    }

    /// Collects a single backend instance: namespace-sync first, then
    /// named keys.
    pub async fn collect_provider(&self, name: &str) -> Result<Vec<SecretEntry>, CollectError> {
        let spec = self
            .manifest
            .providers
            .get(name)
            .ok_or_else(|| CollectError::UnknownInstance(name.to_string()))?;
        let provider = self.provider_for(name, spec)?;

        let mut entries = Vec::new();

        if let Some(sync_ref) = &spec.sync {
            let resolved = self.resolve_checked(name, sync_ref)?;
            let mut fetched = provider.get_all(&resolved).await?;
            debug!(provider = name, count = fetched.len(), "namespace sync fetched");

            let remap = sync_ref.effective_remap();
            for entry in &mut fetched {
                // Remap first so a rule's severity/marker override wins
                // over the reference's own policy.
                let mut severity = sync_ref.severity;
                let mut redact_with = sync_ref.redact_with.clone();
                if let Some(rule) = remap.get(&entry.key) {
                    if let Some(rename) = rule.rename.as_deref().filter(|r| !r.is_empty()) {
                        debug!(provider = name, from = %entry.key, to = rename, "remap entry");
                        entry.key = rename.to_string();
                    }
                    if rule.severity.is_some() {
                        severity = rule.severity;
                    }
                    if rule.redact_with.is_some() {
                        redact_with = rule.redact_with.clone();
                    }
                }
                entry.severity = severity.unwrap_or(Severity::High);
                entry.redact_with = redact_with.unwrap_or_else(|| DEFAULT_REDACT_WITH.to_string());
                entry.provider_name = name.to_string();
                entry.source = sync_ref.source.clone();
                entry.sink = sync_ref.sink.clone();
            }
            entries.append(&mut fetched);
        }

        if let Some(named) = &spec.entries {
            for (key, reference) in named {
                let reference = reference.with_key(key);
                let resolved = self.resolve_checked(name, &reference)?;
                debug!(provider = name, key = %key, location = %resolved.location, "lookup");
                match provider.get(&resolved).await {
                    Ok(entry) if entry.found => {
                        entries.push(stamp(entry, &reference, name));
                    }
                    Ok(_) if reference.optional => {
                        debug!(provider = name, key = %key, "optional lookup missing, skipping");
                    }
                    Ok(_) => {
                        return Err(ProviderError::not_found(&resolved, name).into());
                    }
                    Err(_) if reference.optional => {
                        debug!(provider = name, key = %key, "optional lookup failed, skipping");
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }

        debug!(provider = name, count = entries.len(), "collected");
        Ok(entries)
    }

    /// Independently re-collects two instances and compares them by key,
    /// with the first instance as the reference side.
    pub async fn mirror_drift(
        &self,
        source: &str,
        target: &str,
    ) -> Result<Vec<DriftedEntry>, CollectError> {
        let source_entries = self.collect_provider(source).await?;
        let target_entries = self.collect_provider(target).await?;
        Ok(drift::mirror_drift(&source_entries, &target_entries))
    }

    /// Backend handle for a declared instance; the write/delete
    /// pass-through commands use this without going through a collection
    /// pass.
    pub fn provider(&self, name: &str) -> Result<Arc<dyn Provider>, CollectError> {
        let spec = self
            .manifest
            .providers
            .get(name)
            .ok_or_else(|| CollectError::UnknownInstance(name.to_string()))?;
        Ok(self.provider_for(name, spec)?)
    }

    /// Resolves the backend handle for an instance: the instance name when
    /// it is a registered type, else its `kind` alias.
    fn provider_for(
        &self,
        name: &str,
        spec: &ProviderSpec,
    ) -> Result<Arc<dyn Provider>, ProviderError> {
        match self.registry.build(name) {
            Ok(provider) => Ok(provider),
            Err(ProviderError::UnknownProvider(_)) => match spec.kind.as_deref() {
                Some(kind) => self.registry.build(kind),
                None => Err(ProviderError::UnknownProvider(name.to_string())),
            },
            Err(e) => Err(e),
        }
    }

    /// A location that still carries a placeholder after resolution means a
    /// caller bug in the mapping; fail before the backend sees a literal
    /// `{{...}}` path.
    pub fn resolve_checked(
        &self,
        provider: &str,
        reference: &SecretRef,
    ) -> Result<SecretRef, CollectError> {
        let resolved = self.resolver.resolve_ref(reference);
        if has_unresolved_placeholders(&resolved.location) {
            return Err(CollectError::UnresolvedLocation {
                provider: provider.to_string(),
                location: resolved.location,
            });
        }
        Ok(resolved)
    }
}

fn stamp(mut entry: SecretEntry, reference: &SecretRef, provider_name: &str) -> SecretEntry {
    entry.provider_name = provider_name.to_string();
    entry.source = reference.source.clone();
    entry.sink = reference.sink.clone();
    entry.severity = reference.severity.unwrap_or(Severity::High);
    entry.redact_with = reference
        .redact_with
        .clone()
        .unwrap_or_else(|| DEFAULT_REDACT_WITH.to_string());
    entry
}
