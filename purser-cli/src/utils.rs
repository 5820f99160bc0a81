use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use purser_core::{masked, Collector, DriftedEntry, ManifestError, SecretEntry};
use purser_providers::default_registry;

pub fn load_collector(path: &Path) -> Result<Collector, ManifestError> {
    let manifest = purser_core::Manifest::from_path(path)?;
    Ok(Collector::new(manifest, default_registry()))
}

pub fn parse_kv_pairs(pairs: &[String]) -> Result<BTreeMap<String, String>, String> {
    let mut kvs = BTreeMap::new();
    for pair in pairs {
        match pair.split_once('=') {
            Some((key, value)) if !key.is_empty() => {
                kvs.insert(key.to_string(), value.to_string());
            }
            _ => return Err(format!("expected KEY=VALUE, got `{pair}`")),
        }
    }
    Ok(kvs)
}

/// Serializable projection of an entry that is safe to print: the value is
/// reduced to a masked preview.
#[derive(Debug, Serialize)]
pub struct EntryView {
    pub key: String,
    pub provider: String,
    pub location: String,
    pub severity: String,
    pub value: String,
}

impl EntryView {
    pub fn from_entry(entry: &SecretEntry) -> Self {
        EntryView {
            key: entry.key.clone(),
            provider: entry.provider_name.clone(),
            location: entry.resolved_location.clone(),
            severity: entry.severity.to_string(),
            value: masked(&entry.value),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DriftView {
    pub kind: String,
    pub source: EntryView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<EntryView>,
}

impl DriftView {
    pub fn from_drift(drift: &DriftedEntry) -> Self {
        DriftView {
            kind: drift.kind.to_string(),
            source: EntryView::from_entry(&drift.source),
            target: drift.target.as_ref().map(EntryView::from_entry),
        }
    }
}

/// Human-oriented rendering of drift records, one per line.
pub fn format_drift_line(drift: &DriftedEntry) -> String {
    let tag = drift.source.source.as_deref().unwrap_or("-");
    match &drift.target {
        Some(target) => format!(
            "{} [{}] {} {} {} != {} {} {}",
            drift.kind,
            tag,
            drift.source.provider_name,
            drift.source.key,
            masked(&drift.source.value),
            target.provider_name,
            target.key,
            masked(&target.value),
        ),
        None => format!(
            "{} [{}] {} {} {} ??",
            drift.kind,
            tag,
            drift.source.provider_name,
            drift.source.key,
            masked(&drift.source.value),
        ),
    }
}
