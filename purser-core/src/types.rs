use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Default marker substituted for secret values in redacted output.
pub const DEFAULT_REDACT_WITH: &str = "**REDACTED**";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
    None,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::None => "none",
        };
        f.write_str(s)
    }
}

/// Per-key overrides applied when a namespace-sync entry matches a
/// `remap_with` rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemapRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redact_with: Option<String>,
}

/// The declarative address of one secret inside one backend. `location`
/// may carry `{{name}}` placeholders until the resolver rewrites it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretRef {
    /// Logical placeholder name the caller uses, e.g. an eventual
    /// environment variable name.
    #[serde(default)]
    pub key: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remap: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remap_with: Option<BTreeMap<String, RemapRule>>,
    #[serde(default)]
    pub decrypt: bool,
    #[serde(default)]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redact_with: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sink: Option<String>,
}

impl SecretRef {
    /// The key a backend should look up: `field` wins over `key`.
    pub fn effective_key(&self) -> &str {
        match self.field.as_deref() {
            Some(f) if !f.is_empty() => f,
            _ => &self.key,
        }
    }

    /// Normalizes `remap` and `remap_with` into one rule table. Plain
    /// `remap` entries become rename-only rules.
    pub fn effective_remap(&self) -> BTreeMap<String, RemapRule> {
        if let Some(remap) = &self.remap {
            return remap
                .iter()
                .map(|(k, v)| {
                    (
                        k.clone(),
                        RemapRule {
                            rename: Some(v.clone()),
                            ..RemapRule::default()
                        },
                    )
                })
                .collect();
        }
        self.remap_with.clone().unwrap_or_default()
    }

    /// Copy of this reference with the logical name replaced; used when a
    /// named-keys map injects its map key as the placeholder name.
    pub fn with_key(&self, key: &str) -> SecretRef {
        SecretRef {
            key: key.to_string(),
            ..self.clone()
        }
    }

    /// Copy of this reference with only `location` rewritten.
    pub fn with_location(&self, location: String) -> SecretRef {
        SecretRef {
            location,
            ..self.clone()
        }
    }

    /// Entry for a lookup whose key does not exist at `location`.
    pub fn missing(&self) -> SecretEntry {
        SecretEntry {
            key: self.key.clone(),
            field: self.field.clone(),
            resolved_location: self.location.clone(),
            found: false,
            ..SecretEntry::default()
        }
    }

    /// Entry for a successful lookup of this reference's own key.
    pub fn found(&self, value: impl Into<String>) -> SecretEntry {
        SecretEntry {
            key: self.key.clone(),
            field: self.field.clone(),
            value: value.into(),
            resolved_location: self.location.clone(),
            found: true,
            ..SecretEntry::default()
        }
    }

    /// Entry for one key of a namespace-sync result, where the backend
    /// names the key.
    pub fn found_with_key(&self, key: impl Into<String>, value: impl Into<String>) -> SecretEntry {
        SecretEntry {
            key: key.into(),
            field: self.field.clone(),
            value: value.into(),
            resolved_location: self.location.clone(),
            found: true,
            ..SecretEntry::default()
        }
    }
}

/// The outcome of evaluating one reference against one backend. Created
/// once per collection pass and never mutated afterwards.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretEntry {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub value: String,
    pub provider_name: String,
    pub resolved_location: String,
    pub severity: Severity,
    pub redact_with: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sink: Option<String>,
    pub found: bool,
}

impl Default for SecretEntry {
    fn default() -> Self {
        SecretEntry {
            key: String::new(),
            field: None,
            value: String::new(),
            provider_name: String::new(),
            resolved_location: String::new(),
            severity: Severity::High,
            redact_with: DEFAULT_REDACT_WITH.to_string(),
            source: None,
            sink: None,
            found: true,
        }
    }
}

// The value never goes through Debug output; log lines and panic messages
// must stay safe to ship.
impl fmt::Debug for SecretEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretEntry")
            .field("key", &self.key)
            .field("field", &self.field)
            .field("value", &masked(&self.value))
            .field("provider_name", &self.provider_name)
            .field("resolved_location", &self.resolved_location)
            .field("severity", &self.severity)
            .field("found", &self.found)
            .finish()
    }
}

/// First two characters of a value followed by a fixed mask; safe for
/// human-facing listings.
pub fn masked(value: &str) -> String {
    let prefix: String = value.chars().take(2).collect();
    format!("{prefix}*****")
}

/// Descending by key; the deterministic order of a collection pass.
pub fn sort_by_key_desc(entries: &mut [SecretEntry]) {
    entries.sort_by(|a, b| b.key.cmp(&a.key));
}

/// Provider name (case-insensitive) then key, ascending; listing order.
pub fn sort_by_provider(entries: &mut [SecretEntry]) {
    entries.sort_by(|a, b| {
        let pa = a.provider_name.to_lowercase();
        let pb = b.provider_name.to_lowercase();
        pa.cmp(&pb).then_with(|| a.key.cmp(&b.key))
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriftKind {
    Missing,
    Changed,
}

impl fmt::Display for DriftKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriftKind::Missing => f.write_str("missing"),
            DriftKind::Changed => f.write_str("changed"),
        }
    }
}

/// A detected inconsistency between two entries expected to agree.
/// `target` is absent when the counterpart is missing entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftedEntry {
    pub kind: DriftKind,
    pub source: SecretEntry,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<SecretEntry>,
}
