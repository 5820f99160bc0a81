#![forbid(unsafe_code)]

//! Resolves named secret references against pluggable key-value backends,
//! merges the results into one ordered entry list, detects drift between
//! backends, and scrubs known secret values out of text streams.
//!
//! Backend adapters live in `purser-providers`; this crate defines the
//! contract they implement and everything that consumes it.

pub mod collect;
pub mod drift;
pub mod export;
pub mod manifest;
pub mod provider;
pub mod redact;
pub mod resolver;
pub mod types;

pub use crate::collect::{CollectError, Collector};
pub use crate::drift::{drift, mirror_drift};
pub use crate::manifest::{Manifest, ManifestError, ProviderSpec};
pub use crate::provider::{Provider, ProviderError, ProviderRegistry};
pub use crate::redact::{RedactWriter, Redactor, MAX_LINE_BYTES};
pub use crate::resolver::{has_unresolved_placeholders, Resolver};
pub use crate::types::{
    masked, sort_by_key_desc, sort_by_provider, DriftKind, DriftedEntry, RemapRule, SecretEntry,
    SecretRef, Severity, DEFAULT_REDACT_WITH,
};
