use std::collections::BTreeMap;

use crate::types::{DriftKind, DriftedEntry, SecretEntry};

/// Within-pass graph drift: answers "did this value propagate to where it
/// is consumed", using the free-text `source`/`sink` tags an operator
/// assigns in the manifest.
///
/// Entries with a non-empty `source` tag are indexed by `(source, key)`
/// (last one wins); entries with only a `sink` tag form candidate lists by
/// `(sink, key)` — several backends may share one sink tag. Untagged
/// entries participate in no comparison. A source with no candidate list
/// yields `missing`; every candidate whose value differs yields one
/// `changed` record. `provider_filter`, when non-empty, restricts the
/// comparison to entries of the named backend instances.
pub fn drift(entries: &[SecretEntry], provider_filter: &[String]) -> Vec<DriftedEntry> {
    let filtering = !provider_filter.is_empty();
    let mut sources: BTreeMap<String, &SecretEntry> = BTreeMap::new();
    let mut targets: BTreeMap<String, Vec<&SecretEntry>> = BTreeMap::new();

    for entry in entries {
        if filtering && !provider_filter.contains(&entry.provider_name) {
            continue;
        }
        if let Some(source) = entry.source.as_deref().filter(|s| !s.is_empty()) {
            sources.insert(format!("{source}:{}", entry.key), entry);
        } else if let Some(sink) = entry.sink.as_deref().filter(|s| !s.is_empty()) {
            targets
                .entry(format!("{sink}:{}", entry.key))
                .or_default()
                .push(entry);
        }
    }

    let mut drifts = Vec::new();
    for (tagged_key, source) in &sources {
        match targets.get(tagged_key) {
            None => drifts.push(DriftedEntry {
                kind: DriftKind::Missing,
                source: (*source).clone(),
                target: None,
            }),
            Some(candidates) => {
                for candidate in candidates {
                    if candidate.value != source.value {
                        drifts.push(DriftedEntry {
                            kind: DriftKind::Changed,
                            source: (*source).clone(),
                            target: Some((*candidate).clone()),
                        });
                    }
                }
            }
        }
    }

    drifts.sort_by(|a, b| a.source.source.cmp(&b.source.source));
    drifts
}

/// Cross-backend mirror drift: answers "are these two otherwise-unrelated
/// stores of the same logical secrets in sync", keyed only by name —
/// `source`/`sink` tags play no part.
///
/// The comparison is directional: `source` is the reference side. Entries
/// in `target` with no counterpart in `source` are not reported.
pub fn mirror_drift(source: &[SecretEntry], target: &[SecretEntry]) -> Vec<DriftedEntry> {
    let mut drifts = Vec::new();
    for entry in source {
        match target.iter().find(|t| t.key == entry.key) {
            None => drifts.push(DriftedEntry {
                kind: DriftKind::Missing,
                source: entry.clone(),
                target: None,
            }),
            Some(counterpart) if counterpart.value != entry.value => drifts.push(DriftedEntry {
                kind: DriftKind::Changed,
                source: entry.clone(),
                target: Some(counterpart.clone()),
            }),
            Some(_) => {}
        }
    }
    drifts
}
