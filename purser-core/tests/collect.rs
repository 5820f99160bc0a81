use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use purser_core::{
    CollectError, Collector, Manifest, Provider, ProviderError, ProviderRegistry, SecretEntry,
    SecretRef, Severity,
};

/// Map-backed provider double keyed by full path, in the shape of a real
/// key-value backend: `get` addresses one path, `get_all` returns every
/// key under `location/`.
#[derive(Debug)]
struct MapProvider {
    name: &'static str,
    data: BTreeMap<String, String>,
    fail: bool,
}

#[async_trait]
impl Provider for MapProvider {
    fn name(&self) -> &str {
        self.name
    }

    async fn get(&self, reference: &SecretRef) -> Result<SecretEntry, ProviderError> {
        if self.fail {
            return Err(ProviderError::unavailable(self.name, "connection refused"));
        }
        match self.data.get(&reference.location) {
            Some(value) => Ok(reference.found(value.clone())),
            None => Ok(reference.missing()),
        }
    }

    async fn get_all(&self, reference: &SecretRef) -> Result<Vec<SecretEntry>, ProviderError> {
        if self.fail {
            return Err(ProviderError::unavailable(self.name, "connection refused"));
        }
        let prefix = format!("{}/", reference.location);
        Ok(self
            .data
            .iter()
            .filter(|(k, _)| k.starts_with(&prefix))
            .map(|(k, v)| reference.found_with_key(k.clone(), v.clone()))
            .collect())
    }
}

fn billing_data() -> BTreeMap<String, String> {
    [
        ("prod/billing/FOO", "foo_shazam"),
        ("prod/billing/MG_KEY", "mg_shazam"),
        ("prod/billing/BEFORE_REMAP", "remap_me"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn registry_with(name: &'static str, data: BTreeMap<String, String>, fail: bool) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    registry.register(name, move || {
        Ok(Arc::new(MapProvider {
            name,
            data: data.clone(),
            fail,
        }) as Arc<dyn Provider>)
    });
    registry
}

fn manifest(yaml: &str) -> Manifest {
    Manifest::parse(yaml).expect("manifest parses")
}

#[tokio::test]
async fn namespace_sync_resolves_location_and_sorts_descending() {
    let m = manifest(
        r#"
opts:
  stage: prod
providers:
  inmem:
    sync:
      location: "{{stage}}/billing"
"#,
    );
    let collector = Collector::new(m, registry_with("inmem", billing_data(), false));
    let entries = collector.collect().await.unwrap();

    assert_eq!(entries.len(), 3);
    assert!(entries.iter().all(|e| e.resolved_location == "prod/billing"));
    assert!(entries.iter().all(|e| e.provider_name == "inmem"));
    assert!(entries.iter().all(|e| e.found));
    // Descending by key.
    assert_eq!(entries[0].key, "prod/billing/MG_KEY");
    assert_eq!(entries[0].value, "mg_shazam");
    assert_eq!(entries[1].key, "prod/billing/FOO");
    assert_eq!(entries[2].key, "prod/billing/BEFORE_REMAP");
}

#[tokio::test]
async fn sync_entries_get_default_policy_and_tags() {
    let m = manifest(
        r#"
opts:
  stage: prod
providers:
  inmem:
    sync:
      location: "{{stage}}/billing"
      source: billing
"#,
    );
    let collector = Collector::new(m, registry_with("inmem", billing_data(), false));
    let entries = collector.collect().await.unwrap();

    for entry in &entries {
        assert_eq!(entry.severity, Severity::High);
        assert_eq!(entry.redact_with, "**REDACTED**");
        assert_eq!(entry.source.as_deref(), Some("billing"));
        assert_eq!(entry.sink, None);
    }
}

#[tokio::test]
async fn remap_renames_matching_keys_only() {
    let m = manifest(
        r#"
opts:
  stage: prod
providers:
  inmem:
    sync:
      location: "{{stage}}/billing"
      remap:
        prod/billing/BEFORE_REMAP: AFTER_REMAP
"#,
    );
    let collector = Collector::new(m, registry_with("inmem", billing_data(), false));
    let entries = collector.collect().await.unwrap();

    let keys: Vec<&str> = entries.iter().map(|e| e.key.as_str()).collect();
    assert!(keys.contains(&"AFTER_REMAP"));
    assert!(!keys.contains(&"prod/billing/BEFORE_REMAP"));
    // Entries not in the remap table keep their original keys.
    assert!(keys.contains(&"prod/billing/FOO"));
    assert!(keys.contains(&"prod/billing/MG_KEY"));
}

#[tokio::test]
async fn remap_with_overrides_severity_and_marker() {
    let m = manifest(
        r#"
opts:
  stage: prod
providers:
  inmem:
    sync:
      location: "{{stage}}/billing"
      remap_with:
        prod/billing/FOO:
          rename: FOO
          severity: none
          redact_with: "<scrubbed>"
"#,
    );
    let collector = Collector::new(m, registry_with("inmem", billing_data(), false));
    let entries = collector.collect().await.unwrap();

    let foo = entries.iter().find(|e| e.key == "FOO").unwrap();
    assert_eq!(foo.severity, Severity::None);
    assert_eq!(foo.redact_with, "<scrubbed>");
    let other = entries.iter().find(|e| e.key == "prod/billing/MG_KEY").unwrap();
    assert_eq!(other.severity, Severity::High);
    assert_eq!(other.redact_with, "**REDACTED**");
}

#[tokio::test]
async fn named_keys_inject_the_map_key_as_logical_name() {
    let m = manifest(
        r#"
opts:
  stage: prod
providers:
  inmem:
    entries:
      MG_KEY:
        location: "{{stage}}/billing/MG_KEY"
        severity: medium
        sink: billing
"#,
    );
    let collector = Collector::new(m, registry_with("inmem", billing_data(), false));
    let entries = collector.collect().await.unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].key, "MG_KEY");
    assert_eq!(entries[0].value, "mg_shazam");
    assert_eq!(entries[0].resolved_location, "prod/billing/MG_KEY");
    assert_eq!(entries[0].severity, Severity::Medium);
    assert_eq!(entries[0].sink.as_deref(), Some("billing"));
}

#[tokio::test]
async fn missing_named_key_aborts_the_pass() {
    let m = manifest(
        r#"
providers:
  inmem:
    entries:
      NOPE:
        location: prod/billing/NOPE
"#,
    );
    let collector = Collector::new(m, registry_with("inmem", billing_data(), false));
    let err = collector.collect().await.unwrap_err();
    assert!(matches!(
        err,
        CollectError::Provider(ProviderError::NotFound { .. })
    ));
}

#[tokio::test]
async fn optional_named_key_is_omitted_when_missing() {
    let m = manifest(
        r#"
providers:
  inmem:
    entries:
      NOPE:
        location: prod/billing/NOPE
        optional: true
      MG_KEY:
        location: prod/billing/MG_KEY
"#,
    );
    let collector = Collector::new(m, registry_with("inmem", billing_data(), false));
    let entries = collector.collect().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].key, "MG_KEY");
}

#[tokio::test]
async fn optional_named_key_swallows_lookup_failures() {
    let m = manifest(
        r#"
providers:
  inmem:
    entries:
      ANY:
        location: prod/billing/MG_KEY
        optional: true
"#,
    );
    let collector = Collector::new(m, registry_with("inmem", billing_data(), true));
    let entries = collector.collect().await.unwrap();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn backend_failure_discards_partial_results() {
    let mut registry = registry_with("good", billing_data(), false);
    registry.register("bad", || {
        Ok(Arc::new(MapProvider {
            name: "bad",
            data: BTreeMap::new(),
            fail: true,
        }) as Arc<dyn Provider>)
    });
    let m = manifest(
        r#"
providers:
  bad:
    sync:
      location: prod/billing
  good:
    sync:
      location: prod/billing
"#,
    );
    let collector = Collector::new(m, registry);
    let err = collector.collect().await.unwrap_err();
    assert!(matches!(
        err,
        CollectError::Provider(ProviderError::Unavailable { .. })
    ));
}

#[tokio::test]
async fn kind_aliases_an_instance_to_a_registered_type() {
    let m = manifest(
        r#"
opts:
  stage: prod
providers:
  billing_store:
    kind: inmem
    sync:
      location: "{{stage}}/billing"
"#,
    );
    let collector = Collector::new(m, registry_with("inmem", billing_data(), false));
    let entries = collector.collect().await.unwrap();
    assert_eq!(entries.len(), 3);
    // Entries are stamped with the instance name, not the aliased kind.
    assert!(entries.iter().all(|e| e.provider_name == "billing_store"));
}

#[tokio::test]
async fn unresolved_location_fails_before_the_backend_call() {
    let m = manifest(
        r#"
providers:
  inmem:
    sync:
      location: "{{stage}}/billing"
"#,
    );
    let collector = Collector::new(m, registry_with("inmem", billing_data(), false));
    let err = collector.collect().await.unwrap_err();
    match err {
        CollectError::UnresolvedLocation { provider, location } => {
            assert_eq!(provider, "inmem");
            assert_eq!(location, "{{stage}}/billing");
        }
        other => panic!("expected UnresolvedLocation, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_instance_and_unknown_kind_are_errors() {
    let collector = Collector::new(
        manifest("providers:\n  ghost:\n    sync:\n      location: a\n"),
        ProviderRegistry::new(),
    );
    let err = collector.collect_provider("ghost").await.unwrap_err();
    assert!(matches!(
        err,
        CollectError::Provider(ProviderError::UnknownProvider(_))
    ));

    let err = collector.collect_provider("undeclared").await.unwrap_err();
    assert!(matches!(err, CollectError::UnknownInstance(_)));
}
