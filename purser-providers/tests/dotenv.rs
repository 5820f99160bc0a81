use std::collections::BTreeMap;

use purser_core::{Provider, ProviderError, SecretRef};
use purser_providers::Dotenv;

fn reference(location: &str, key: &str) -> SecretRef {
    SecretRef {
        key: key.to_string(),
        location: location.to_string(),
        ..SecretRef::default()
    }
}

#[tokio::test]
async fn get_reads_keys_from_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.env");
    std::fs::write(&path, "FOO=bar\n# a comment\nBAZ=\"quoted\"\n").unwrap();
    let path = path.to_str().unwrap().to_string();

    let provider = Dotenv::new();
    let entry = provider.get(&reference(&path, "FOO")).await.unwrap();
    assert!(entry.found);
    assert_eq!(entry.value, "bar");
    assert_eq!(entry.resolved_location, path);

    let entry = provider.get(&reference(&path, "BAZ")).await.unwrap();
    assert_eq!(entry.value, "quoted");

    let entry = provider.get(&reference(&path, "NOPE")).await.unwrap();
    assert!(!entry.found);
    assert!(entry.value.is_empty());
}

#[tokio::test]
async fn field_wins_over_key_for_lookup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.env");
    std::fs::write(&path, "MAILGUN_KEY=mg_shazam\n").unwrap();

    let mut r = reference(path.to_str().unwrap(), "MG_KEY");
    r.field = Some("MAILGUN_KEY".to_string());
    let entry = Dotenv::new().get(&r).await.unwrap();
    assert!(entry.found);
    assert_eq!(entry.value, "mg_shazam");
    // The entry keeps the logical name; the field only steers the lookup.
    assert_eq!(entry.key, "MG_KEY");
}

#[tokio::test]
async fn missing_file_is_unavailable_on_read() {
    let err = Dotenv::new()
        .get(&reference("/nonexistent/app.env", "FOO"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Unavailable { .. }));
}

#[tokio::test]
async fn put_creates_file_and_parents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deep/nested/app.env");
    let path = path.to_str().unwrap().to_string();

    let provider = Dotenv::new();
    provider.put(&reference(&path, "FOO"), "bar").await.unwrap();
    provider.put(&reference(&path, "BAZ"), "qux").await.unwrap();

    let entries = provider.get_all(&reference(&path, "")).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "BAZ=qux\nFOO=bar\n");
}

#[tokio::test]
async fn put_all_merges_into_existing_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.env");
    std::fs::write(&path, "KEEP=1\nREPLACE=old\n").unwrap();
    let path = path.to_str().unwrap().to_string();

    let mut values = BTreeMap::new();
    values.insert("REPLACE".to_string(), "new".to_string());
    values.insert("ADDED".to_string(), "2".to_string());
    Dotenv::new()
        .put_all(&reference(&path, ""), &values)
        .await
        .unwrap();

    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "ADDED=2\nKEEP=1\nREPLACE=new\n"
    );
}

#[tokio::test]
async fn delete_removes_one_key_and_delete_all_removes_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.env");
    std::fs::write(&path, "A=1\nB=2\n").unwrap();
    let loc = path.to_str().unwrap().to_string();

    let provider = Dotenv::new();
    provider.delete(&reference(&loc, "A")).await.unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "B=2\n");

    provider.delete_all(&reference(&loc, "")).await.unwrap();
    assert!(!path.exists());
    // Deleting an absent file stays quiet.
    provider.delete_all(&reference(&loc, "")).await.unwrap();
}
