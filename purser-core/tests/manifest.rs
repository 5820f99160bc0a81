use purser_core::{Manifest, ManifestError, Severity};

const FULL: &str = r#"
project: billing
carry_env: true
opts:
  stage: env:BILLING_STAGE,dev
  region: eu-1
providers:
  hashicorp_vault:
    sync:
      location: "secret/data/{{stage}}/billing"
      source: vault
      remap_with:
        SMTP_PASS:
          rename: MAIL_PASS
          severity: medium
  dotenv_local:
    kind: dotenv
    entries:
      MG_KEY:
        location: "~/.env/{{project}}.env"
        field: MAILGUN_KEY
        optional: true
        severity: low
        redact_with: "<mg>"
        sink: vault
"#;

#[test]
fn parses_the_documented_shape() {
    let m = Manifest::parse(FULL).unwrap();
    assert_eq!(m.project.as_deref(), Some("billing"));
    assert!(m.carry_env);
    assert_eq!(m.opts["region"], "eu-1");
    assert_eq!(m.providers.len(), 2);

    let vault = &m.providers["hashicorp_vault"];
    assert!(vault.kind.is_none());
    let sync = vault.sync.as_ref().unwrap();
    assert_eq!(sync.location, "secret/data/{{stage}}/billing");
    assert_eq!(sync.source.as_deref(), Some("vault"));
    let rule = &sync.remap_with.as_ref().unwrap()["SMTP_PASS"];
    assert_eq!(rule.rename.as_deref(), Some("MAIL_PASS"));
    assert_eq!(rule.severity, Some(Severity::Medium));
    assert_eq!(rule.redact_with, None);

    let dotenv = &m.providers["dotenv_local"];
    assert_eq!(dotenv.kind.as_deref(), Some("dotenv"));
    let mg = &dotenv.entries.as_ref().unwrap()["MG_KEY"];
    assert_eq!(mg.field.as_deref(), Some("MAILGUN_KEY"));
    assert!(mg.optional);
    assert_eq!(mg.severity, Some(Severity::Low));
    assert_eq!(mg.redact_with.as_deref(), Some("<mg>"));
    assert_eq!(mg.sink.as_deref(), Some("vault"));
}

#[test]
fn project_is_exposed_as_an_option() {
    let m = Manifest::parse(FULL).unwrap();
    let opts = m.options();
    assert_eq!(opts["project"], "billing");
    assert_eq!(opts["region"], "eu-1");
}

#[test]
fn empty_document_yields_defaults() {
    let m = Manifest::parse("{}").unwrap();
    assert!(m.project.is_none());
    assert!(!m.carry_env);
    assert!(m.providers.is_empty());
    assert!(m.options().is_empty());
}

#[test]
fn malformed_yaml_is_a_parse_error() {
    let err = Manifest::parse("providers: [not, a, map]").unwrap_err();
    assert!(matches!(err, ManifestError::Yaml(_)));
}

#[test]
fn missing_file_is_an_io_error() {
    let err = Manifest::from_path(std::path::Path::new("/nonexistent/.purser.yml")).unwrap_err();
    assert!(matches!(err, ManifestError::Io { .. }));
}
