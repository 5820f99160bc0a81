use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::types::SecretEntry;

/// Shell-sourceable `export` lines. Values are single-quoted with the
/// POSIX `'"'"'` escape for embedded quotes.
pub fn to_env(entries: &[SecretEntry]) -> String {
    let mut out = String::from("#!/bin/sh\n");
    for entry in entries {
        let value = entry.value.replace('\'', "'\"'\"'");
        let _ = writeln!(out, "export {}='{}'", entry.key, value);
    }
    out
}

/// Plain `KEY=VALUE` lines, compatible with dotenv files and Docker
/// `--env-file`.
pub fn to_dotenv(entries: &[SecretEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        let _ = writeln!(out, "{}={}", entry.key, entry.value);
    }
    out
}

pub fn to_yaml(entries: &[SecretEntry]) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(&value_map(entries))
}

pub fn to_json(entries: &[SecretEntry]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&value_map(entries))
}

fn value_map(entries: &[SecretEntry]) -> BTreeMap<&str, &str> {
    entries
        .iter()
        .map(|e| (e.key.as_str(), e.value.as_str()))
        .collect()
}
