use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::types::SecretRef;

const ENV_INDIRECTION_PREFIX: &str = "env:";
const DEFAULT_VALUE_SEPARATOR: char = ',';

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{[^{}]*\}\}").expect("valid regex"));

/// True when the string still carries a `{{...}}` token. Locations must be
/// fully resolved before they reach a backend.
pub fn has_unresolved_placeholders(s: &str) -> bool {
    PLACEHOLDER_RE.is_match(s)
}

/// Expands `{{name}}` tokens against a fixed option map.
///
/// Option values prefixed with `env:` are indirections into the process
/// environment: `env:VAR` or `env:VAR,default`. Placeholders with no
/// corresponding option are left untouched so that locations carrying
/// templating for a later expansion stage survive unchanged.
///
/// Option names must not be substrings of one another; replacement order
/// across options is unspecified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolver {
    opts: BTreeMap<String, String>,
}

impl Resolver {
    pub fn new(opts: BTreeMap<String, String>) -> Self {
        Resolver { opts }
    }

    pub fn resolve(&self, template: &str) -> String {
        let mut resolved = template.to_string();
        for (name, value) in &self.opts {
            let value = match value.strip_prefix(ENV_INDIRECTION_PREFIX) {
                Some(indirection) => {
                    let (var, default) = split_default(indirection);
                    match std::env::var(var) {
                        Ok(v) if !v.is_empty() => v,
                        _ => default.to_string(),
                    }
                }
                None => value.clone(),
            };
            resolved = resolved.replace(&format!("{{{{{name}}}}}"), &value);
        }
        resolved
    }

    /// Copy of `reference` with only `location` resolved; every other field
    /// passes through unmodified.
    pub fn resolve_ref(&self, reference: &SecretRef) -> SecretRef {
        reference.with_location(self.resolve(&reference.location))
    }
}

/// Splits `VAR,default` on the first separator. The default is trimmed;
/// absent default means empty string.
fn split_default(indirection: &str) -> (&str, &str) {
    match indirection.split_once(DEFAULT_VALUE_SEPARATOR) {
        Some((var, default)) => (var, default.trim()),
        None => (indirection, ""),
    }
}
