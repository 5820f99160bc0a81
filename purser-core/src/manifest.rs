use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::SecretRef;

/// One backend instance in the manifest: a namespace-sync reference, a
/// named-keys map, or both (sync is collected first). `kind` aliases the
/// instance to a registered backend type when the instance name itself is
/// not one, so several differently-configured instances of one type can
/// coexist under distinct names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync: Option<SecretRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entries: Option<BTreeMap<String, SecretRef>>,
}

/// The root declarative mapping document, usually `.purser.yml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub opts: BTreeMap<String, String>,
    #[serde(default)]
    pub carry_env: bool,
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderSpec>,
}

impl Manifest {
    pub fn parse(s: &str) -> Result<Self, ManifestError> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content)
    }

    /// The option map fed to the resolver; `project` is exposed as the
    /// `{{project}}` placeholder.
    pub fn options(&self) -> BTreeMap<String, String> {
        let mut opts = self.opts.clone();
        if let Some(project) = &self.project {
            opts.insert("project".to_string(), project.clone());
        }
        opts
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to read manifest {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse manifest as YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
