#![forbid(unsafe_code)]

//! Concrete backend adapters for `purser-core`.
//!
//! Each adapter is a thin call-through to one store; all policy (remap,
//! severity, redaction markers, fail-fast) lives in the core pipeline.

pub mod dotenv;
pub mod inmemory;
pub mod json_file;
pub mod process_env;
pub mod vault;

pub use crate::dotenv::Dotenv;
pub use crate::inmemory::InMemory;
pub use crate::json_file::JsonFile;
pub use crate::process_env::ProcessEnv;
pub use crate::vault::HashicorpVault;

use std::sync::Arc;

use purser_core::{Provider, ProviderRegistry};

/// Registry with every built-in adapter type. Builders are lazy: an
/// adapter that configures itself from the environment (vault) only fails
/// when an instance of it is actually requested.
pub fn default_registry() -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    registry.register("process_env", || {
        Ok(Arc::new(ProcessEnv::new()) as Arc<dyn Provider>)
    });
    registry.register("dotenv", || Ok(Arc::new(Dotenv::new()) as Arc<dyn Provider>));
    registry.register("json_file", || {
        Ok(Arc::new(JsonFile::new()) as Arc<dyn Provider>)
    });
    registry.register("hashicorp_vault", || {
        Ok(Arc::new(HashicorpVault::from_env()?) as Arc<dyn Provider>)
    });
    registry
}
