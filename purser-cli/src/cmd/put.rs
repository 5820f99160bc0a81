use std::collections::BTreeMap;

use purser_core::{Collector, SecretRef};

use crate::args::ConfigArgs;
use crate::exit_codes;
use crate::utils::{load_collector, parse_kv_pairs};

pub async fn put_cmd(
    kvs: &[String],
    providers: &[String],
    path: Option<&str>,
    sync: bool,
    config: ConfigArgs,
) -> i32 {
    let kvs = match parse_kv_pairs(kvs) {
        Ok(kvs) => kvs,
        Err(e) => {
            eprintln!("error: {e}");
            return exit_codes::CONFIG_ERROR;
        }
    };
    let collector = match load_collector(&config.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return exit_codes::CONFIG_ERROR;
        }
    };
    match write_through(&collector, &kvs, providers, path, sync).await {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            exit_codes::RUNTIME_ERROR
        }
    }
}

/// Pass-through write path shared by `put` and `copy`. Keys are mapped
/// through each instance's `entries` table unless a direct path or sync
/// mode short-circuits the mapping.
pub(crate) async fn write_through(
    collector: &Collector,
    kvs: &BTreeMap<String, String>,
    providers: &[String],
    direct_path: Option<&str>,
    sync: bool,
) -> Result<(), String> {
    for name in providers {
        let spec = collector
            .manifest()
            .providers
            .get(name)
            .ok_or_else(|| format!("instance `{name}` is not declared in the manifest"))?;
        let provider = collector.provider(name).map_err(|e| e.to_string())?;

        if sync {
            let sync_ref = spec
                .sync
                .as_ref()
                .ok_or_else(|| format!("instance `{name}` has no sync reference"))?;
            let resolved = collector
                .resolve_checked(name, sync_ref)
                .map_err(|e| e.to_string())?;
            provider
                .put_all(&resolved, kvs)
                .await
                .map_err(|e| e.to_string())?;
            println!("synced {name} ({}): OK", resolved.location);
            continue;
        }

        if let Some(path) = direct_path {
            for (key, value) in kvs {
                let reference = SecretRef {
                    key: key.clone(),
                    location: path.to_string(),
                    ..SecretRef::default()
                };
                provider
                    .put(&reference, value)
                    .await
                    .map_err(|e| e.to_string())?;
                println!("put {key} ({path}) in {name}: OK");
            }
            continue;
        }

        let mapped = spec
            .entries
            .as_ref()
            .ok_or_else(|| format!("instance `{name}` has no key mapping to write through"))?;
        for (key, value) in kvs {
            let Some(reference) = mapped.get(key) else {
                println!("put {key} in {name}: no such key in mapping");
                continue;
            };
            let resolved = collector
                .resolve_checked(name, &reference.with_key(key))
                .map_err(|e| e.to_string())?;
            provider
                .put(&resolved, value)
                .await
                .map_err(|e| e.to_string())?;
            println!("put {key} ({}) in {name}: OK", resolved.location);
        }
    }
    Ok(())
}
