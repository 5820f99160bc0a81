use purser_core::SecretRef;

use crate::args::ConfigArgs;
use crate::exit_codes;
use crate::utils::load_collector;

pub async fn delete_cmd(
    keys: &[String],
    providers: &[String],
    path: Option<&str>,
    all_keys: bool,
    config: ConfigArgs,
) -> i32 {
    let wipe_path = match (all_keys, path) {
        (true, Some(path)) => Some(path),
        (true, None) => {
            eprintln!("error: --all-keys requires --path");
            return exit_codes::CONFIG_ERROR;
        }
        (false, _) => None,
    };
    if keys.is_empty() && !all_keys {
        eprintln!("error: at least one key is expected (or --all-keys with --path)");
        return exit_codes::CONFIG_ERROR;
    }
    let collector = match load_collector(&config.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return exit_codes::CONFIG_ERROR;
        }
    };

    for name in providers {
        let Some(spec) = collector.manifest().providers.get(name) else {
            eprintln!("error: instance `{name}` is not declared in the manifest");
            return exit_codes::CONFIG_ERROR;
        };
        let provider = match collector.provider(name) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("error: {e}");
                return exit_codes::RUNTIME_ERROR;
            }
        };

        if let Some(path) = wipe_path {
            let reference = SecretRef {
                location: path.to_string(),
                ..SecretRef::default()
            };
            if let Err(e) = provider.delete_all(&reference).await {
                eprintln!("error: cannot delete {} in {name}: {e}", reference.location);
                return exit_codes::RUNTIME_ERROR;
            }
            println!("deleted {} in {name}: OK", reference.location);
            continue;
        }

        for key in keys {
            let reference = match path {
                Some(path) => SecretRef {
                    key: key.clone(),
                    location: path.to_string(),
                    ..SecretRef::default()
                },
                None => {
                    let Some(mapped) = spec.entries.as_ref().and_then(|m| m.get(key)) else {
                        println!("delete {key} in {name}: no such key in mapping");
                        continue;
                    };
                    mapped.with_key(key)
                }
            };
            let resolved = match collector.resolve_checked(name, &reference) {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("error: {e}");
                    return exit_codes::RUNTIME_ERROR;
                }
            };
            if let Err(e) = provider.delete(&resolved).await {
                eprintln!("error: cannot delete {key} in {name}: {e}");
                return exit_codes::RUNTIME_ERROR;
            }
            println!("deleted {key} ({}) in {name}: OK", resolved.location);
        }
    }
    exit_codes::SUCCESS
}
