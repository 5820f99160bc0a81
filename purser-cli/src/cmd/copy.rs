use std::collections::BTreeMap;

use crate::args::ConfigArgs;
use crate::cmd::put::write_through;
use crate::exit_codes;
use crate::utils::load_collector;

/// Re-collects one instance and writes its entries through to the target
/// instances; a thin composition of collection and the put path.
pub async fn copy_cmd(from: &str, to: &[String], sync: bool, config: ConfigArgs) -> i32 {
    let collector = match load_collector(&config.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return exit_codes::CONFIG_ERROR;
        }
    };
    let entries = match collector.collect_provider(from).await {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("error: {e}");
            return exit_codes::COLLECT_FAILED;
        }
    };

    let kvs: BTreeMap<String, String> = entries
        .into_iter()
        .map(|e| (e.key, e.value))
        .collect();
    match write_through(&collector, &kvs, to, None, sync).await {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            exit_codes::RUNTIME_ERROR
        }
    }
}
