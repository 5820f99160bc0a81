use purser_core::export;

use crate::args::ConfigArgs;
use crate::exit_codes;
use crate::utils::load_collector;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Env,
    Dotenv,
    Yaml,
    Json,
}

/// Prints collected entries to stdout in a machine-consumable format.
/// Output is intentionally unredacted; this is the command that hands
/// values to the next tool in the pipeline.
pub async fn export_cmd(format: ExportFormat, config: ConfigArgs) -> i32 {
    let collector = match load_collector(&config.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return exit_codes::CONFIG_ERROR;
        }
    };
    let entries = match collector.collect().await {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("error: {e}");
            return exit_codes::COLLECT_FAILED;
        }
    };

    let rendered = match format {
        ExportFormat::Env => Ok(export::to_env(&entries)),
        ExportFormat::Dotenv => Ok(export::to_dotenv(&entries)),
        ExportFormat::Yaml => export::to_yaml(&entries).map_err(|e| e.to_string()),
        ExportFormat::Json => export::to_json(&entries).map_err(|e| e.to_string()),
    };
    match rendered {
        Ok(out) => {
            print!("{out}");
            exit_codes::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            exit_codes::RUNTIME_ERROR
        }
    }
}
