use std::path::PathBuf;

use clap::Subcommand;

use crate::args::*;
use crate::cmd::export::ExportFormat;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Execute a command with collected secrets in its environment.
    Run {
        #[arg(trailing_var_arg = true, required = true)]
        cmd: Vec<String>,
        /// Scrub secret values from the child's stdout and stderr.
        #[arg(long)]
        redact: bool,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// List collected entries with masked values.
    Show {
        #[command(flatten)]
        config: ConfigArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Render collected entries in a machine-consumable format.
    Export {
        #[arg(value_enum, default_value_t = ExportFormat::Env)]
        format: ExportFormat,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Compare tagged entries within one collection pass.
    Drift {
        /// Restrict the comparison to these backend instances.
        providers: Vec<String>,
        #[command(flatten)]
        config: ConfigArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Compare two backend instances key by key; the source side is the
    /// reference.
    MirrorDrift {
        #[arg(long)]
        source: String,
        #[arg(long)]
        target: String,
        #[command(flatten)]
        config: ConfigArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Scrub known secret values out of a stream or file.
    Redact {
        /// Input file; stdin when omitted.
        #[arg(long, value_name = "FILE")]
        input: Option<PathBuf>,
        /// Output file; stdout when omitted.
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Write values through to backend instances.
    Put {
        #[arg(value_name = "KEY=VALUE", required = true)]
        kvs: Vec<String>,
        #[arg(long = "providers", required = true)]
        providers: Vec<String>,
        /// Write to this literal location instead of the mapped one.
        #[arg(long)]
        path: Option<String>,
        /// Write the whole map to each instance's sync location.
        #[arg(long)]
        sync: bool,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Delete keys from backend instances.
    Delete {
        keys: Vec<String>,
        #[arg(long = "providers", required = true)]
        providers: Vec<String>,
        /// Delete at this literal location instead of the mapped one.
        #[arg(long)]
        path: Option<String>,
        /// With --path, delete everything beneath it.
        #[arg(long)]
        all_keys: bool,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Re-collect one instance and write its entries to others.
    Copy {
        #[arg(long)]
        from: String,
        #[arg(long = "to", required = true)]
        to: Vec<String>,
        /// Write to each target's sync location as one map.
        #[arg(long)]
        sync: bool,
        #[command(flatten)]
        config: ConfigArgs,
    },
}
