use std::path::PathBuf;

use clap::Args;

use crate::output::OutputFormat;

#[derive(Debug, Args, Clone)]
pub struct ConfigArgs {
    /// Manifest describing options and backend instances.
    #[arg(long, short, default_value = ".purser.yml")]
    pub config: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    #[arg(long, short)]
    pub quiet: bool,
}
