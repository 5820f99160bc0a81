use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use purser_core::Redactor;

use crate::args::ConfigArgs;
use crate::exit_codes;
use crate::utils::load_collector;

/// Streams input through the redactor: stdin→stdout by default, or files
/// via `--input`/`--out`.
pub async fn redact_cmd(input: Option<&Path>, out: Option<&Path>, config: ConfigArgs) -> i32 {
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
    let redactor = Redactor::new(&entries);

    match stream(&redactor, input, out) {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            exit_codes::RUNTIME_ERROR
        }
    }
}

fn stream(redactor: &Redactor, input: Option<&Path>, out: Option<&Path>) -> io::Result<()> {
    let mut reader: Box<dyn Read> = match input {
        Some(path) => Box::new(File::open(path)?),
        None => Box::new(io::stdin()),
    };
    let writer: Box<dyn Write> = match out {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout()),
    };
    redactor.redact_stream(&mut reader, writer)
}
