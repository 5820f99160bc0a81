use crate::args::{ConfigArgs, OutputArgs};
use crate::cmd::drift::report;
use crate::exit_codes;
use crate::output::print_error;
use crate::utils::load_collector;

pub async fn mirror_drift_cmd(
    source: &str,
    target: &str,
    config: ConfigArgs,
    output: OutputArgs,
) -> i32 {
    let collector = match load_collector(&config.config) {
        Ok(c) => c,
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            return exit_codes::CONFIG_ERROR;
        }
    };
    let drifts = match collector.mirror_drift(source, target).await {
        Ok(drifts) => drifts,
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            return exit_codes::COLLECT_FAILED;
        }
    };

    report(&drifts, &output);
    if drifts.is_empty() {
        exit_codes::SUCCESS
    } else {
        exit_codes::DRIFT_DETECTED
    }
}
