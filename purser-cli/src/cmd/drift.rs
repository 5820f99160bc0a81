use crate::args::{ConfigArgs, OutputArgs};
use crate::exit_codes;
use crate::output::{print_error, print_result, OutputFormat};
use crate::utils::{format_drift_line, load_collector, DriftView};

pub async fn drift_cmd(providers: &[String], config: ConfigArgs, output: OutputArgs) -> i32 {
    let collector = match load_collector(&config.config) {
        Ok(c) => c,
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            return exit_codes::CONFIG_ERROR;
        }
    };
    let entries = match collector.collect().await {
        Ok(entries) => entries,
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            return exit_codes::COLLECT_FAILED;
        }
    };

    let drifts = purser_core::drift(&entries, providers);
    report(&drifts, &output);
    if drifts.is_empty() {
        exit_codes::SUCCESS
    } else {
        exit_codes::DRIFT_DETECTED
    }
}

pub fn report(drifts: &[purser_core::DriftedEntry], output: &OutputArgs) {
    if output.format == OutputFormat::Text && !output.quiet {
        if drifts.is_empty() {
            println!("no drift detected");
        } else {
            println!("drifts detected: {}\n", drifts.len());
            for drift in drifts {
                println!("{}", format_drift_line(drift));
            }
        }
    } else {
        let views: Vec<DriftView> = drifts.iter().map(DriftView::from_drift).collect();
        print_result(output.format, output.quiet, &views);
    }
}
