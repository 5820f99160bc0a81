use purser_core::{masked, sort_by_provider};

use crate::args::{ConfigArgs, OutputArgs};
use crate::exit_codes;
use crate::output::{print_error, print_result, OutputFormat};
use crate::utils::{load_collector, EntryView};

pub async fn show_cmd(config: ConfigArgs, output: OutputArgs) -> i32 {
    let collector = match load_collector(&config.config) {
        Ok(c) => c,
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            return exit_codes::CONFIG_ERROR;
        }
    };
    let mut entries = match collector.collect().await {
        Ok(entries) => entries,
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            return exit_codes::COLLECT_FAILED;
        }
    };
    sort_by_provider(&mut entries);

    if output.format == OutputFormat::Text && !output.quiet {
        let project = collector.manifest().project.as_deref().unwrap_or("-");
        println!(
            "purser: loaded {} variables for {} from {}\n",
            entries.len(),
            project,
            config.config.display()
        );
        for entry in &entries {
            println!(
                "[{} {}] {} = {}",
                entry.provider_name,
                entry.resolved_location,
                entry.key,
                masked(&entry.value)
            );
        }
    } else {
        let views: Vec<EntryView> = entries.iter().map(EntryView::from_entry).collect();
        print_result(output.format, output.quiet, &views);
    }
    exit_codes::SUCCESS
}
