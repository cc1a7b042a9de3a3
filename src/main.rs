use clap::Parser;
use std::process::ExitCode;

use tailbuild::build::{BuildStatistics, Dispatcher, MappingEntry};
use tailbuild::cli::{self, Args, CliConfig, CliUtils};
use tailbuild::error::DispatchResult;

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(code) => code,
        Err(err) => {
            cli::handle_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> DispatchResult<ExitCode> {
    let config = CliConfig::from_args(args)?;

    let mapping = config.load_mapping()?;
    for warning in mapping.warnings() {
        CliUtils::show_warning(warning, config.is_quiet());
    }

    let entries = mapping.expand(&config.build_config.base_dir, config.build_config.recursive)?;
    if entries.is_empty() {
        CliUtils::show_warning("mapping is empty; nothing to build", config.is_quiet());
        return Ok(ExitCode::SUCCESS);
    }

    if config.is_dry_run() {
        return dry_run(&config, &entries);
    }

    let dispatcher = Dispatcher::new(&config.build_config, config.is_quiet(), config.is_verbose());
    let report = dispatcher.dispatch(&entries);

    if config.want_stats() {
        print_statistics(&report.stats, config.is_quiet());
    }

    Ok(if report.succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Print the build plan without invoking the tool, flagging entries whose
/// source is missing
fn dry_run(config: &CliConfig, entries: &[MappingEntry]) -> DispatchResult<ExitCode> {
    let base_dir = &config.build_config.base_dir;
    let mut missing = 0usize;

    for entry in entries {
        if base_dir.join(&entry.source).is_file() {
            if !config.is_quiet() {
                println!("{}", cli::plan_line(&entry.source, &entry.destination));
            }
        } else {
            missing += 1;
            CliUtils::show_error(&format!(
                "{}: source file not found: {}",
                cli::plan_line(&entry.source, &entry.destination),
                entry.source.display()
            ));
        }
    }

    if !config.is_quiet() {
        println!(
            "{} entries, {} missing ({})",
            entries.len(),
            missing,
            config.build_config.tool.display_name()
        );
    }

    Ok(if missing == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_statistics(stats: &BuildStatistics, quiet: bool) {
    if quiet {
        return;
    }

    println!("\nBuild Statistics:");
    println!("Tool: {}", stats.tool);
    println!("Entries: {}", stats.entry_count);
    println!("Succeeded: {}", stats.succeeded);
    println!("Failed: {}", stats.failed);
    println!(
        "Total time: {}",
        CliUtils::format_duration(std::time::Duration::from_millis(stats.total_time_ms))
    );
    println!("Average per entry: {:.0}ms", stats.avg_time_per_entry_ms);
}
