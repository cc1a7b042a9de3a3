//! Sequential dispatch of mapping entries to the external compiler

use std::time::{Duration, Instant};

use indicatif::ProgressBar;

use crate::build::config::BuildConfig;
use crate::build::mapping::MappingEntry;
use crate::build::runner::ToolRunner;
use crate::build::stats::BuildStatistics;
use crate::cli::CliUtils;
use crate::error::{BuildError, BuildResult};

/// Result of one attempted mapping entry
#[derive(Debug)]
pub struct EntryOutcome {
    pub entry: MappingEntry,
    pub result: BuildResult<()>,
    pub duration: Duration,
}

/// Outcomes and aggregate statistics for one dispatch run
#[derive(Debug)]
pub struct BuildReport {
    pub outcomes: Vec<EntryOutcome>,
    pub stats: BuildStatistics,
}

impl BuildReport {
    /// True when every attempted entry succeeded
    pub fn succeeded(&self) -> bool {
        self.stats.failed == 0
    }

    pub fn failed_count(&self) -> usize {
        self.stats.failed
    }
}

/// Runs mapping entries strictly in order, one blocking invocation at a
/// time, so later entries can rely on earlier outputs.
pub struct Dispatcher {
    runner: ToolRunner,
    fail_fast: bool,
    quiet: bool,
    verbose: bool,
}

impl Dispatcher {
    pub fn new(config: &BuildConfig, quiet: bool, verbose: bool) -> Self {
        Self {
            runner: ToolRunner::new(config),
            fail_fast: config.fail_fast,
            quiet,
            verbose,
        }
    }

    /// Dispatch every entry in order.
    ///
    /// Failures are reported as they happen and recorded in the report;
    /// remaining entries still run unless fail-fast is set.
    pub fn dispatch(&self, entries: &[MappingEntry]) -> BuildReport {
        let progress = self.progress_bar(entries.len());
        let mut outcomes = Vec::with_capacity(entries.len());

        for entry in entries {
            if self.verbose && !self.quiet {
                self.emit(&progress, &format!("$ {}", self.runner.command_line(entry)));
            }

            let started = Instant::now();
            let result = self.runner.run(entry);
            let duration = started.elapsed();

            match &result {
                Ok(output) => {
                    if !self.quiet {
                        self.emit(
                            &progress,
                            &format!("{} -> {}", entry.source.display(), entry.destination.display()),
                        );
                    }
                    if self.verbose && !output.stderr.trim().is_empty() {
                        self.emit(&progress, output.stderr.trim_end());
                    }
                }
                Err(err) => self.report_failure(&progress, entry, err),
            }

            let failed = result.is_err();
            outcomes.push(EntryOutcome {
                entry: entry.clone(),
                result: result.map(|_| ()),
                duration,
            });

            if let Some(pb) = &progress {
                pb.inc(1);
            }

            if failed && self.fail_fast {
                break;
            }
        }

        if let Some(pb) = &progress {
            pb.finish_and_clear();
        }

        let stats = BuildStatistics::for_outcomes(self.runner.tool_name(), &outcomes);
        BuildReport { outcomes, stats }
    }

    fn report_failure(&self, progress: &Option<ProgressBar>, entry: &MappingEntry, err: &BuildError) {
        let line = CliUtils::error_line(&format!(
            "{} -> {}: {}",
            entry.source.display(),
            entry.destination.display(),
            err
        ));
        self.emit_err(progress, &line);

        if let Some(stderr) = err.tool_stderr() {
            if self.verbose {
                for line in stderr.trim_end().lines() {
                    self.emit_err(progress, line);
                }
            } else {
                for line in CliUtils::stderr_excerpt(stderr, 4) {
                    self.emit_err(progress, &format!("  {}", line));
                }
            }
        }
    }

    fn emit(&self, progress: &Option<ProgressBar>, line: &str) {
        match progress {
            Some(pb) => pb.println(line),
            None => println!("{}", line),
        }
    }

    fn emit_err(&self, progress: &Option<ProgressBar>, line: &str) {
        match progress {
            Some(pb) => pb.println(line),
            None => eprintln!("{}", line),
        }
    }

    fn progress_bar(&self, total: usize) -> Option<ProgressBar> {
        if self.quiet || total < 2 || !atty::is(atty::Stream::Stderr) {
            return None;
        }
        Some(CliUtils::create_progress_bar(total as u64))
    }
}
