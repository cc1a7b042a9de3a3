//! Command-line interface module

use clap::Parser;
use console::style;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::build::{BuildConfig, PathMapping, ToolCommand};
use crate::error::{DispatchError, DispatchResult, ManifestError};

/// Manifest filename looked up in the current directory when no mapping
/// source is given on the command line
pub const DEFAULT_MANIFEST: &str = "tailbuild.json";

/// Main CLI arguments
#[derive(Parser, Debug, Clone)]
#[command(name = "tailbuild")]
#[command(about = "Dispatch Tailwind CSS builds over a set of stylesheet path mappings")]
#[command(version = "0.1.0")]
#[command(long_about = None)]
pub struct Args {
    /// Mapping manifest path (default: tailbuild.json in the current directory)
    #[arg()]
    pub manifest: Option<PathBuf>,

    /// Single source stylesheet, bypassing the manifest
    #[arg(short, long, requires = "output", conflicts_with = "manifest")]
    pub input: Option<PathBuf>,

    /// Destination stylesheet for --input
    #[arg(short, long, requires = "input")]
    pub output: Option<PathBuf>,

    /// External compiler command
    #[arg(long, default_value = "npx @tailwindcss/cli")]
    pub tool: String,

    /// Extra argument passed through to the tool after -i/-o (repeatable)
    #[arg(long = "tool-arg", allow_hyphen_values = true)]
    pub tool_args: Vec<String>,

    /// Base directory anchoring relative mapping paths
    /// (default: the manifest's directory)
    #[arg(long)]
    pub base_dir: Option<PathBuf>,

    /// Recurse into subdirectories when a mapping source is a directory
    #[arg(long)]
    pub recursive: bool,

    /// Maximum time per tool invocation in seconds (default: 300)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Abort on the first failed entry instead of continuing
    #[arg(long)]
    pub fail_fast: bool,

    /// Validate the mapping and print the plan without running the tool
    #[arg(long)]
    pub dry_run: bool,

    /// Output build statistics after the run
    #[arg(long)]
    pub stats: bool,

    /// Enable verbose logging
    #[arg(long)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(long)]
    pub quiet: bool,
}

/// Where the mapping comes from for this run
#[derive(Debug, Clone)]
enum MappingSource {
    Manifest(PathBuf),
    Pair { input: PathBuf, output: PathBuf },
}

/// CLI configuration
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub args: Args,
    pub build_config: BuildConfig,
    mapping_source: MappingSource,
}

impl CliConfig {
    /// Create CLI configuration from arguments
    pub fn from_args(args: Args) -> DispatchResult<Self> {
        let mapping_source = Self::resolve_mapping_source(&args)?;
        let build_config = Self::create_build_config(&args, &mapping_source)?;

        Ok(Self {
            args,
            build_config,
            mapping_source,
        })
    }

    /// Load the mapping from the resolved source
    pub fn load_mapping(&self) -> DispatchResult<PathMapping> {
        let mapping = match &self.mapping_source {
            MappingSource::Manifest(path) => PathMapping::from_manifest(path)?,
            MappingSource::Pair { input, output } => {
                PathMapping::single(input.clone(), output.clone())?
            }
        };
        Ok(mapping)
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.args.quiet
    }

    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.args.verbose
    }

    /// Check if stats output is requested
    pub fn want_stats(&self) -> bool {
        self.args.stats
    }

    /// Check if only a plan is requested
    pub fn is_dry_run(&self) -> bool {
        self.args.dry_run
    }

    fn resolve_mapping_source(args: &Args) -> DispatchResult<MappingSource> {
        if let (Some(input), Some(output)) = (&args.input, &args.output) {
            return Ok(MappingSource::Pair {
                input: input.clone(),
                output: output.clone(),
            });
        }

        let manifest = match &args.manifest {
            Some(path) => path.clone(),
            None => PathBuf::from(DEFAULT_MANIFEST),
        };

        if !manifest.is_file() {
            return Err(ManifestError::new(format!(
                "no mapping provided: '{}' does not exist; pass a manifest path or use --input/--output",
                manifest.display()
            ))
            .into());
        }

        Ok(MappingSource::Manifest(manifest))
    }

    fn create_build_config(
        args: &Args,
        mapping_source: &MappingSource,
    ) -> DispatchResult<BuildConfig> {
        let tool = ToolCommand::parse(&args.tool)
            .map_err(DispatchError::configuration)?;

        // Anchor: explicit flag, else the manifest's directory, else cwd
        let base_dir = match (&args.base_dir, mapping_source) {
            (Some(dir), _) => dir.clone(),
            (None, MappingSource::Manifest(path)) => match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            },
            (None, MappingSource::Pair { .. }) => PathBuf::from("."),
        };
        let base_dir = base_dir
            .canonicalize()
            .map_err(|source| DispatchError::PathResolution {
                path: base_dir.clone(),
                source,
            })?;

        let mut config = BuildConfig::default()
            .with_tool(tool)
            .with_base_dir(base_dir)
            .with_fail_fast(args.fail_fast)
            .with_recursive(args.recursive);
        if let Some(secs) = args.timeout {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config.tool_args = args.tool_args.clone();

        config
            .validate()
            .map_err(DispatchError::configuration)?;

        Ok(config)
    }
}

/// CLI utilities and helpers
pub struct CliUtils;

impl CliUtils {
    /// Format a duration in human-readable format
    pub fn format_duration(duration: Duration) -> String {
        let total_millis = duration.as_millis();

        if total_millis < 1000 {
            format!("{}ms", total_millis)
        } else if total_millis < 60_000 {
            format!("{:.1}s", total_millis as f64 / 1000.0)
        } else {
            let minutes = total_millis / 60_000;
            let seconds = (total_millis % 60_000) / 1000;
            format!("{}m {}s", minutes, seconds)
        }
    }

    /// Create a progress bar for batch dispatch
    pub fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
        let pb = indicatif::ProgressBar::new(total);
        pb.set_style(
            indicatif::ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );
        pb
    }

    /// Render an error line with the ✗ marker
    pub fn error_line(message: &str) -> String {
        if Self::should_use_color() {
            format!("{} {}", style("✗").red(), message)
        } else {
            format!("✗ {}", message)
        }
    }

    /// Show an error message
    pub fn show_error(message: &str) {
        eprintln!("{}", Self::error_line(message));
    }

    /// Show a warning message (if not in quiet mode)
    pub fn show_warning(message: &str, quiet: bool) {
        if quiet {
            return;
        }
        if Self::should_use_color() {
            eprintln!("{} {}", style("⚠").yellow(), message);
        } else {
            eprintln!("⚠ {}", message);
        }
    }

    /// Check if output should be colored
    pub fn should_use_color() -> bool {
        // Check if stderr is a terminal and supports color
        atty::is(atty::Stream::Stderr) && std::env::var("NO_COLOR").is_err()
    }

    /// The last few non-empty diagnostic lines, trimmed to terminal width
    pub fn stderr_excerpt(stderr: &str, max_lines: usize) -> Vec<String> {
        let width = Self::terminal_width().saturating_sub(2).max(20);
        Self::excerpt_with_width(stderr, max_lines, width)
    }

    fn excerpt_with_width(stderr: &str, max_lines: usize, width: usize) -> Vec<String> {
        let lines: Vec<&str> = stderr
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .collect();

        lines
            .iter()
            .skip(lines.len().saturating_sub(max_lines))
            .map(|line| {
                if line.chars().count() > width {
                    let truncated: String = line.chars().take(width).collect();
                    format!("{}...", truncated)
                } else {
                    line.to_string()
                }
            })
            .collect()
    }

    fn terminal_width() -> usize {
        terminal_size::terminal_size()
            .map(|(width, _)| width.0 as usize)
            .unwrap_or(80)
    }
}

/// Handle fatal CLI errors with user-friendly messages
pub fn handle_error(error: &DispatchError) {
    CliUtils::show_error(&error.user_message());

    // Provide helpful suggestions
    match error {
        DispatchError::Manifest(_) => {
            eprintln!("\nTip: pass a manifest path, or use --input/--output for a single build");
        }
        DispatchError::Build(crate::error::BuildError::ToolNotFound { .. }) => {
            eprintln!("\nTip: install the compiler, or point --tool at an existing command");
        }
        DispatchError::Build(crate::error::BuildError::Timeout { .. }) => {
            eprintln!("\nTip: use --timeout to increase the per-invocation time limit");
        }
        _ => {}
    }

    // Show usage hint
    eprintln!("\nTry 'tailbuild --help' for usage information.");
}

/// Dry-run plan rendering for one entry
pub fn plan_line(source: &Path, destination: &Path) -> String {
    format!("{} -> {}", source.display(), destination.display())
}
