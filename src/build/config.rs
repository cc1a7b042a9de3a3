//! Configuration options for build dispatch

use std::path::PathBuf;
use std::time::Duration;

/// External compiler command, split into a program and its leading arguments.
///
/// The default matches the Tailwind CLI as shipped through npm, so `-i`/`-o`
/// land after the package specifier: `npx @tailwindcss/cli -i <src> -o <dst>`.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolCommand {
    /// Parse a whitespace-separated command string
    pub fn parse(command: &str) -> Result<Self, String> {
        let mut parts = command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| "tool command must not be empty".to_string())?;

        Ok(Self {
            program: program.to_string(),
            args: parts.map(str::to_string).collect(),
        })
    }

    /// The command as the user wrote it, for error messages and reports
    pub fn display_name(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

impl Default for ToolCommand {
    fn default() -> Self {
        Self {
            program: "npx".to_string(),
            args: vec!["@tailwindcss/cli".to_string()],
        }
    }
}

/// Build dispatch configuration options
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// External compiler command
    pub tool: ToolCommand,
    /// Directory anchoring every relative mapping path
    pub base_dir: PathBuf,
    /// Maximum wall time per tool invocation
    pub timeout: Duration,
    /// Abort on the first failed entry instead of continuing
    pub fail_fast: bool,
    /// Recurse into subdirectories when expanding directory entries
    pub recursive: bool,
    /// Extra arguments appended after `-i`/`-o` on every invocation
    pub tool_args: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            tool: ToolCommand::default(),
            base_dir: PathBuf::from("."),
            timeout: Duration::from_secs(300), // 5 minutes
            fail_fast: false,
            recursive: false,
            tool_args: Vec::new(),
        }
    }
}

impl BuildConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the external compiler command
    pub fn with_tool(mut self, tool: ToolCommand) -> Self {
        self.tool = tool;
        self
    }

    /// Set the base directory
    pub fn with_base_dir(mut self, base_dir: PathBuf) -> Self {
        self.base_dir = base_dir;
        self
    }

    /// Set the per-invocation timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Abort on the first failed entry
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Recurse into subdirectories when expanding directory entries
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Append a pass-through tool argument
    pub fn with_tool_arg(mut self, arg: String) -> Self {
        self.tool_args.push(arg);
        self
    }

    /// Validate configuration consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.tool.program.is_empty() {
            return Err("tool command must not be empty".to_string());
        }

        if self.timeout.as_secs() == 0 {
            return Err("timeout must be greater than 0".to_string());
        }

        if self.base_dir.as_os_str().is_empty() {
            return Err("base directory must not be empty".to_string());
        }

        Ok(())
    }
}
