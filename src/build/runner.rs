//! External compiler invocation for single mapping entries

use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::build::config::{BuildConfig, ToolCommand};
use crate::build::mapping::MappingEntry;
use crate::error::{BuildError, BuildResult};

/// Outcome of one successful tool invocation
#[derive(Debug)]
pub struct ToolOutput {
    pub status: ExitStatus,
    pub stderr: String,
    pub duration: Duration,
}

/// Runs the external compiler for one mapping entry at a time.
///
/// The child's working directory is set to the base directory so the
/// mapping's relative paths can be passed to the tool verbatim; the
/// dispatcher's own working directory is never changed.
#[derive(Debug, Clone)]
pub struct ToolRunner {
    tool: ToolCommand,
    base_dir: PathBuf,
    timeout: Duration,
    tool_args: Vec<String>,
}

impl ToolRunner {
    pub fn new(config: &BuildConfig) -> Self {
        Self {
            tool: config.tool.clone(),
            base_dir: config.base_dir.clone(),
            timeout: config.timeout,
            tool_args: config.tool_args.clone(),
        }
    }

    /// The tool command as the user wrote it
    pub fn tool_name(&self) -> String {
        self.tool.display_name()
    }

    /// The full command line for one entry, for verbose logging
    pub fn command_line(&self, entry: &MappingEntry) -> String {
        let mut parts = vec![self.tool.program.clone()];
        parts.extend(self.tool.args.iter().cloned());
        parts.push("-i".to_string());
        parts.push(entry.source.display().to_string());
        parts.push("-o".to_string());
        parts.push(entry.destination.display().to_string());
        parts.extend(self.tool_args.iter().cloned());
        parts.join(" ")
    }

    /// Invoke the tool for one entry and block until it terminates.
    ///
    /// Classifies launch failures, non-zero exits, and deadline overruns;
    /// a success still carries the captured stderr for verbose output.
    pub fn run(&self, entry: &MappingEntry) -> BuildResult<ToolOutput> {
        let source_abs = self.base_dir.join(&entry.source);
        if !source_abs.is_file() {
            return Err(BuildError::MissingSource {
                path: entry.source.clone(),
            });
        }

        let mut command = Command::new(&self.tool.program);
        command
            .args(&self.tool.args)
            .arg("-i")
            .arg(&entry.source)
            .arg("-o")
            .arg(&entry.destination)
            .args(&self.tool_args)
            .current_dir(&self.base_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        let started = Instant::now();
        let mut child = command.spawn().map_err(|source| {
            let tool = self.tool.program.clone();
            match source.kind() {
                std::io::ErrorKind::NotFound => BuildError::ToolNotFound { tool, source },
                _ => BuildError::Launch { tool, source },
            }
        })?;

        // Drain stderr off-thread so a chatty tool cannot fill the pipe and
        // stall while we poll for exit.
        let stderr_reader = child.stderr.take().map(|mut pipe| {
            thread::spawn(move || {
                let mut buffer = String::new();
                let _ = pipe.read_to_string(&mut buffer);
                buffer
            })
        });

        let deadline = started + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        if let Some(reader) = stderr_reader {
                            let _ = reader.join();
                        }
                        return Err(BuildError::Timeout {
                            limit_secs: self.timeout.as_secs(),
                        });
                    }
                    thread::sleep(Duration::from_millis(25));
                }
                Err(source) => {
                    let _ = child.kill();
                    return Err(BuildError::Wait { source });
                }
            }
        };

        let stderr = stderr_reader
            .and_then(|reader| reader.join().ok())
            .unwrap_or_default();
        let duration = started.elapsed();

        if status.success() {
            Ok(ToolOutput {
                status,
                stderr,
                duration,
            })
        } else {
            Err(BuildError::ToolFailed {
                status: status.code(),
                stderr,
            })
        }
    }
}
