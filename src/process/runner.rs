//! Shell command runner with timeout and priority control
//!
//! Every external tool invocation goes through here. A command line may be a
//! pipeline (`sox ... | lame ...`); the whole chain runs in one process group
//! so a timeout takes every stage down together.

use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};

use crate::config::ProcessConfig;
use crate::error::{AudioError, Result};

/// Default timeout for a single invocation (2 hours)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(7200);

/// Default niceness for external tools
pub const DEFAULT_NICE: i32 = 19;

/// Scheduling priority for the spawned command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    /// Run under `nice -n <level>`
    Nice(i32),
    /// Run without a `nice` prefix
    Unadjusted,
}

impl Priority {
    /// Parse the textual form: `"n"` means unadjusted, a number is a niceness
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value == "n" {
            return Some(Priority::Unadjusted);
        }
        value.parse().ok().map(Priority::Nice)
    }

    fn prefix(&self) -> String {
        match self {
            Priority::Nice(level) => format!("nice -n {} ", level),
            Priority::Unadjusted => String::new(),
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Nice(DEFAULT_NICE)
    }
}

/// Per-invocation options
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub timeout: Duration,
    pub priority: Priority,
    /// Collect stderr; when false it is discarded
    pub capture_stderr: bool,
    /// Append `; echo $?` so the exit status is the trailing stdout line
    pub echo_exit_status: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            priority: Priority::default(),
            capture_stderr: true,
            echo_exit_status: true,
        }
    }
}

impl RunOptions {
    pub fn from_config(config: &ProcessConfig) -> Self {
        Self {
            timeout: config.timeout(),
            priority: config
                .niceness()
                .map(Priority::Nice)
                .unwrap_or(Priority::Unadjusted),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Options for quick metadata probes: no `nice`, no exit-status echo
    pub fn probe(mut self) -> Self {
        self.priority = Priority::Unadjusted;
        self.echo_exit_status = false;
        self
    }

    pub fn without_exit_status(mut self) -> Self {
        self.echo_exit_status = false;
        self
    }

    pub fn without_stderr(mut self) -> Self {
        self.capture_stderr = false;
        self
    }
}

/// Captured output of one invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandResult {
    /// Last non-empty stdout line, where the echoed exit status lands
    pub fn last_stdout_line(&self) -> Option<&str> {
        self.stdout.lines().rev().find(|l| !l.trim().is_empty())
    }

    /// stdout followed by stderr, the way tool responses are scanned
    pub fn combined(&self) -> String {
        format!("{}{}", self.stdout, self.stderr)
    }
}

/// Build the shell command line actually executed
pub fn compose_command_line(command: &str, options: &RunOptions) -> String {
    let echo = if options.echo_exit_status { "; echo $?" } else { "" };
    format!("{}{}{}", options.priority.prefix(), command.trim(), echo)
}

/// Runs shell command lines
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    defaults: RunOptions,
}

impl ProcessRunner {
    pub fn new(defaults: RunOptions) -> Self {
        Self { defaults }
    }

    pub fn from_config(config: &ProcessConfig) -> Self {
        Self::new(RunOptions::from_config(config))
    }

    /// Copy of the default options, for per-call tweaks
    pub fn options(&self) -> RunOptions {
        self.defaults.clone()
    }

    /// Run with the default options
    pub async fn run(&self, command: &str) -> Result<CommandResult> {
        self.run_with(command, &self.defaults).await
    }

    /// Run a command line, collecting stdout/stderr line by line
    pub async fn run_with(&self, command: &str, options: &RunOptions) -> Result<CommandResult> {
        let command_line = compose_command_line(command, options);
        tracing::info!("run_command: {}", command_line);

        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(&command_line)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(if options.capture_stderr {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);

        let started = Instant::now();
        let mut child = cmd.spawn().map_err(|source| AudioError::Spawn {
            command: command_line.clone(),
            source,
        })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let collect = async {
            let (out, err) = tokio::try_join!(
                read_lines(stdout, "stdout"),
                read_lines(stderr, "stderr")
            )?;
            let status = child.wait().await?;
            Ok::<_, std::io::Error>((out, err, status))
        };

        match tokio::time::timeout(options.timeout, collect).await {
            Ok(Ok((stdout, stderr, status))) => {
                let exit_code = status.code().unwrap_or(-1);
                tracing::debug!(
                    "command finished in {:.2}s with status {}",
                    started.elapsed().as_secs_f64(),
                    exit_code
                );
                Ok(CommandResult {
                    stdout,
                    stderr,
                    exit_code,
                })
            }
            Ok(Err(e)) => {
                terminate(&mut child).await;
                Err(AudioError::Io(e))
            }
            Err(_) => {
                let elapsed = started.elapsed();
                tracing::error!(
                    "run_command: Timeout Error - took longer than {} seconds to execute: '{}'",
                    options.timeout.as_secs(),
                    command_line
                );
                terminate(&mut child).await;
                Err(AudioError::Timeout {
                    command: command_line,
                    elapsed,
                })
            }
        }
    }
}

async fn read_lines<R>(stream: Option<R>, label: &'static str) -> std::io::Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut collected = String::new();
    let Some(stream) = stream else {
        return Ok(collected);
    };

    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        tracing::trace!("{}:    {}", label, line.trim_end_matches(|c| c == '\r' || c == '\n'));
        collected.push_str(&line);
    }
    Ok(collected)
}

/// Kill the command and every process sharing its group, then reap it
async fn terminate(child: &mut Child) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        // a negative pid addresses the process group led by the shell
        let group = format!("-{}", pid);
        if let Err(e) = Command::new("kill")
            .args(["-9", "--", group.as_str()])
            .output()
            .await
        {
            tracing::warn!("failed to signal process group {}: {}", pid, e);
        }
    }
    let _ = child.start_kill();
    let _ = child.wait().await;
}
