/// External command execution.
///
/// Every tool ldgraph shells out to (ldconfig, dpkg, rpm, apk, ...) is described
/// by a `CommandSpec` so lookups can be inspected in tests without running them.

use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use log::debug;

use crate::common::CommandError;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Describes a command to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

/// Captured result of a successful command.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

impl CommandSpec {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Run to completion, killing the child if it outlives `timeout`.
    /// A non-zero exit status is reported as `CommandError::Failed`.
    pub fn run(&self, timeout: Duration) -> Result<CommandOutput, CommandError> {
        debug!("[exec] {} {}", self.program, self.args.join(" "));

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| CommandError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // Drain pipes on helper threads so a chatty child cannot block on a full pipe.
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let status = match self.wait(&mut child, timeout) {
            Ok(status) => status,
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(e);
            }
        };

        let output = CommandOutput {
            stdout: stdout.map(join).unwrap_or_default(),
            stderr: stderr.map(join).unwrap_or_default(),
        };

        if !status.success() {
            debug!("[exec] {} stderr: {}", self.program, output.stderr.trim());
            return Err(CommandError::Failed {
                program: self.program.clone(),
                code: status.code(),
            });
        }
        Ok(output)
    }

    fn wait(
        &self,
        child: &mut Child,
        timeout: Duration,
    ) -> Result<std::process::ExitStatus, CommandError> {
        let deadline = Instant::now() + timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) if Instant::now() >= deadline => {
                    return Err(CommandError::TimedOut {
                        program: self.program.clone(),
                        timeout,
                    });
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(source) => {
                    return Err(CommandError::Io {
                        program: self.program.clone(),
                        source,
                    });
                }
            }
        }
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn join(handle: thread::JoinHandle<String>) -> String {
    handle.join().unwrap_or_default()
}
