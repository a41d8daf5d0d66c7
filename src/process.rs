// src/process.rs

//! Running external tools under a cancellation token
//!
//! Every child (build commands, curl, git, svn, hg) runs in its own process
//! group with stdin closed. Output is forwarded line by line to tracing.
//! The child is polled with a timeout so a cancelled run kills the whole
//! group instead of waiting for a long build to finish.

use crate::cancel::CancelToken;
use crate::error::{Error, Result};
use nix::sys::signal::{Signal, killpg};
use nix::unistd::Pid;
use std::io::{BufRead, BufReader, Read};
use std::os::unix::process::CommandExt;
use std::process::{Command, ExitStatus, Stdio};
use std::time::Duration;
use tracing::{debug, warn};
use wait_timeout::ChildExt;

/// Spawns commands and waits for them while watching a [`CancelToken`]
#[derive(Debug, Clone, Copy)]
pub struct ProcessRunner<'a> {
    cancel: &'a CancelToken,
    poll_interval: Duration,
}

impl<'a> ProcessRunner<'a> {
    pub fn new(cancel: &'a CancelToken, poll_interval: Duration) -> Self {
        Self {
            cancel,
            poll_interval,
        }
    }

    /// Run `command` to completion and return its exit status
    ///
    /// `label` prefixes the forwarded output lines. A non-zero exit is not
    /// an error here; callers decide what it means.
    pub fn run(&self, label: &str, mut command: Command) -> Result<ExitStatus> {
        self.cancel.check()?;

        debug!("Running: {:?}", command);
        let mut child = command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .process_group(0)
            .spawn()?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        std::thread::scope(|scope| -> Result<ExitStatus> {
            if let Some(stdout) = stdout {
                scope.spawn(move || forward_lines(label, stdout));
            }
            if let Some(stderr) = stderr {
                scope.spawn(move || forward_lines(label, stderr));
            }

            // The forwarding threads only finish once every holder of the
            // pipes is gone, so the group is killed on every exit path.
            let group = Pid::from_raw(child.id() as i32);
            loop {
                match child.wait_timeout(self.poll_interval) {
                    Ok(Some(status)) => {
                        kill_group(group);
                        return Ok(status);
                    }
                    Ok(None) => {}
                    Err(e) => {
                        warn!("[{}] wait failed, killing process group {}: {}", label, group, e);
                        kill_group(group);
                        let _ = child.wait();
                        return Err(e.into());
                    }
                }
                if self.cancel.is_cancelled() {
                    warn!("[{}] cancelled, killing process group {}", label, group);
                    kill_group(group);
                    let _ = child.wait();
                    return Err(Error::WorkerInterrupted);
                }
            }
        })
    }

    /// The token this runner watches
    pub fn cancel_token(&self) -> &'a CancelToken {
        self.cancel
    }
}

/// SIGKILL a process group; an already-empty group is not an error
fn kill_group(group: Pid) {
    match killpg(group, Signal::SIGKILL) {
        Ok(()) | Err(nix::errno::Errno::ESRCH) => {}
        Err(e) => debug!("killpg({}) failed: {}", group, e),
    }
}

fn forward_lines<R: Read>(label: &str, reader: R) {
    for line in BufReader::new(reader).lines().map_while(std::result::Result::ok) {
        debug!("[{}] {}", label, line);
    }
}
