// Dweve Parabench - Parametric Build Matrix and Benchmark Harness
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Subprocess invocation shared by compilation and timed execution.

use crate::error::{Error, Result};
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::process::{Output, Stdio};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// A program and its arguments, kept inspectable for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: OsString,
    args: Vec<OsString>,
}

impl CommandLine {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Run a command to completion.
///
/// `input` is written to the child's stdin, which is then closed; without it
/// stdin is empty. Stderr is always captured, stdout only when
/// `capture_stdout` is set (otherwise discarded).
///
/// On unix the child leads a new process group. Dropping the returned future
/// kills the whole group, including programs the child forked and still waits
/// on (a timing wrapper runs the benchmarked binary that way).
pub async fn run(command: &CommandLine, input: Option<&[u8]>, capture_stdout: bool) -> Result<Output> {
    debug!(command = %command, "spawning");

    let mut builder = Command::new(&command.program);
    builder
        .args(&command.args)
        .stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(if capture_stdout {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    builder.process_group(0);

    let mut child = builder
        .spawn()
        .map_err(|e| Error::io_error(&command.program, e))?;
    let mut group = ProcessGroup::new(child.id());

    let stdin = child.stdin.take();
    let feed = async move {
        if let (Some(bytes), Some(mut stdin)) = (input, stdin) {
            match stdin.write_all(bytes).await {
                // The program may exit without reading all of its input.
                Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => return Err(e),
                _ => {}
            }
        }
        Ok(())
    };

    let (fed, output) = tokio::join!(feed, child.wait_with_output());
    group.release();
    let output = output.map_err(|e| Error::io_error(&command.program, e))?;
    fed.map_err(|e| Error::io_error(&command.program, e))?;
    Ok(output)
}

/// Kills a child's process group on drop unless released after the child
/// was reaped.
struct ProcessGroup {
    leader: Option<u32>,
}

impl ProcessGroup {
    fn new(leader: Option<u32>) -> Self {
        Self { leader }
    }

    fn release(&mut self) {
        self.leader = None;
    }
}

impl Drop for ProcessGroup {
    fn drop(&mut self) {
        if let Some(leader) = self.leader.take() {
            kill_group(leader);
        }
    }
}

#[cfg(unix)]
fn kill_group(leader: u32) {
    let Ok(pgid) = libc::pid_t::try_from(leader) else {
        return;
    };
    // SAFETY: killpg takes plain integers and only sends a signal.
    let rc = unsafe { libc::killpg(pgid, libc::SIGKILL) };
    if rc == 0 {
        debug!(pgid, "killed process group");
    } else {
        debug!(pgid, error = %std::io::Error::last_os_error(), "process group already gone");
    }
}

// Without process groups, `kill_on_drop` only reaches the direct child.
#[cfg(not(unix))]
fn kill_group(_leader: u32) {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_display_joins_arguments() {
        let cmd = CommandLine::new("gcc").arg("src/thread.c").args(["-o", "build/thread"]);
        assert_eq!(cmd.to_string(), "gcc src/thread.c -o build/thread");
        assert_eq!(cmd.get_args().len(), 3);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_feeds_stdin() {
        let cmd = CommandLine::new("cat");
        let output = run(&cmd, Some(b"hello"), true).await.unwrap();
        assert!(output.status.success());
        assert_eq!(output.stdout, b"hello");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_reports_failure_status() {
        let cmd = CommandLine::new("sh").args(["-c", "echo oops >&2; exit 3"]);
        let output = run(&cmd, None, false).await.unwrap();
        assert_eq!(output.status.code(), Some(3));
        assert_eq!(String::from_utf8_lossy(&output.stderr).trim(), "oops");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_dropped_run_kills_forked_children() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("finished");
        // The outer shell forks the inner one and waits for it.
        let cmd = CommandLine::new("sh").args([
            "-c",
            "sh -c 'sleep 1; touch \"$0\"' \"$0\"; true",
        ]).arg(&marker);

        let outcome = tokio::time::timeout(Duration::from_millis(200), run(&cmd, None, false)).await;
        assert!(outcome.is_err());

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!marker.exists(), "forked child outlived the dropped run");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_completed_run_leaves_no_group_to_kill() {
        let cmd = CommandLine::new("sh").args(["-c", "sh -c 'exit 0'; exit 4"]);
        let output = run(&cmd, None, false).await.unwrap();
        assert_eq!(output.status.code(), Some(4));
    }

    #[tokio::test]
    async fn test_run_missing_program() {
        let cmd = CommandLine::new("/nonexistent/parabench-compiler");
        let err = run(&cmd, None, false).await.unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
