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

//! Timed execution of built binaries.
//!
//! Each binary runs under the timing wrapper:
//!
//! ```text
//! <time_command> --portability --output=<scratch_dir>/<file_name>.txt <binary_dir>/<file_name>
//! ```
//!
//! with the example input file on stdin. The wrapper's three-line report is
//! read back from the scratch file and parsed into a [`TimingTriple`].

use crate::config::BuildSpecification;
use crate::error::{Error, Result};
use crate::naming::{DecodedVariant, NamingCodec};
use crate::plan::BinaryIndex;
use crate::process::{run, CommandLine};
use crate::timing::{parse_portable_timing, TimingTriple};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Everything a timed run needs besides the binary itself.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub time_command: String,
    pub binary_dir: PathBuf,
    pub scratch_dir: PathBuf,
    /// Bytes fed to every binary on stdin.
    pub input: Arc<[u8]>,
}

impl ExecutionContext {
    /// Build a context from a specification, reading the example input file.
    pub fn from_specification(spec: &BuildSpecification) -> Result<Self> {
        let input = std::fs::read(&spec.example_input_file).map_err(|e| {
            Error::configuration(format!(
                "cannot read example input file '{}': {}",
                spec.example_input_file.display(),
                e
            ))
        })?;

        Ok(Self {
            time_command: spec.execution.time_command.clone(),
            binary_dir: spec.compilation.binary_output_directory.clone(),
            scratch_dir: spec.execution.scratch_directory.clone(),
            input: input.into(),
        })
    }

    /// Where the wrapper writes its report for a binary.
    pub fn report_path(&self, file_name: &str) -> PathBuf {
        self.scratch_dir.join(format!("{}.txt", file_name))
    }
}

/// One binary to time, with its decoded identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionJob {
    pub file_name: String,
    pub variant: DecodedVariant,
}

/// Decode every file in the index.
///
/// Returns the decodable binaries, and the file names that could not be
/// decoded along with the reason.
pub fn discover_binaries(
    index: &BinaryIndex,
    codec: &NamingCodec,
) -> (Vec<ExecutionJob>, Vec<(String, Error)>) {
    let mut jobs = Vec::new();
    let mut undecodable = Vec::new();

    for file_name in index.iter() {
        match codec.decode(file_name) {
            Ok(variant) => jobs.push(ExecutionJob {
                file_name: file_name.to_string(),
                variant,
            }),
            Err(e) => {
                warn!(file = %file_name, error = %e, "not a variant binary");
                undecodable.push((file_name.to_string(), e));
            }
        }
    }

    (jobs, undecodable)
}

/// Build the timing wrapper command for one binary.
pub fn timing_command(context: &ExecutionContext, file_name: &str) -> CommandLine {
    let mut output_flag = std::ffi::OsString::from("--output=");
    output_flag.push(context.report_path(file_name));

    CommandLine::new(&context.time_command)
        .arg("--portability")
        .arg(output_flag)
        .arg(context.binary_dir.join(file_name))
}

/// Run one binary under the timing wrapper and parse its report.
///
/// # Errors
///
/// [`Error::Io`] if the wrapper cannot be started or its report cannot be
/// read, [`Error::TimingParse`] if the report is malformed.
pub async fn time_binary(context: &ExecutionContext, job: &ExecutionJob) -> Result<TimingTriple> {
    let report = context.report_path(&job.file_name);
    remove_stale_report(&report).await?;

    let command = timing_command(context, &job.file_name);
    let output = run(&command, Some(context.input.as_ref()), false).await?;
    if !output.status.success() {
        warn!(
            program = %job.variant.program,
            parameters = %job.variant.vector,
            status = %output.status,
            "benchmarked binary exited unsuccessfully"
        );
    }

    let text = tokio::fs::read_to_string(&report)
        .await
        .map_err(|e| Error::io_error(&report, e))?;
    let timing = parse_portable_timing(&text)?;

    debug!(
        program = %job.variant.program,
        parameters = %job.variant.vector,
        real = timing.real,
        user = timing.user,
        sys = timing.sys,
        "timed"
    );
    Ok(timing)
}

async fn remove_stale_report(report: &Path) -> Result<()> {
    match tokio::fs::remove_file(report).await {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(Error::io_error(report, e)),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> ExecutionContext {
        ExecutionContext {
            time_command: "time".to_string(),
            binary_dir: PathBuf::from("build"),
            scratch_dir: PathBuf::from("txt"),
            input: Arc::from(&b"input"[..]),
        }
    }

    #[test]
    fn test_timing_command_layout() {
        let cmd = timing_command(&context(), "thread-N=4.out");
        assert_eq!(
            cmd.to_string(),
            "time --portability --output=txt/thread-N=4.out.txt build/thread-N=4.out"
        );
    }

    #[test]
    fn test_discover_separates_undecodable() {
        let codec = NamingCodec::new("-", ".out");
        let index: BinaryIndex = ["thread-N=4.out", "README.md", "serial.out"]
            .into_iter()
            .collect();

        let (jobs, undecodable) = discover_binaries(&index, &codec);
        let programs: Vec<_> = jobs.iter().map(|j| j.variant.program.as_str()).collect();
        assert_eq!(programs, vec!["serial", "thread"]);
        assert_eq!(undecodable.len(), 1);
        assert_eq!(undecodable[0].0, "README.md");
    }
}
