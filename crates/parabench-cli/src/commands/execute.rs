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

//! Execute command - time every binary and persist the results

use super::{create_dir, load_specification, runner_config};
use crate::error::CliError;
use crate::runner::{block_on, print_summary, Job, Runner, Tone};
use async_trait::async_trait;
use colored::Colorize;
use parabench_core::{
    discover_binaries, time_binary, BinaryIndex, DecodedVariant, Error, ExecutionContext,
    ExecutionJob, ResultStore, TimingTriple,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Options of the `execute` command.
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    /// Overrides `execution.max_jobs`
    pub jobs: Option<usize>,
    /// Overrides `execution.timeout_secs`
    pub timeout_secs: Option<u64>,
    /// Overrides `execution.results_file`
    pub output: Option<PathBuf>,
    pub verbose: bool,
}

/// One binary, timed through the runner.
struct TimingTask {
    context: Arc<ExecutionContext>,
    job: ExecutionJob,
}

#[async_trait]
impl Job for TimingTask {
    type Output = (DecodedVariant, TimingTriple);

    async fn run(&self) -> Result<Self::Output, Error> {
        let timing = time_binary(&self.context, &self.job).await?;
        Ok((self.job.variant.clone(), timing))
    }

    fn program(&self) -> &str {
        &self.job.variant.program
    }

    fn parameters(&self) -> String {
        self.job.variant.vector.to_string()
    }
}

/// Time every binary in the output directory and write the results.
///
/// Files whose names do not decode are skipped with a warning, binaries of
/// programs in `skip_programs` are skipped silently. Timing
/// failures and timeouts are counted in the summary and do not make the
/// command fail. The scratch directory is removed afterwards.
///
/// # Errors
///
/// Returns `Err` if the specification is invalid, the example input file
/// cannot be read, the binary or scratch directory is unusable, or the
/// results cannot be written.
pub fn execute(config: &Path, options: &ExecuteOptions) -> Result<(), CliError> {
    let spec = load_specification(config)?;
    if options.timeout_secs == Some(0) {
        return Err(CliError::invalid_input("--timeout must be at least 1 second"));
    }
    let timeout = options
        .timeout_secs
        .map(Duration::from_secs)
        .or_else(|| spec.timeout());
    let runner = Runner::new(runner_config(&spec, options.jobs, timeout, options.verbose)?);
    let results_file = options
        .output
        .clone()
        .unwrap_or_else(|| spec.execution.results_file.clone());

    let context = Arc::new(ExecutionContext::from_specification(&spec)?);
    let index = BinaryIndex::scan(&context.binary_dir)?;
    let (discovered, undecodable) = discover_binaries(&index, &spec.naming_codec());
    let (skipped_jobs, jobs): (Vec<_>, Vec<_>) = discovered
        .into_iter()
        .partition(|job| spec.is_skipped(&job.variant.program));
    for job in &skipped_jobs {
        debug!(file = %job.file_name, program = %job.variant.program, "program skipped");
    }
    let skipped = undecodable.len() + skipped_jobs.len();

    let found = jobs.len();
    info!(
        found,
        skipped,
        max_jobs = runner.config().max_jobs,
        timeout_secs = timeout.map(|t| t.as_secs()),
        "execution phase started"
    );
    create_dir(&context.scratch_dir)?;

    let tasks: Vec<TimingTask> = jobs
        .into_iter()
        .map(|job| TimingTask {
            context: Arc::clone(&context),
            job,
        })
        .collect();
    let results = block_on(runner.run(tasks))?;
    remove_scratch(&context.scratch_dir);

    let executed = results.success_count();
    let failed = results.failure_count();
    let timed_out = results.timeout_count();
    let elapsed_ms = results.elapsed_ms;

    if options.verbose {
        for failure in results.failures() {
            if let Err(e) = &failure.result {
                eprintln!("  - {}: {}", failure.label, e);
            }
        }
    }

    let mut store = ResultStore::new();
    for result in results.results {
        if let Ok((variant, timing)) = result.result {
            store.record(variant.program, variant.vector, timing);
        }
    }
    store.write_to(&results_file)?;
    info!(executed, failed, timed_out, "execution phase finished");

    print_summary(
        "Execute",
        "time binaries",
        &[
            ("Found", found, Tone::Neutral),
            ("Skipped", skipped, Tone::Neutral),
            ("Executed", executed, Tone::Good),
            ("Failed", failed, Tone::Bad),
            ("Timed out", timed_out, Tone::Bad),
        ],
        elapsed_ms,
    );
    println!(
        "{} {}",
        "Results written to".bright_cyan(),
        results_file.display()
    );
    Ok(())
}

fn remove_scratch(dir: &Path) {
    match std::fs::remove_dir_all(dir) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
            warn!(directory = %dir.display(), error = %e, "could not remove scratch directory");
        }
        _ => {}
    }
}
