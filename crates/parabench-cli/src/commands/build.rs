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

//! Build command - compile the variants missing from the output directory

use super::{create_dir, load_specification, runner_config};
use crate::error::CliError;
use crate::runner::{block_on, print_summary, Job, Runner, Tone};
use async_trait::async_trait;
use parabench_core::compile::compile;
use parabench_core::{plan_builds, resolve, BinaryIndex, CompilationSpec, CompileJob, Error};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Options of the `build` command.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Rebuild variants that already exist
    pub force: bool,
    /// Overrides `execution.max_jobs`
    pub jobs: Option<usize>,
    pub verbose: bool,
}

/// One planned variant, compiled through the runner.
struct CompileTask {
    compilation: Arc<CompilationSpec>,
    job: CompileJob,
}

#[async_trait]
impl Job for CompileTask {
    type Output = ();

    async fn run(&self) -> Result<(), Error> {
        compile(&self.compilation, &self.job).await
    }

    fn program(&self) -> &str {
        &self.job.program
    }

    fn parameters(&self) -> String {
        self.job.vector.to_string()
    }
}

/// Plan and compile.
///
/// Configuration and naming are fully checked before the first compiler
/// starts. Compilation failures are counted in the summary and do not make
/// the command fail.
///
/// # Errors
///
/// Returns `Err` on any configuration or naming error, or if the binary
/// output directory cannot be listed or created.
pub fn build(config: &Path, options: &BuildOptions) -> Result<(), CliError> {
    let spec = load_specification(config)?;
    let runner = Runner::new(runner_config(&spec, options.jobs, None, options.verbose)?);

    let resolved = resolve(&spec)?;
    let output_dir = &spec.compilation.binary_output_directory;
    let index = BinaryIndex::scan(output_dir)?;
    let plan = plan_builds(&resolved, &spec.naming_codec(), &index, options.force)?;

    let planned = plan.len();
    info!(
        planned,
        desired = plan.desired(),
        max_jobs = runner.config().max_jobs,
        "build phase started"
    );
    if planned > 0 {
        create_dir(output_dir)?;
    }

    let compilation = Arc::new(spec.compilation.clone());
    let tasks: Vec<CompileTask> = plan
        .into_jobs()
        .into_iter()
        .map(|job| CompileTask {
            compilation: Arc::clone(&compilation),
            job,
        })
        .collect();
    let results = block_on(runner.run(tasks))?;

    let compiled = results.success_count();
    let failed = results.total_jobs() - compiled;
    info!(planned, compiled, failed, "build phase finished");

    print_summary(
        "Build",
        "compile variants",
        &[
            ("Planned", planned, Tone::Neutral),
            ("Compiled", compiled, Tone::Good),
            ("Failed", failed, Tone::Bad),
        ],
        results.elapsed_ms,
    );
    if options.verbose {
        for failure in results.failures() {
            if let Err(e) = &failure.result {
                eprintln!("  - {}: {}", failure.label, e);
            }
        }
    }
    Ok(())
}
