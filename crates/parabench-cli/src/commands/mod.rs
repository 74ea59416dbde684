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

//! CLI command implementations

mod build;
mod completion;
mod execute;
mod plan;
mod validate;

pub use build::{build, BuildOptions};
pub use completion::{completion, installation_instructions, write_completion};
pub use execute::{execute, ExecuteOptions};
pub use plan::plan;
pub use validate::validate;

use crate::error::CliError;
use crate::runner::RunnerConfig;
use parabench_core::BuildSpecification;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Load and validate the build specification.
///
/// # Errors
///
/// Returns `Err` if the file cannot be read or the specification is invalid.
pub fn load_specification(config: &Path) -> Result<BuildSpecification, CliError> {
    debug!(config = %config.display(), "loading build specification");
    Ok(BuildSpecification::load(config)?)
}

/// Runner configuration from the specification, overridden by CLI flags.
fn runner_config(
    spec: &BuildSpecification,
    jobs: Option<usize>,
    timeout: Option<Duration>,
    verbose: bool,
) -> Result<RunnerConfig, CliError> {
    if jobs == Some(0) {
        return Err(CliError::invalid_input("--jobs must be at least 1"));
    }
    Ok(RunnerConfig {
        max_jobs: jobs.unwrap_or_else(|| spec.max_jobs()),
        timeout,
        progress_interval: 1,
        verbose,
    })
}

/// Create a directory and its parents.
fn create_dir(path: &Path) -> Result<(), CliError> {
    std::fs::create_dir_all(path).map_err(|e| CliError::io_error(path, e))
}
