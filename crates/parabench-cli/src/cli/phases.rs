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

//! Pipeline commands: validate, plan, build and execute.

use super::GlobalOptions;
use crate::commands::{self, BuildOptions, ExecuteOptions};
use crate::error::CliError;
use clap::Subcommand;
use std::path::PathBuf;

/// Commands that operate on the build specification.
#[derive(Subcommand)]
pub enum PhaseCommands {
    /// Validate the build specification
    ///
    /// Loads and checks the specification, resolves each program's
    /// definitions and verifies every variant can be named. Prints the
    /// resolved definitions and variant count of each program.
    Validate,

    /// Show the variants a build would compile (dry run)
    Plan {
        /// Plan every variant, even those already built
        #[arg(short, long)]
        force: bool,
    },

    /// Compile the variants missing from the binary output directory
    Build {
        /// Rebuild every variant, even those already built
        #[arg(short, long)]
        force: bool,

        /// Maximum concurrent compiler processes
        #[arg(short, long, value_name = "N")]
        jobs: Option<usize>,
    },

    /// Time every binary in the output directory
    ///
    /// Runs each binary under the timing wrapper with the example input on
    /// stdin and writes the collected timings as JSON.
    Execute {
        /// Maximum concurrent benchmark processes
        #[arg(short, long, value_name = "N")]
        jobs: Option<usize>,

        /// Per-binary time budget in seconds
        #[arg(short, long, value_name = "SECS")]
        timeout: Option<u64>,

        /// Results file (defaults to execution.results_file)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

impl PhaseCommands {
    /// Execute the pipeline command.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the run as a whole fails.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = global.config.as_path();
        match self {
            PhaseCommands::Validate => commands::validate(config),
            PhaseCommands::Plan { force } => commands::plan(config, force, global.verbose),
            PhaseCommands::Build { force, jobs } => commands::build(
                config,
                &BuildOptions {
                    force,
                    jobs,
                    verbose: global.verbose,
                },
            ),
            PhaseCommands::Execute {
                jobs,
                timeout,
                output,
            } => commands::execute(
                config,
                &ExecuteOptions {
                    jobs,
                    timeout_secs: timeout,
                    output,
                    verbose: global.verbose,
                },
            ),
        }
    }
}
