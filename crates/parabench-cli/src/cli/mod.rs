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

//! CLI command definitions and argument parsing.
//!
//! - [`phases`]: the build matrix pipeline (validate, plan, build, execute)
//! - [`utility`]: utility commands (completion)

mod phases;
mod utility;

use crate::error::CliError;
use clap::{Args, Parser, Subcommand};
use parabench_core::DEFAULT_SPECIFICATION_FILE;
use std::path::PathBuf;

pub use phases::PhaseCommands;
pub use utility::UtilityCommands;

/// Parabench - parametric build matrix and benchmark harness
///
/// Compiles every combination of preprocessor definitions declared in a
/// build specification, times each resulting binary, and records the
/// timings per parameter vector.
///
/// # Examples
///
/// ```bash
/// # Check the specification and show the matrix of each program
/// parabench validate
///
/// # Compile the variants missing from the output directory
/// parabench build --jobs 8
///
/// # Time every binary, giving up on any that runs over ten minutes
/// parabench execute --timeout 600
/// ```
#[derive(Parser)]
#[command(name = "parabench")]
#[command(author, version, about = "Parabench - parametric build matrix and benchmark harness", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalOptions {
    /// Build specification file
    #[arg(short, long, global = true, value_name = "FILE", default_value = DEFAULT_SPECIFICATION_FILE)]
    pub config: PathBuf,

    /// Verbose output (debug logging, per-job progress)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Top-level CLI commands.
///
/// ```text
/// Commands
/// ├── Phases (validate, plan, build, execute)
/// └── Utility (completion)
/// ```
#[derive(Subcommand)]
pub enum Commands {
    // Pipeline commands - flattened to appear at top level
    #[command(flatten)]
    Phases(PhaseCommands),

    // Utility commands - flattened to appear at top level
    #[command(flatten)]
    Utility(UtilityCommands),
}

impl Commands {
    /// Execute the command.
    ///
    /// # Errors
    ///
    /// Returns `Err` only when the run as a whole fails: an invalid
    /// specification, a naming collision, or an I/O failure that prevents
    /// the run from starting or its results from being written. Individual
    /// compile and timing failures are reported in the summary instead.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        match self {
            Commands::Phases(cmd) => cmd.execute(global),
            Commands::Utility(cmd) => cmd.execute(),
        }
    }
}
