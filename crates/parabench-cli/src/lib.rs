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

//! Parabench CLI library for command-line parsing and execution.
//!
//! # Commands
//!
//! - **validate**: Check the build specification and show each program's matrix
//! - **plan**: List the variants a build would compile
//! - **build**: Compile the missing variants with bounded concurrency
//! - **execute**: Time every binary and write the results as JSON
//! - **completion**: Generate shell completion scripts
//!
//! # Examples
//!
//! ```no_run
//! use parabench_cli::commands::{build, execute, BuildOptions, ExecuteOptions};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), parabench_cli::error::CliError> {
//! let config = Path::new("build_specification.toml");
//! build(config, &BuildOptions::default())?;
//! execute(config, &ExecuteOptions::default())?;
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! Commands return `Result<(), CliError>`. An `Err` means the run as a whole
//! failed; failures of single compile or timing jobs appear in the run
//! summary only.

pub mod cli;
pub mod commands;
pub mod error;
pub mod runner;
