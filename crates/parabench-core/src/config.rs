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

//! Typed build specification.
//!
//! The specification is a TOML document loaded once at startup and validated
//! before anything is planned. Every optional field and its default is listed
//! here; unknown keys are rejected.
//!
//! ```toml
//! example_input_file = "input.txt"
//!
//! [compilation]
//! compiler = "gcc"
//! compilation_flags = ["-Wall", "-O2"]
//! linker_flags = ["-lm", "-lpthread"]
//! source_file_directory = "src"
//! binary_output_directory = "build"
//! binary_file_definition_delimiter = "-"
//! binary_file_extension = ".out"
//!
//! [compilation.definitions]
//! NUMBER_OF_THREADS = [2, 4, 8]
//!
//! [compilation.programs.serial]
//! exclude_definitions = "NUMBER_OF_THREADS"
//! ```
//!
//! Relative paths are resolved against the working directory of the process.

use crate::error::{Error, Result};
use crate::naming::NamingCodec;
use crate::value::{DefinitionSet, Scalar};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_SPECIFICATION_FILE: &str = "build_specification.toml";

/// Root of the build specification document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildSpecification {
    /// File whose bytes are fed to every benchmarked binary on stdin.
    pub example_input_file: PathBuf,

    /// Programs left out of both phases regardless of their own table.
    #[serde(default)]
    pub skip_programs: Vec<String>,

    pub compilation: CompilationSpec,

    #[serde(default)]
    pub execution: ExecutionSpec,
}

/// The `[compilation]` table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompilationSpec {
    pub compiler: String,

    #[serde(default)]
    pub compilation_flags: Vec<String>,

    #[serde(default)]
    pub linker_flags: Vec<String>,

    pub source_file_directory: PathBuf,

    pub binary_output_directory: PathBuf,

    #[serde(
        default = "default_delimiter",
        alias = "binary_file_definition_delimeter"
    )]
    pub binary_file_definition_delimiter: String,

    #[serde(default)]
    pub binary_file_extension: String,

    /// Definitions shared by every program.
    #[serde(default)]
    pub definitions: DefinitionSet,

    /// Per-program adjustments, keyed by program name.
    #[serde(default)]
    pub programs: IndexMap<String, ProgramSpec>,
}

/// A `[compilation.programs.<name>]` table.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProgramSpec {
    #[serde(default)]
    pub skip: bool,

    #[serde(default)]
    pub exclude_definitions: Exclusions,

    /// Added to, or replacing, the global definitions for this program.
    #[serde(default)]
    pub definitions: DefinitionSet,
}

/// Names removed from the global definitions for one program.
///
/// Accepts either a single string or a list of strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Exclusions {
    One(String),
    Many(Vec<String>),
}

impl Default for Exclusions {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl Exclusions {
    pub fn names(&self) -> &[String] {
        match self {
            Self::One(name) => std::slice::from_ref(name),
            Self::Many(names) => names,
        }
    }
}

/// The optional `[execution]` table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExecutionSpec {
    /// Timing wrapper; must understand `--portability` and `--output=FILE`.
    #[serde(default = "default_time_command")]
    pub time_command: String,

    /// Holds one timing file per binary during a run; removed afterwards.
    #[serde(default = "default_scratch_directory")]
    pub scratch_directory: PathBuf,

    #[serde(default = "default_results_file")]
    pub results_file: PathBuf,

    /// Per-job budget. `None` lets jobs run unbounded.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Concurrently running subprocesses. `None` uses available parallelism.
    #[serde(default)]
    pub max_jobs: Option<usize>,
}

impl Default for ExecutionSpec {
    fn default() -> Self {
        Self {
            time_command: default_time_command(),
            scratch_directory: default_scratch_directory(),
            results_file: default_results_file(),
            timeout_secs: None,
            max_jobs: None,
        }
    }
}

fn default_delimiter() -> String {
    "-".to_string()
}

fn default_time_command() -> String {
    "/usr/bin/time".to_string()
}

fn default_scratch_directory() -> PathBuf {
    PathBuf::from("txt")
}

fn default_results_file() -> PathBuf {
    PathBuf::from("binary_execution_times.json")
}

impl BuildSpecification {
    /// Read, parse and validate a specification file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration(format!(
                "cannot read build specification '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&raw)
    }

    /// Parse and validate a specification from TOML text.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let spec: Self = toml::from_str(raw)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Reject specifications that would fail later in a less obvious way.
    pub fn validate(&self) -> Result<()> {
        let compilation = &self.compilation;

        if compilation.compiler.trim().is_empty() {
            return Err(Error::configuration("compilation.compiler must not be empty"));
        }

        let delimiter = &compilation.binary_file_definition_delimiter;
        if delimiter.is_empty() {
            return Err(Error::configuration(
                "compilation.binary_file_definition_delimiter must not be empty",
            ));
        }
        if delimiter.contains('=') || delimiter.contains('/') {
            return Err(Error::configuration(format!(
                "compilation.binary_file_definition_delimiter '{}' must not contain '=' or '/'",
                delimiter
            )));
        }

        let extension = &compilation.binary_file_extension;
        if extension.contains('=') || extension.contains('/') {
            return Err(Error::configuration(format!(
                "compilation.binary_file_extension '{}' must not contain '=' or '/'",
                extension
            )));
        }

        validate_definitions("compilation.definitions", &compilation.definitions, delimiter)?;
        for (program, program_spec) in &compilation.programs {
            validate_definitions(
                &format!("compilation.programs.{}.definitions", program),
                &program_spec.definitions,
                delimiter,
            )?;
        }

        if self.execution.time_command.trim().is_empty() {
            return Err(Error::configuration("execution.time_command must not be empty"));
        }
        if self.execution.max_jobs == Some(0) {
            return Err(Error::configuration("execution.max_jobs must be at least 1"));
        }
        if self.execution.timeout_secs == Some(0) {
            return Err(Error::configuration("execution.timeout_secs must be at least 1"));
        }

        Ok(())
    }

    /// Codec built from the delimiter and extension of this specification.
    pub fn naming_codec(&self) -> NamingCodec {
        NamingCodec::new(
            self.compilation.binary_file_definition_delimiter.clone(),
            self.compilation.binary_file_extension.clone(),
        )
    }

    /// Whether a program is skipped at the orchestration level.
    pub fn is_skipped(&self, program: &str) -> bool {
        self.skip_programs.iter().any(|p| p == program)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.execution.timeout_secs.map(Duration::from_secs)
    }

    pub fn max_jobs(&self) -> usize {
        self.execution.max_jobs.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

fn validate_definitions(table: &str, definitions: &DefinitionSet, delimiter: &str) -> Result<()> {
    for definition in definitions.iter() {
        let name = definition.name;
        if name.is_empty()
            || name.contains('=')
            || name.contains(delimiter)
            || name.chars().any(char::is_whitespace)
        {
            return Err(Error::configuration(format!(
                "{}: invalid definition name '{}'",
                table, name
            )));
        }

        let values = definition.value.values();
        if definition.is_swept() && values.is_empty() {
            return Err(Error::configuration(format!(
                "{}.{}: swept definition has no values",
                table, name
            )));
        }
        if values
            .iter()
            .any(|v| matches!(v, Scalar::Float(x) if !x.is_finite()))
        {
            return Err(Error::configuration(format!(
                "{}.{}: float values must be finite",
                table, name
            )));
        }
    }
    Ok(())
}
