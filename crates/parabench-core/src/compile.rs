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

//! Toolchain invocation for one planned variant.
//!
//! ```text
//! <compiler> <source_dir>/<program>.c <compilation_flags...> -D<NAME>=<VALUE>... -o <output_dir>/<file_name> <linker_flags...>
//! ```

use crate::config::CompilationSpec;
use crate::error::{Error, Result};
use crate::plan::CompileJob;
use crate::process::{run, CommandLine};
use crate::resolve::SOURCE_EXTENSION;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Source file of a program.
pub fn source_path(compilation: &CompilationSpec, program: &str) -> PathBuf {
    compilation
        .source_file_directory
        .join(format!("{}.{}", program, SOURCE_EXTENSION))
}

/// Build the toolchain command for one job.
///
/// Every parameter becomes a `-D` definition; linker flags come last.
pub fn compilation_command(compilation: &CompilationSpec, job: &CompileJob) -> CommandLine {
    CommandLine::new(&compilation.compiler)
        .arg(source_path(compilation, &job.program))
        .args(&compilation.compilation_flags)
        .args(
            job.vector
                .iter()
                .map(|p| format!("-D{}={}", p.name, p.value)),
        )
        .arg("-o")
        .arg(compilation.binary_output_directory.join(&job.file_name))
        .args(&compilation.linker_flags)
}

/// Compile one variant.
///
/// # Errors
///
/// [`Error::Io`] if the toolchain cannot be started, [`Error::CompileJob`] if
/// it exits unsuccessfully. Neither affects other jobs.
pub async fn compile(compilation: &CompilationSpec, job: &CompileJob) -> Result<()> {
    let command = compilation_command(compilation, job);
    let output = run(&command, None, false).await?;

    if output.status.success() {
        debug!(program = %job.program, parameters = %job.vector, "compiled");
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    warn!(
        program = %job.program,
        parameters = %job.vector,
        status = %output.status,
        "compilation failed"
    );
    Err(Error::CompileJob {
        program: job.program.clone(),
        parameters: job.vector.to_string(),
        status: output.status.to_string(),
        stderr,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{ParameterVector, Scalar};
    use indexmap::IndexMap;

    fn compilation() -> CompilationSpec {
        CompilationSpec {
            compiler: "gcc".to_string(),
            compilation_flags: vec!["-Wall".to_string(), "-O2".to_string()],
            linker_flags: vec!["-lm".to_string(), "-lpthread".to_string()],
            source_file_directory: PathBuf::from("src"),
            binary_output_directory: PathBuf::from("build"),
            binary_file_definition_delimiter: "-".to_string(),
            binary_file_extension: ".out".to_string(),
            definitions: Default::default(),
            programs: IndexMap::new(),
        }
    }

    fn job() -> CompileJob {
        let vector: ParameterVector = [
            ("THREAD_COUNT", Scalar::Integer(4)),
            ("RATIO", Scalar::Float(0.5)),
        ]
        .into_iter()
        .collect();
        CompileJob {
            program: "thread".to_string(),
            vector,
            file_name: "thread-THREAD_COUNT=4-RATIO=0.5.out".to_string(),
        }
    }

    #[test]
    fn test_command_layout() {
        let cmd = compilation_command(&compilation(), &job());
        assert_eq!(cmd.program(), "gcc");
        assert_eq!(
            cmd.get_args(),
            [
                "src/thread.c",
                "-Wall",
                "-O2",
                "-DTHREAD_COUNT=4",
                "-DRATIO=0.5",
                "-o",
                "build/thread-THREAD_COUNT=4-RATIO=0.5.out",
                "-lm",
                "-lpthread",
            ]
        );
    }

    #[test]
    fn test_empty_vector_has_no_definitions() {
        let mut job = job();
        job.vector = ParameterVector::new();
        let cmd = compilation_command(&compilation(), &job);
        assert!(!cmd
            .get_args()
            .iter()
            .any(|a| a.to_string_lossy().starts_with("-D")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_compile_failure_is_reported() {
        let mut compilation = compilation();
        compilation.compiler = "false".to_string();
        let err = compile(&compilation, &job()).await.unwrap_err();
        match err {
            Error::CompileJob {
                program,
                parameters,
                ..
            } => {
                assert_eq!(program, "thread");
                assert_eq!(parameters, "THREAD_COUNT=4, RATIO=0.5");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
