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

//! Structured error types for the parabench CLI.
//!
//! Command handlers return `Result<T, CliError>`. Errors from the core engine
//! pass through unchanged in [`CliError::Core`]. Only errors that abort a run
//! reach this type: per-job failures are counted in the run summary.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for parabench CLI operations.
///
/// # Examples
///
/// ```rust,no_run
/// use parabench_cli::error::CliError;
///
/// fn create_output(path: &str) -> Result<(), CliError> {
///     std::fs::create_dir_all(path).map_err(|e| CliError::io_error(path, e))?;
///     Ok(())
/// }
/// ```
#[derive(Error, Debug, Clone)]
pub enum CliError {
    /// Error raised by the core engine.
    #[error(transparent)]
    Core(#[from] parabench_core::Error),

    /// I/O operation failed (directory creation, scratch cleanup, output write).
    #[error("I/O error for '{path}': {message}")]
    Io {
        /// The path that caused the error
        path: PathBuf,
        /// The error message
        message: String,
    },

    /// The async runtime could not be constructed.
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Invalid input provided by the user on the command line.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl CliError {
    /// Create an I/O error with path context.
    pub fn io_error(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// The wrapped core error, if any.
    pub fn core(&self) -> Option<&parabench_core::Error> {
        match self {
            Self::Core(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_is_transparent() {
        let err: CliError = parabench_core::Error::configuration("compiler missing").into();
        assert_eq!(err.to_string(), "Configuration error: compiler missing");
        assert!(err.core().is_some_and(parabench_core::Error::is_fatal));
    }

    #[test]
    fn test_io_error_carries_path() {
        let err = CliError::io_error(
            "build",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("build"));
        assert!(err.to_string().contains("denied"));
        assert!(err.core().is_none());
    }
}
