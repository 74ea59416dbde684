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

//! Error types for build planning, compilation and timed execution.
//!
//! Errors fall into two groups. Fatal errors ([`Error::Configuration`] and
//! [`Error::NamingCollision`]) abort a run before any job is launched. Every
//! other variant is raised at the boundary of a single compile or execute job
//! and only removes that variant from the run.

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// The error type for parabench operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The build specification is malformed or inconsistent.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A rendered component would break the filename round trip.
    #[error("Naming collision for program '{program}': {message}")]
    NamingCollision {
        /// Program whose variant could not be named
        program: String,
        /// What collided
        message: String,
    },

    /// A file in the binary directory is not a decodable variant name.
    #[error("Malformed binary file name '{file_name}': {message}")]
    MalformedFileName {
        /// The offending file name
        file_name: String,
        /// Why decoding failed
        message: String,
    },

    /// The toolchain exited unsuccessfully for one variant.
    #[error("Compilation of '{program}' [{parameters}] failed ({status}): {stderr}")]
    CompileJob {
        /// Program being compiled
        program: String,
        /// Rendered parameter vector
        parameters: String,
        /// Exit status description
        status: String,
        /// Captured toolchain diagnostics
        stderr: String,
    },

    /// The timing wrapper output did not have the expected shape.
    #[error("Timing parse error: {0}")]
    TimingParse(String),

    /// A job exceeded its time budget and was killed.
    #[error("'{job}' timed out after {timeout:?}")]
    Timeout {
        /// Job description
        job: String,
        /// The budget that was exceeded
        timeout: Duration,
    },

    /// A job ended without producing a result.
    #[error("'{job}' was aborted: {message}")]
    Aborted {
        /// Job description
        job: String,
        /// Why the job stopped
        message: String,
    },

    /// Filesystem or subprocess spawning failure.
    #[error("I/O error for '{path}': {message}")]
    Io {
        /// Path involved in the failed operation
        path: PathBuf,
        /// The underlying error message
        message: String,
    },
}

impl Error {
    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a naming collision error.
    pub fn naming_collision(program: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::NamingCollision {
            program: program.into(),
            message: msg.into(),
        }
    }

    /// Create a malformed file name error.
    pub fn malformed_file_name(file_name: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::MalformedFileName {
            file_name: file_name.into(),
            message: msg.into(),
        }
    }

    /// Create a timing parse error.
    pub fn timing_parse(msg: impl Into<String>) -> Self {
        Self::TimingParse(msg.into())
    }

    /// Create a timeout error.
    pub fn timeout(job: impl Into<String>, timeout: Duration) -> Self {
        Self::Timeout {
            job: job.into(),
            timeout,
        }
    }

    /// Create an aborted-job error.
    pub fn aborted(job: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Aborted {
            job: job.into(),
            message: msg.into(),
        }
    }

    /// Create an I/O error with path context.
    ///
    /// ```rust,no_run
    /// use parabench_core::Error;
    ///
    /// let result = std::fs::read("input.txt").map_err(|e| Error::io_error("input.txt", e));
    /// ```
    pub fn io_error(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Whether this error must abort the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::NamingCollision { .. })
    }

    /// Whether this error is a job timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

impl From<toml::de::Error> for Error {
    fn from(source: toml::de::Error) -> Self {
        Self::Configuration(source.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Io {
            path: PathBuf::new(),
            message: format!("result snapshot: {}", source),
        }
    }
}

/// Result type for parabench operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(Error::configuration("missing key").is_fatal());
        assert!(Error::naming_collision("thread", "delimiter in value").is_fatal());
        assert!(!Error::timing_parse("two lines").is_fatal());
        assert!(!Error::timeout("thread", Duration::from_secs(3)).is_fatal());
        assert!(!Error::aborted("thread", "task panicked").is_fatal());
        assert!(!Error::io_error("x", io::Error::new(io::ErrorKind::NotFound, "gone")).is_fatal());
    }

    #[test]
    fn test_timeout_display() {
        let err = Error::timeout("thread-N=4", Duration::from_secs(30));
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "'thread-N=4' timed out after 30s");
    }

    #[test]
    fn test_sub_second_timeout_display() {
        let err = Error::timeout("thread-N=4", Duration::from_millis(300));
        assert_eq!(err.to_string(), "'thread-N=4' timed out after 300ms");
    }

    #[test]
    fn test_io_error_display() {
        let err = Error::io_error(
            "build/thread.out",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("build/thread.out"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_configuration_display() {
        let err = Error::configuration("program 'serial' excludes unknown definition 'X'");
        assert_eq!(
            err.to_string(),
            "Configuration error: program 'serial' excludes unknown definition 'X'"
        );
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("a = [").unwrap_err();
        let err: Error = toml_err.into();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
