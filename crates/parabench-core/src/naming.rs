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

//! Binary file naming.
//!
//! A variant's file name is its only on-disk identity:
//!
//! ```text
//! <program><delimiter><NAME1>=<VALUE1><delimiter><NAME2>=<VALUE2><extension>
//! ```
//!
//! A program without parameters still gets the delimiter, as in
//! `serial-.out`; names without it (`serial.out`) decode as well.
//!
//! The build phase encodes parameter vectors into names and the execution
//! phase decodes them back. Encoding refuses any component that would make the
//! decode ambiguous, so a successful encode always round-trips.
//!
//! # Examples
//!
//! ```
//! use parabench_core::{NamingCodec, ParameterVector, Scalar};
//!
//! let codec = NamingCodec::new("-", ".out");
//! let vector: ParameterVector = [("NUMBER_OF_THREADS", Scalar::Integer(4))].into_iter().collect();
//!
//! let name = codec.encode("thread", &vector).unwrap();
//! assert_eq!(name, "thread-NUMBER_OF_THREADS=4.out");
//!
//! let decoded = codec.decode(&name).unwrap();
//! assert_eq!(decoded.program, "thread");
//! assert_eq!(decoded.vector, vector.render());
//! ```

use crate::error::{Error, Result};
use crate::value::ParameterVector;
use std::fmt::Display;

/// A variant identity recovered from a file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedVariant {
    pub program: String,
    pub vector: ParameterVector<String>,
}

/// Bijective mapping between `(program, vector)` pairs and file names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingCodec {
    delimiter: String,
    extension: String,
}

impl NamingCodec {
    pub fn new(delimiter: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            delimiter: delimiter.into(),
            extension: extension.into(),
        }
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Encode a program and parameter vector into a file name.
    ///
    /// # Errors
    ///
    /// [`Error::NamingCollision`] when the program name, a definition name or
    /// a rendered value would break decoding: it contains the delimiter, the
    /// extension or a path separator, or a name contains `=`.
    pub fn encode<V: Display>(&self, program: &str, vector: &ParameterVector<V>) -> Result<String> {
        self.check_component(program, program, "program name")?;
        if program.is_empty() || program.contains('=') {
            return Err(Error::naming_collision(
                program,
                "program name is empty or contains '='",
            ));
        }

        let mut name = String::from(program);
        if vector.is_empty() {
            name.push_str(&self.delimiter);
        }
        for parameter in vector {
            let value = parameter.value.to_string();
            self.check_component(program, &parameter.name, "definition name")?;
            if parameter.name.is_empty() || parameter.name.contains('=') {
                return Err(Error::naming_collision(
                    program,
                    format!("definition name '{}' is empty or contains '='", parameter.name),
                ));
            }
            self.check_component(program, &value, &format!("value of {}", parameter.name))?;

            name.push_str(&self.delimiter);
            name.push_str(&parameter.name);
            name.push('=');
            name.push_str(&value);
        }
        name.push_str(&self.extension);

        // Catches overlaps at component boundaries, e.g. a value ending in
        // the first half of a multi-character delimiter.
        let round_trips = self
            .decode(&name)
            .map(|d| d.program == program && d.vector == vector.render())
            .unwrap_or(false);
        if !round_trips {
            return Err(Error::naming_collision(
                program,
                format!("'{}' does not decode back to its parameters", name),
            ));
        }

        Ok(name)
    }

    /// Decode a file name produced by [`encode`](Self::encode).
    ///
    /// Values stay textual; they are the key results are aggregated under.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedFileName`] when the name lacks the extension, has an
    /// empty program name, or has a parameter token without `=`.
    pub fn decode(&self, file_name: &str) -> Result<DecodedVariant> {
        let stem = file_name.strip_suffix(self.extension.as_str()).ok_or_else(|| {
            Error::malformed_file_name(
                file_name,
                format!("missing extension '{}'", self.extension),
            )
        })?;

        let mut tokens = stem.split(self.delimiter.as_str());
        let program = match tokens.next() {
            Some(p) if !p.is_empty() => p.to_string(),
            _ => return Err(Error::malformed_file_name(file_name, "empty program name")),
        };

        let mut vector = ParameterVector::new();
        let tokens: Vec<&str> = tokens.collect();
        let last = tokens.len().saturating_sub(1);
        for (i, token) in tokens.iter().enumerate() {
            // A trailing empty token comes from names written with a
            // delimiter before an empty parameter list.
            if token.is_empty() && i == last {
                continue;
            }
            let (name, value) = token.split_once('=').ok_or_else(|| {
                Error::malformed_file_name(file_name, format!("token '{}' has no '='", token))
            })?;
            if name.is_empty() {
                return Err(Error::malformed_file_name(
                    file_name,
                    format!("token '{}' has an empty name", token),
                ));
            }
            vector.push(name, value.to_string());
        }

        Ok(DecodedVariant { program, vector })
    }

    fn check_component(&self, program: &str, component: &str, what: &str) -> Result<()> {
        if component.contains(self.delimiter.as_str()) {
            return Err(Error::naming_collision(
                program,
                format!(
                    "{} '{}' contains the delimiter '{}'",
                    what, component, self.delimiter
                ),
            ));
        }
        if !self.extension.is_empty() && component.contains(self.extension.as_str()) {
            return Err(Error::naming_collision(
                program,
                format!(
                    "{} '{}' contains the extension '{}'",
                    what, component, self.extension
                ),
            ));
        }
        if component.contains('/') || component.contains('\0') {
            return Err(Error::naming_collision(
                program,
                format!("{} '{}' contains a path separator", what, component),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Scalar;

    fn vector(entries: &[(&str, Scalar)]) -> ParameterVector {
        entries.iter().cloned().collect()
    }

    #[test]
    fn test_encode_multiple_parameters() {
        let codec = NamingCodec::new("-", ".out");
        let name = codec
            .encode(
                "processThread",
                &vector(&[
                    ("THREAD_COUNT", Scalar::Integer(8)),
                    ("PROCESS_COUNT", Scalar::Integer(2)),
                    ("RATIO", Scalar::Float(0.25)),
                    ("VERBOSE", Scalar::Boolean(false)),
                ]),
            )
            .unwrap();
        assert_eq!(
            name,
            "processThread-THREAD_COUNT=8-PROCESS_COUNT=2-RATIO=0.25-VERBOSE=false.out"
        );
    }

    #[test]
    fn test_empty_vector_round_trip() {
        let codec = NamingCodec::new("-", ".out");
        let name = codec.encode("serial", &ParameterVector::<Scalar>::new()).unwrap();
        assert_eq!(name, "serial-.out");

        let decoded = codec.decode(&name).unwrap();
        assert_eq!(decoded.program, "serial");
        assert!(decoded.vector.is_empty());
    }

    #[test]
    fn test_decode_without_trailing_delimiter() {
        let codec = NamingCodec::new("-", ".out");
        let decoded = codec.decode("serial.out").unwrap();
        assert_eq!(decoded.program, "serial");
        assert!(decoded.vector.is_empty());
    }

    #[test]
    fn test_decode_keeps_order_and_text() {
        let codec = NamingCodec::new("__", "");
        let decoded = codec.decode("thread__B=2.0__A=x").unwrap();
        let pairs: Vec<_> = decoded
            .vector
            .iter()
            .map(|p| (p.name.as_str(), p.value.as_str()))
            .collect();
        assert_eq!(pairs, vec![("B", "2.0"), ("A", "x")]);
    }

    #[test]
    fn test_value_containing_equals_round_trips() {
        let codec = NamingCodec::new("-", ".out");
        let v = vector(&[("EXPR", Scalar::from("a=b"))]);
        let name = codec.encode("p", &v).unwrap();
        assert_eq!(codec.decode(&name).unwrap().vector, v.render());
    }

    #[test]
    fn test_delimiter_in_value_is_collision() {
        let codec = NamingCodec::new("-", ".out");
        let err = codec
            .encode("thread", &vector(&[("OFFSET", Scalar::Integer(-1))]))
            .unwrap_err();
        assert!(matches!(err, Error::NamingCollision { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_extension_in_value_is_collision() {
        let codec = NamingCodec::new("_", ".out");
        let err = codec
            .encode("p", &vector(&[("FILE", Scalar::from("x.out"))]))
            .unwrap_err();
        assert!(err.to_string().contains("extension"));
    }

    #[test]
    fn test_delimiter_in_program_is_collision() {
        let codec = NamingCodec::new("-", "");
        let err = codec
            .encode("my-prog", &vector(&[("N", Scalar::Integer(1))]))
            .unwrap_err();
        assert!(err.to_string().contains("program name"));
    }

    #[test]
    fn test_boundary_overlap_is_collision() {
        let codec = NamingCodec::new("__", "");
        let err = codec
            .encode(
                "p",
                &vector(&[("A", Scalar::from("x_")), ("B", Scalar::Integer(1))]),
            )
            .unwrap_err();
        assert!(err.to_string().contains("does not decode"));
    }

    #[test]
    fn test_path_separator_is_collision() {
        let codec = NamingCodec::new("-", "");
        assert!(codec
            .encode("p", &vector(&[("DIR", Scalar::from("a/b"))]))
            .is_err());
    }

    #[test]
    fn test_decode_missing_extension() {
        let codec = NamingCodec::new("-", ".out");
        let err = codec.decode("thread-N=4.bin").unwrap_err();
        assert!(matches!(err, Error::MalformedFileName { .. }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_decode_token_without_equals() {
        let codec = NamingCodec::new("-", ".out");
        assert!(codec.decode("thread-4t-2p.out").is_err());
    }
}
