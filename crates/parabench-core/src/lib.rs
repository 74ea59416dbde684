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

//! Core engine for parabench.
//!
//! Takes a build specification, expands each program's definitions into the
//! Cartesian product of parameter vectors, names every variant with a
//! reversible file name, and plans the compile jobs missing from the binary
//! directory. After building, the binaries are decoded back to their
//! parameters, timed, and the results collected into a [`ResultStore`].
//!
//! ```
//! use parabench_core::{expand, DefinitionSet, NamingCodec, Scalar};
//!
//! let mut definitions = DefinitionSet::new();
//! definitions.insert("THREADS", vec![Scalar::Integer(2), Scalar::Integer(4)]);
//! definitions.insert("SIZE", Scalar::Integer(1024));
//!
//! let codec = NamingCodec::new("-", ".out");
//! let names: Vec<String> = expand(&definitions)
//!     .iter()
//!     .map(|vector| codec.encode("thread", vector).unwrap())
//!     .collect();
//!
//! assert_eq!(names, ["thread-THREADS=2-SIZE=1024.out", "thread-THREADS=4-SIZE=1024.out"]);
//! ```

pub mod compile;
pub mod config;
mod error;
pub mod execute;
mod matrix;
mod naming;
pub mod plan;
pub mod process;
pub mod resolve;
mod store;
mod timing;
mod value;

pub use config::{
    BuildSpecification, CompilationSpec, Exclusions, ExecutionSpec, ProgramSpec,
    DEFAULT_SPECIFICATION_FILE,
};
pub use error::{Error, Result};
pub use execute::{discover_binaries, time_binary, ExecutionContext, ExecutionJob};
pub use matrix::{expand, VariantMatrix};
pub use naming::{DecodedVariant, NamingCodec};
pub use plan::{plan_builds, BinaryIndex, BuildPlan, CompileJob};
pub use resolve::{resolve, ResolvedDefinitions};
pub use store::{ResultStore, SNAPSHOT_VERSION};
pub use timing::{parse_portable_timing, TimingTriple};
pub use value::{DefinitionSet, DefinitionValue, Parameter, ParameterDefinition, ParameterVector, Scalar};
