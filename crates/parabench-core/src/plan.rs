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

//! Incremental build planning.
//!
//! The binary output directory is scanned once into a [`BinaryIndex`]. The
//! planner expands every program's matrix, names each variant, and keeps only
//! the variants whose file name is not in the index. Planning is idempotent:
//! with no compile in between, two plans are identical, and after the whole
//! plan has been compiled the next plan is empty.
//!
//! Identity is the file name alone. A binary left over from a build with
//! different flags is considered up to date; `force` replans everything.

use crate::error::{Error, Result};
use crate::matrix::expand;
use crate::naming::NamingCodec;
use crate::resolve::ResolvedDefinitions;
use crate::value::ParameterVector;
use indexmap::IndexMap;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// The file names present in the binary output directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinaryIndex {
    file_names: BTreeSet<String>,
}

impl BinaryIndex {
    /// Scan a directory. A missing directory yields an empty index.
    pub fn scan(dir: &Path) -> Result<Self> {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::io_error(dir, e)),
        };

        let mut file_names = BTreeSet::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::io_error(dir, e))?;
            if !entry.path().is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                file_names.insert(name.to_string());
            }
        }
        Ok(Self { file_names })
    }

    pub fn contains(&self, file_name: &str) -> bool {
        self.file_names.contains(file_name)
    }

    pub fn len(&self) -> usize {
        self.file_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.file_names.is_empty()
    }

    /// File names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.file_names.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for BinaryIndex {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            file_names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// One variant still to be compiled.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileJob {
    pub program: String,
    pub vector: ParameterVector,
    /// Encoded file name, relative to the binary output directory.
    pub file_name: String,
}

/// The variants to compile, grouped by program.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildPlan {
    jobs: IndexMap<String, Vec<CompileJob>>,
    desired: usize,
}

impl BuildPlan {
    /// Jobs of one program, in matrix order.
    pub fn program(&self, program: &str) -> &[CompileJob] {
        self.jobs.get(program).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Programs with their pending jobs (possibly none), in program order.
    pub fn programs(&self) -> impl Iterator<Item = (&str, &[CompileJob])> {
        self.jobs.iter().map(|(p, jobs)| (p.as_str(), jobs.as_slice()))
    }

    pub fn jobs(&self) -> impl Iterator<Item = &CompileJob> {
        self.jobs.values().flatten()
    }

    pub fn into_jobs(self) -> Vec<CompileJob> {
        self.jobs.into_values().flatten().collect()
    }

    /// Number of jobs to run.
    pub fn len(&self) -> usize {
        self.jobs.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of variants the specification describes, built or not.
    pub fn desired(&self) -> usize {
        self.desired
    }
}

/// Plan the compile jobs needed to bring the index up to date.
///
/// With `force`, every variant is planned regardless of the index.
///
/// # Errors
///
/// [`Error::NamingCollision`] when a variant cannot be named, or when two
/// distinct variants of a program encode to the same file name.
pub fn plan_builds(
    resolved: &ResolvedDefinitions,
    codec: &NamingCodec,
    index: &BinaryIndex,
    force: bool,
) -> Result<BuildPlan> {
    let mut plan = BuildPlan::default();

    for (program, definitions) in resolved {
        let mut seen: HashMap<String, ParameterVector> = HashMap::new();
        let mut pending = Vec::new();

        for vector in expand(definitions) {
            let file_name = codec.encode(program, &vector)?;
            if let Some(previous) = seen.get(&file_name) {
                return Err(Error::naming_collision(
                    program.as_str(),
                    format!(
                        "[{}] and [{}] both encode to '{}'",
                        previous, vector, file_name
                    ),
                ));
            }
            seen.insert(file_name.clone(), vector.clone());
            plan.desired += 1;

            if force || !index.contains(&file_name) {
                pending.push(CompileJob {
                    program: program.clone(),
                    vector,
                    file_name,
                });
            }
        }

        plan.jobs.insert(program.clone(), pending);
    }

    Ok(plan)
}
