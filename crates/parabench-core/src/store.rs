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

//! Aggregated timing results of one execution run.
//!
//! A [`ResultStore`] is created empty at the start of a run, filled as jobs
//! complete, and serialized once at the end. It never merges with an earlier
//! snapshot: a new run replaces the previous results.
//!
//! The snapshot is JSON:
//!
//! ```json
//! {
//!   "version": 1,
//!   "programs": {
//!     "thread": [
//!       {
//!         "parameters": [{ "name": "NUMBER_OF_THREADS", "value": "4" }],
//!         "timing": { "real": 1.5, "user": 1.2, "sys": 0.1 }
//!       }
//!     ]
//!   }
//! }
//! ```

use crate::error::{Error, Result};
use crate::timing::TimingTriple;
use crate::value::ParameterVector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Snapshot format version written by [`ResultStore::serialize`].
pub const SNAPSHOT_VERSION: u32 = 1;

/// Program name to (decoded parameter vector to timing).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultStore {
    programs: BTreeMap<String, BTreeMap<ParameterVector<String>, TimingTriple>>,
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    programs: BTreeMap<String, Vec<SnapshotEntry>>,
}

#[derive(Serialize, Deserialize)]
struct SnapshotEntry {
    parameters: ParameterVector<String>,
    timing: TimingTriple,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the timing of one variant, replacing any earlier value.
    pub fn record(
        &mut self,
        program: impl Into<String>,
        vector: ParameterVector<String>,
        timing: TimingTriple,
    ) {
        self.programs
            .entry(program.into())
            .or_default()
            .insert(vector, timing);
    }

    pub fn get(&self, program: &str, vector: &ParameterVector<String>) -> Option<&TimingTriple> {
        self.programs.get(program)?.get(vector)
    }

    /// Program names in sorted order.
    pub fn programs(&self) -> impl Iterator<Item = &str> {
        self.programs.keys().map(String::as_str)
    }

    /// Number of recorded variants across all programs.
    pub fn len(&self) -> usize {
        self.programs.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serialize to the JSON snapshot format. Output is sorted by program
    /// and parameter vector, so equal stores serialize identically.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            programs: self
                .programs
                .iter()
                .map(|(program, results)| {
                    let entries = results
                        .iter()
                        .map(|(parameters, timing)| SnapshotEntry {
                            parameters: parameters.clone(),
                            timing: *timing,
                        })
                        .collect();
                    (program.clone(), entries)
                })
                .collect(),
        };
        Ok(serde_json::to_vec_pretty(&snapshot)?)
    }

    /// Rebuild a store from a snapshot.
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_slice(bytes)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(Error::configuration(format!(
                "unsupported result snapshot version {} (expected {})",
                snapshot.version, SNAPSHOT_VERSION
            )));
        }

        let mut store = Self::new();
        for (program, entries) in snapshot.programs {
            for entry in entries {
                store.record(program.clone(), entry.parameters, entry.timing);
            }
        }
        Ok(store)
    }

    /// Serialize and write to a file, replacing it.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let bytes = self.serialize()?;
        std::fs::write(path, bytes).map_err(|e| Error::io_error(path, e))
    }

    pub fn read_from(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| Error::io_error(path, e))?;
        Self::deserialize(&bytes)
    }
}
