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

//! Wall/user/system timings and the portable `time -p` output format.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Elapsed seconds of one execution.
///
/// `user + sys` may exceed `real` for programs running on several cores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingTriple {
    pub real: f64,
    pub user: f64,
    pub sys: f64,
}

impl TimingTriple {
    pub fn new(real: f64, user: f64, sys: f64) -> Self {
        Self { real, user, sys }
    }
}

const LABELS: [&str; 3] = ["real", "user", "sys"];

/// Parse the output of a timing wrapper in portability mode.
///
/// The output must be exactly three lines, `real`, `user` and `sys` in that
/// order, each followed by whitespace and a non-negative number of seconds.
///
/// ```
/// use parabench_core::{parse_portable_timing, TimingTriple};
///
/// let triple = parse_portable_timing("real 1.500000\nuser 1.200000\nsys 0.100000\n").unwrap();
/// assert_eq!(triple, TimingTriple::new(1.5, 1.2, 0.1));
/// ```
pub fn parse_portable_timing(text: &str) -> Result<TimingTriple> {
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() != LABELS.len() {
        return Err(Error::timing_parse(format!(
            "expected 3 lines (real, user, sys), found {}",
            lines.len()
        )));
    }

    let mut seconds = [0.0f64; 3];
    for ((line, label), slot) in lines.iter().zip(LABELS).zip(seconds.iter_mut()) {
        let rest = line
            .strip_prefix(label)
            .filter(|rest| rest.starts_with(char::is_whitespace))
            .ok_or_else(|| {
                Error::timing_parse(format!("expected line starting with '{}', got '{}'", label, line))
            })?;

        let value: f64 = rest.trim().parse().map_err(|_| {
            Error::timing_parse(format!("'{}' is not a number of seconds in '{}'", rest.trim(), line))
        })?;
        if !value.is_finite() || value < 0.0 {
            return Err(Error::timing_parse(format!(
                "'{}' is not a non-negative number of seconds",
                line
            )));
        }
        *slot = value;
    }

    Ok(TimingTriple::new(seconds[0], seconds[1], seconds[2]))
}
