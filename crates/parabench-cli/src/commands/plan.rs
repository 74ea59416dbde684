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

//! Plan command - dry run of the build phase

use super::load_specification;
use crate::error::CliError;
use colored::Colorize;
use parabench_core::{plan_builds, resolve, BinaryIndex};
use std::path::Path;

/// Print the variants `build` would compile.
///
/// Nothing is compiled or written. With `force`, every variant is listed
/// regardless of what is already in the binary output directory. With
/// `verbose`, each file name is followed by its parameters.
///
/// # Errors
///
/// Returns `Err` on any configuration or naming error, or if the binary
/// output directory cannot be listed.
pub fn plan(config: &Path, force: bool, verbose: bool) -> Result<(), CliError> {
    let spec = load_specification(config)?;
    let resolved = resolve(&spec)?;
    let index = BinaryIndex::scan(&spec.compilation.binary_output_directory)?;
    let plan = plan_builds(&resolved, &spec.naming_codec(), &index, force)?;

    for (program, jobs) in plan.programs() {
        let desired = resolved.get(program).map_or(0, |d| d.variant_count());
        let status = if jobs.is_empty() {
            "✓".green().bold()
        } else {
            "→".yellow().bold()
        };
        println!(
            "{} {}: {} of {} variants to build",
            status,
            program.bright_white().bold(),
            jobs.len(),
            desired
        );
        for job in jobs {
            println!("    {}", job.file_name);
            if verbose {
                println!("      {}", job.vector.to_string().dimmed());
            }
        }
    }

    println!();
    println!(
        "{} {} of {} variants ({} already built)",
        "Planned:".bright_cyan(),
        plan.len(),
        plan.desired(),
        plan.desired() - plan.len()
    );
    Ok(())
}
