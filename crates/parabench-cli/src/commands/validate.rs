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

//! Validate command - build specification and variant naming checks

use super::load_specification;
use crate::error::CliError;
use colored::Colorize;
use parabench_core::{plan_builds, resolve, BinaryIndex, DefinitionValue};
use std::path::Path;
use tracing::info;

/// Validate a build specification.
///
/// Loads the specification, resolves every program's definitions and names
/// every variant, so that a later `build` cannot fail on configuration or
/// naming.
///
/// # Errors
///
/// Returns `Err` if:
/// - The specification cannot be read or is invalid
/// - A program excludes a definition that is not defined
/// - A variant cannot be named, or two variants share a file name
///
/// # Output
///
/// Prints one block per program with its resolved definitions and the number
/// of variants they expand to.
pub fn validate(config: &Path) -> Result<(), CliError> {
    let spec = load_specification(config)?;
    let resolved = resolve(&spec)?;
    // Naming is checked against an empty index so every variant is encoded.
    let plan = plan_builds(&resolved, &spec.naming_codec(), &BinaryIndex::default(), true)?;

    println!("{} {}", "✓".green().bold(), config.display());
    for (program, definitions) in &resolved {
        println!(
            "  {} ({} variant{})",
            program.bright_white().bold(),
            definitions.variant_count(),
            if definitions.variant_count() == 1 { "" } else { "s" }
        );
        for definition in definitions.iter() {
            println!("    {} = {}", definition.name, render_value(definition.value));
        }
    }
    if !spec.skip_programs.is_empty() {
        println!("  Skipped: {}", spec.skip_programs.join(", "));
    }

    info!(
        programs = resolved.len(),
        variants = plan.desired(),
        "build specification is valid"
    );
    Ok(())
}

fn render_value(value: &DefinitionValue) -> String {
    match value {
        DefinitionValue::Swept(values) => format!(
            "[{}]",
            values
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        ),
        DefinitionValue::Fixed(value) => value.to_string(),
    }
}
