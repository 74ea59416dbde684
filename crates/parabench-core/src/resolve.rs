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

//! Per-program definition resolution.
//!
//! Every program starts from a copy of the global definitions. Its table may
//! then exclude names (which must exist) and add or replace definitions. A
//! program whose table sets `skip = true`, or which is listed in
//! `skip_programs`, is left out entirely.

use crate::config::{BuildSpecification, CompilationSpec};
use crate::error::{Error, Result};
use crate::value::DefinitionSet;
use indexmap::IndexMap;
use std::path::Path;
use tracing::{debug, warn};

/// Source file extension; one program per file.
pub const SOURCE_EXTENSION: &str = "c";

/// Program name to its resolved definitions, in program name order.
pub type ResolvedDefinitions = IndexMap<String, DefinitionSet>;

/// List the programs in a source directory, sorted by name.
pub fn discover_programs(source_dir: &Path) -> Result<Vec<String>> {
    let entries = std::fs::read_dir(source_dir).map_err(|e| {
        Error::configuration(format!(
            "cannot list source directory '{}': {}",
            source_dir.display(),
            e
        ))
    })?;

    let mut programs = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| Error::io_error(source_dir, e))?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(SOURCE_EXTENSION)
        {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            programs.push(stem.to_string());
        }
    }
    programs.sort();
    Ok(programs)
}

/// Resolve the definitions of each named program.
///
/// # Errors
///
/// [`Error::Configuration`] when a program excludes a definition that is not
/// among the global definitions.
pub fn resolve_programs<I, S>(compilation: &CompilationSpec, program_names: I) -> Result<ResolvedDefinitions>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut resolved = ResolvedDefinitions::new();

    for program in program_names {
        let program = program.into();
        let Some(program_spec) = compilation.programs.get(&program) else {
            resolved.insert(program, compilation.definitions.clone());
            continue;
        };

        if program_spec.skip {
            debug!(program = %program, "skipped by its program table");
            continue;
        }

        let mut definitions = compilation.definitions.clone();
        for excluded in program_spec.exclude_definitions.names() {
            if definitions.remove(excluded).is_none() {
                return Err(Error::configuration(format!(
                    "program '{}' excludes definition '{}', which is not defined",
                    program, excluded
                )));
            }
        }
        for definition in program_spec.definitions.iter() {
            definitions.insert(definition.name, definition.value.clone());
        }

        resolved.insert(program, definitions);
    }

    Ok(resolved)
}

/// Discover the programs of a specification and resolve their definitions.
///
/// Programs in `skip_programs` are dropped before resolution, so their tables
/// are not checked.
pub fn resolve(spec: &BuildSpecification) -> Result<ResolvedDefinitions> {
    let compilation = &spec.compilation;
    let discovered = discover_programs(&compilation.source_file_directory)?;

    for configured in compilation.programs.keys() {
        if !discovered.contains(configured) {
            warn!(
                program = %configured,
                directory = %compilation.source_file_directory.display(),
                "program table has no matching source file"
            );
        }
    }

    resolve_programs(
        compilation,
        discovered.into_iter().filter(|p| !spec.is_skipped(p)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Exclusions, ProgramSpec};
    use crate::value::{DefinitionValue, Scalar};
    use std::path::PathBuf;

    fn compilation() -> CompilationSpec {
        CompilationSpec {
            compiler: "gcc".to_string(),
            compilation_flags: vec![],
            linker_flags: vec![],
            source_file_directory: PathBuf::from("src"),
            binary_output_directory: PathBuf::from("build"),
            binary_file_definition_delimiter: "-".to_string(),
            binary_file_extension: ".out".to_string(),
            definitions: [
                ("THREAD_COUNT", DefinitionValue::Swept(vec![Scalar::Integer(2), Scalar::Integer(4)])),
                ("PROCESS_COUNT", DefinitionValue::Swept(vec![Scalar::Integer(2), Scalar::Integer(6)])),
                ("BUFFER", DefinitionValue::Fixed(Scalar::Integer(64))),
            ]
            .into_iter()
            .collect(),
            programs: IndexMap::new(),
        }
    }

    #[test]
    fn test_program_without_table_gets_globals() {
        let compilation = compilation();
        let resolved = resolve_programs(&compilation, ["serial"]).unwrap();
        assert_eq!(resolved["serial"], compilation.definitions);
    }

    #[test]
    fn test_exclusions_single_and_list() {
        let mut compilation = compilation();
        compilation.programs.insert(
            "thread".to_string(),
            ProgramSpec {
                exclude_definitions: Exclusions::One("PROCESS_COUNT".to_string()),
                ..Default::default()
            },
        );
        compilation.programs.insert(
            "serial".to_string(),
            ProgramSpec {
                exclude_definitions: Exclusions::Many(vec![
                    "THREAD_COUNT".to_string(),
                    "PROCESS_COUNT".to_string(),
                ]),
                ..Default::default()
            },
        );

        let resolved = resolve_programs(&compilation, ["serial", "thread"]).unwrap();
        assert_eq!(
            resolved["thread"].names().collect::<Vec<_>>(),
            vec!["THREAD_COUNT", "BUFFER"]
        );
        assert_eq!(resolved["serial"].names().collect::<Vec<_>>(), vec!["BUFFER"]);
        // Global definitions are untouched by per-program edits.
        assert_eq!(compilation.definitions.len(), 3);
    }

    #[test]
    fn test_unknown_exclusion_is_configuration_error() {
        let mut compilation = compilation();
        compilation.programs.insert(
            "thread".to_string(),
            ProgramSpec {
                exclude_definitions: Exclusions::One("NUMBER_OF_THREADS".to_string()),
                ..Default::default()
            },
        );

        let err = resolve_programs(&compilation, ["thread"]).unwrap_err();
        assert!(err.is_fatal());
        let msg = err.to_string();
        assert!(msg.contains("thread"));
        assert!(msg.contains("NUMBER_OF_THREADS"));
    }

    #[test]
    fn test_skip_flag_omits_program() {
        let mut compilation = compilation();
        compilation.programs.insert(
            "broken".to_string(),
            ProgramSpec {
                skip: true,
                ..Default::default()
            },
        );
        let resolved = resolve_programs(&compilation, ["broken", "thread"]).unwrap();
        assert_eq!(resolved.keys().collect::<Vec<_>>(), vec!["thread"]);
    }

    #[test]
    fn test_overrides_replace_in_place_and_append() {
        let mut compilation = compilation();
        compilation.programs.insert(
            "thread".to_string(),
            ProgramSpec {
                definitions: [
                    ("THREAD_COUNT", DefinitionValue::Swept(vec![Scalar::Integer(16)])),
                    ("EXTRA", DefinitionValue::Fixed(Scalar::Boolean(true))),
                ]
                .into_iter()
                .collect(),
                ..Default::default()
            },
        );

        let resolved = resolve_programs(&compilation, ["thread"]).unwrap();
        let thread = &resolved["thread"];
        assert_eq!(
            thread.names().collect::<Vec<_>>(),
            vec!["THREAD_COUNT", "PROCESS_COUNT", "BUFFER", "EXTRA"]
        );
        assert_eq!(
            thread.get("THREAD_COUNT"),
            Some(&DefinitionValue::Swept(vec![Scalar::Integer(16)]))
        );
    }

    #[test]
    fn test_discover_programs_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["thread.c", "serial.c", "notes.txt", "helper.h"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.c")).unwrap();

        let programs = discover_programs(dir.path()).unwrap();
        assert_eq!(programs, vec!["serial", "thread"]);
    }

    #[test]
    fn test_discover_missing_directory() {
        let err = discover_programs(Path::new("/nonexistent/parabench/src")).unwrap_err();
        assert!(err.is_fatal());
    }
}
