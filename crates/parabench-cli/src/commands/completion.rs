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

//! Shell completion scripts and their installation instructions.

use crate::error::CliError;
use clap::Command;
use clap_complete::{generate, Shell};
use std::io::{self, Write};

/// Write the completion script for `shell` to `out`.
///
/// ```
/// use clap::CommandFactory;
/// use clap_complete::Shell;
/// use parabench_cli::cli::Cli;
/// use parabench_cli::commands::write_completion;
///
/// let mut script = Vec::new();
/// write_completion(Shell::Bash, &mut Cli::command(), &mut script);
/// assert!(String::from_utf8_lossy(&script).contains("parabench"));
/// ```
pub fn write_completion(shell: Shell, cmd: &mut Command, out: &mut dyn Write) {
    let name = cmd.get_name().to_string();
    generate(shell, cmd, name, out);
}

/// Print the completion script for `shell` to stdout.
///
/// # Errors
///
/// Returns `Err` if stdout cannot be flushed.
pub fn completion(shell: Shell, cmd: &mut Command) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    write_completion(shell, cmd, &mut lock);
    lock.flush().map_err(|e| CliError::io_error("<stdout>", e))
}

/// How to enable completions for `shell`, for the current session and
/// persistently.
pub fn installation_instructions(shell: Shell) -> &'static str {
    match shell {
        Shell::Bash => {
            r#"# Bash completion installation:

# For current session only:
eval "$(parabench completion bash)"

# For persistent installation, add to your ~/.bashrc:
echo 'eval "$(parabench completion bash)"' >> ~/.bashrc

# Or save to completions directory:
parabench completion bash > ~/.local/share/bash-completion/completions/parabench
"#
        }
        Shell::Zsh => {
            r#"# Zsh completion installation:

# For current session only:
eval "$(parabench completion zsh)"

# Or save to a directory in $fpath:
parabench completion zsh > ~/.zsh/completions/_parabench
"#
        }
        Shell::Fish => {
            r#"# Fish completion installation:

parabench completion fish > ~/.config/fish/completions/parabench.fish
"#
        }
        Shell::PowerShell => {
            r#"# PowerShell completion installation:

# Add this line to the file named by $PROFILE:
parabench completion powershell | Out-String | Invoke-Expression
"#
        }
        Shell::Elvish => {
            r#"# Elvish completion installation:

# Add this line to ~/.elvish/rc.elv:
eval (parabench completion elvish | slurp)
"#
        }
        _ => "# No installation instructions for this shell; redirect the script where your shell loads completions.\n",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::CommandFactory;

    #[test]
    fn test_every_shell_mentions_itself() {
        for (shell, needle) in [
            (Shell::Bash, "bash"),
            (Shell::Zsh, "zsh"),
            (Shell::Fish, "fish"),
            (Shell::PowerShell, "powershell"),
            (Shell::Elvish, "elvish"),
        ] {
            assert!(installation_instructions(shell).contains(needle));
        }
    }

    #[test]
    fn test_script_covers_subcommands() {
        let mut script = Vec::new();
        write_completion(Shell::Fish, &mut Cli::command(), &mut script);
        let script = String::from_utf8(script).unwrap();
        for subcommand in ["validate", "plan", "build", "execute"] {
            assert!(script.contains(subcommand), "missing {subcommand}");
        }
    }
}
