//! Environment contribution for consumers of a package.
//!
//! The only contribution is `bin/` appended to `PATH`. It is returned as
//! data rather than applied to the current process; callers apply it to a
//! child [`std::process::Command`] or render it as a shell snippet.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::error::RecipeError;

/// Script written for POSIX shells.
pub const SH_SCRIPT: &str = "doxy-env.sh";

/// Script written for `cmd.exe`.
pub const BAT_SCRIPT: &str = "doxy-env.bat";

/// Shell dialect for [`EnvContribution::render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shell {
    #[default]
    Sh,
    Cmd,
    PowerShell,
}

impl std::str::FromStr for Shell {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sh" | "bash" | "zsh" | "posix" => Ok(Self::Sh),
            "cmd" | "bat" => Ok(Self::Cmd),
            "powershell" | "pwsh" | "ps" => Ok(Self::PowerShell),
            other => Err(format!("unknown shell: {other}")),
        }
    }
}

/// Entries appended to a search-path variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvContribution {
    pub var: &'static str,
    pub entries: Vec<PathBuf>,
}

impl EnvContribution {
    /// `PATH` += `<package_root>/bin`
    pub fn for_package(package_root: &Path) -> Self {
        Self {
            var: "PATH",
            entries: vec![package_root.join("bin")],
        }
    }

    /// Append the entries after `existing`. Existing content is kept as is.
    ///
    /// # Errors
    ///
    /// Fails if an entry contains the platform's path separator.
    pub fn append_to(&self, existing: Option<&OsStr>) -> Result<OsString, std::env::JoinPathsError> {
        let mut paths: Vec<PathBuf> = existing
            .map(|e| std::env::split_paths(e).collect())
            .unwrap_or_default();
        paths.extend(self.entries.iter().cloned());
        std::env::join_paths(paths)
    }

    /// The value the variable takes when appended to this process's value.
    pub fn apply_to_current(&self) -> Result<OsString, std::env::JoinPathsError> {
        self.append_to(std::env::var_os(self.var).as_deref())
    }

    /// One line that appends the entries in the given shell.
    pub fn render(&self, shell: Shell) -> String {
        let var = self.var;
        match shell {
            Shell::Sh => {
                let joined = self.joined(":");
                format!("export {var}=\"${{{var}:+${var}:}}{joined}\"")
            }
            Shell::Cmd => {
                let joined = self.joined(";");
                format!("set \"{var}=%{var}%;{joined}\"")
            }
            Shell::PowerShell => {
                let joined = self.joined(";").replace('\'', "''");
                format!("$env:{var} = $env:{var} + [IO.Path]::PathSeparator + '{joined}'")
            }
        }
    }

    fn joined(&self, sep: &str) -> String {
        self.entries
            .iter()
            .map(|p| p.to_string_lossy())
            .collect::<Vec<_>>()
            .join(sep)
    }

    /// Write `doxy-env.sh` and `doxy-env.bat` into `dir`.
    pub fn write_scripts(&self, dir: &Path) -> Result<Vec<PathBuf>, RecipeError> {
        let sh = dir.join(SH_SCRIPT);
        std::fs::write(&sh, format!("#!/bin/sh\n{}\n", self.render(Shell::Sh)))?;

        let bat = dir.join(BAT_SCRIPT);
        std::fs::write(&bat, format!("@echo off\r\n{}\r\n", self.render(Shell::Cmd)))?;

        Ok(vec![sh, bat])
    }
}
