use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Result};
use installcon_domain::EnvName;
use serde::{Deserialize, Serialize};

use crate::effects::FileSystem;

/// How a wrapper puts the environment in place before running the program.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Activation {
    /// Export the environment's prefix and `PATH`, then exec the program by
    /// absolute path. Works from any shell, interactive or not.
    #[default]
    Direct,
    /// Source the user's bash profile and `conda activate` the environment.
    /// Depends on conda's shell hook being installed in that profile.
    Profile,
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Activation::Direct => "direct",
            Activation::Profile => "profile",
        })
    }
}

impl FromStr for Activation {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "direct" => Ok(Activation::Direct),
            "profile" => Ok(Activation::Profile),
            other => bail!("unknown activation mode `{other}` (expected `direct` or `profile`)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ShellProfile {
    Bashrc,
    BashProfile,
}

impl ShellProfile {
    pub(crate) fn for_os(os: &str) -> Self {
        if os == "macos" {
            ShellProfile::BashProfile
        } else {
            ShellProfile::Bashrc
        }
    }

    pub(crate) fn current() -> Self {
        Self::for_os(std::env::consts::OS)
    }

    pub(crate) fn file_name(self) -> &'static str {
        match self {
            ShellProfile::Bashrc => ".bashrc",
            ShellProfile::BashProfile => ".bash_profile",
        }
    }
}

pub(crate) struct WrapperScript<'a> {
    pub(crate) name: &'a str,
    pub(crate) binary: &'a Path,
    pub(crate) env: &'a EnvName,
    pub(crate) prefix: &'a Path,
    pub(crate) activation: Activation,
    pub(crate) profile: ShellProfile,
}

impl WrapperScript<'_> {
    pub(crate) fn render(&self) -> String {
        let binary = shell_quote(&self.binary.display().to_string());
        match self.activation {
            Activation::Direct => {
                let prefix = self.prefix.display().to_string();
                let bin_dir = self.prefix.join("bin").display().to_string();
                format!(
                    "#!/usr/bin/env sh\n\
                     # installcon wrapper for {name} (conda environment {env})\n\
                     CONDA_PREFIX={prefix}\n\
                     export CONDA_PREFIX\n\
                     PATH={bin_dir}:\"$PATH\"\n\
                     export PATH\n\
                     exec {binary} \"$@\"\n",
                    name = self.name,
                    env = self.env,
                    prefix = shell_quote(&prefix),
                    bin_dir = shell_quote(&bin_dir),
                )
            }
            Activation::Profile => format!(
                "#!/usr/bin/env bash\n\
                 # installcon wrapper for {name} (conda environment {env})\n\
                 . \"$HOME/{profile}\"\n\
                 conda activate {env_quoted}\n\
                 exec {binary} \"$@\"\n",
                name = self.name,
                env = self.env,
                profile = self.profile.file_name(),
                env_quoted = shell_quote(self.env.as_str()),
            ),
        }
    }
}

/// Writes `<dest_dir>/<name>` and marks it executable.
pub(crate) fn write_wrapper(
    fs: &dyn FileSystem,
    dest_dir: &Path,
    script: &WrapperScript<'_>,
) -> Result<PathBuf> {
    let path = dest_dir.join(script.name);
    fs.write(&path, script.render().as_bytes())?;
    fs.set_executable(&path)?;
    Ok(path)
}

fn shell_quote(raw: &str) -> String {
    format!("'{}'", raw.replace('\'', r"'\''"))
}
