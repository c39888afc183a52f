use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use dirs_next::home_dir;
use installcon_domain::INDEX_DIR;
use tracing::debug;

use crate::core::tools::Activation;

pub(crate) const HOME_ENV: &str = "INSTALLCON_HOME";
pub(crate) const CONDA_ENV: &str = "INSTALLCON_CONDA";
pub(crate) const BIN_DIR_ENV: &str = "INSTALLCON_BIN_DIR";
pub(crate) const ACTIVATION_ENV: &str = "INSTALLCON_ACTIVATION";

#[derive(Debug, Clone)]
pub(crate) struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    pub(crate) fn capture() -> Self {
        Self {
            vars: env::vars().collect(),
        }
    }

    pub(crate) fn var(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    #[cfg(test)]
    pub(crate) fn testing(pairs: &[(&str, &str)]) -> Self {
        let vars = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Self { vars }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) index: IndexConfig,
    pub(crate) conda: CondaConfig,
    pub(crate) wrappers: WrapperConfig,
}

impl Config {
    pub(crate) fn from_snapshot(snapshot: &EnvSnapshot) -> Result<Self> {
        let index_dir = match snapshot.var(HOME_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => snapshot
                .var("HOME")
                .map(PathBuf::from)
                .or_else(home_dir)
                .ok_or_else(|| anyhow!("home directory not found"))?
                .join(INDEX_DIR),
        };
        let search_path = snapshot
            .var("PATH")
            .map(|raw| env::split_paths(raw).collect())
            .unwrap_or_default();
        let executable = match snapshot.var(CONDA_ENV) {
            Some(explicit) => Some(PathBuf::from(explicit)),
            None => snapshot
                .var("PATH")
                .and_then(|raw| which::which_in("conda", Some(raw), ".").ok()),
        };
        let activation = match snapshot.var(ACTIVATION_ENV) {
            Some(raw) => raw.parse()?,
            None => Activation::default(),
        };
        debug!(
            index = %index_dir.display(),
            conda = ?executable,
            %activation,
            "resolved configuration"
        );
        Ok(Self {
            index: IndexConfig { dir: index_dir },
            conda: CondaConfig {
                executable,
                root_prefix: conda_root_prefix(snapshot),
            },
            wrappers: WrapperConfig {
                bin_dir: snapshot.var(BIN_DIR_ENV).map(PathBuf::from),
                search_path,
                activation,
            },
        })
    }

    #[must_use]
    pub fn index(&self) -> &IndexConfig {
        &self.index
    }

    #[must_use]
    pub fn conda(&self) -> &CondaConfig {
        &self.conda
    }

    #[must_use]
    pub fn wrappers(&self) -> &WrapperConfig {
        &self.wrappers
    }
}

#[derive(Debug, Clone)]
pub struct IndexConfig {
    pub dir: PathBuf,
}

impl IndexConfig {
    #[must_use]
    pub fn file(&self) -> PathBuf {
        self.dir.join(installcon_domain::INDEX_FILE)
    }
}

#[derive(Debug, Clone)]
pub struct CondaConfig {
    pub executable: Option<PathBuf>,
    pub root_prefix: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct WrapperConfig {
    pub bin_dir: Option<PathBuf>,
    pub search_path: Vec<PathBuf>,
    pub activation: Activation,
}

fn conda_root_prefix(snapshot: &EnvSnapshot) -> Option<PathBuf> {
    // CONDA_PREFIX_1 holds the base prefix while another environment is active.
    if let Some(base) = snapshot.var("CONDA_PREFIX_1") {
        return Some(PathBuf::from(base));
    }
    if let Some(exe) = snapshot.var("CONDA_EXE") {
        if let Some(root) = Path::new(exe).parent().and_then(Path::parent) {
            return Some(root.to_path_buf());
        }
    }
    snapshot
        .var("CONDA_PREFIX")
        .map(|prefix| strip_env_suffix(Path::new(prefix)))
}

fn strip_env_suffix(prefix: &Path) -> PathBuf {
    let envs_parent = prefix.parent().filter(|parent| {
        parent
            .file_name()
            .is_some_and(|name| name.eq_ignore_ascii_case("envs"))
    });
    match envs_parent.and_then(Path::parent) {
        Some(root) => root.to_path_buf(),
        None => prefix.to_path_buf(),
    }
}
