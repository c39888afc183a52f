use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::naming::EnvName;

/// One wrapper script written by an install.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryRecord {
    pub name: String,
    pub script_path: String,
    pub script_desc: String,
}

/// Installed wrappers keyed by the environment that backs them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    #[serde(default)]
    packages: IndexMap<String, Vec<BinaryRecord>>,
}

impl Index {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the wrappers for `env`, replacing any previous list.
    pub fn insert(&mut self, env: &EnvName, records: Vec<BinaryRecord>) {
        self.packages.insert(env.as_str().to_string(), records);
    }

    /// Drops the entry for `env`, keeping the order of the remaining ones.
    pub fn remove(&mut self, env: &EnvName) -> Option<Vec<BinaryRecord>> {
        self.packages.shift_remove(env.as_str())
    }

    #[must_use]
    pub fn get(&self, env: &EnvName) -> Option<&[BinaryRecord]> {
        self.packages.get(env.as_str()).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EnvName, &[BinaryRecord])> {
        self.packages
            .iter()
            .map(|(env, records)| (EnvName::from_raw(env.clone()), records.as_slice()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }
}
