use std::fmt;

const ENV_PREFIX: &str = "installcon_";

/// Strips a conda match spec such as `foo>=1.2` or `foo=1.2=py39_0` down to
/// the bare package name `foo`.
#[must_use]
pub fn package_name(spec: &str) -> &str {
    let spec = spec.trim();
    spec.split(|ch: char| "=<>!~ ".contains(ch))
        .next()
        .unwrap_or(spec)
}

/// Name of the conda environment that hosts a single package.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnvName(String);

impl EnvName {
    /// Environment for `spec`; version constraints do not change the name.
    #[must_use]
    pub fn for_package(spec: &str) -> Self {
        Self(format!("{ENV_PREFIX}{}", package_name(spec)))
    }

    /// Wraps a raw environment name read back from the index or from conda.
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Package this environment was created for. Names without the managed
    /// prefix are returned unchanged.
    #[must_use]
    pub fn package(&self) -> &str {
        self.0.strip_prefix(ENV_PREFIX).unwrap_or(&self.0)
    }
}

impl fmt::Display for EnvName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EnvName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
