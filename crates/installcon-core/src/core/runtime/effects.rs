use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use anyhow::{anyhow, Context, Result};

use super::net::{build_http_client, fetch_bytes};
use super::process::{run_command, RunOutput};

/// Mode applied to generated wrappers: owner rwx, group and other r-x.
pub(crate) const WRAPPER_MODE: u32 = 0o755;

pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &str, args: &[String]) -> Result<RunOutput>;
}

pub trait ArchiveFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

pub trait FileSystem: Send + Sync {
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;
    /// Replaces `path` by renaming a fully written sibling temp file over it.
    fn write_atomic(&self, path: &Path, contents: &[u8]) -> Result<()>;
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    fn remove_file(&self, path: &Path) -> Result<()>;
    fn set_executable(&self, path: &Path) -> Result<()>;
    fn is_file(&self, path: &Path) -> bool;
    fn is_writable_dir(&self, path: &Path) -> bool;
}

pub trait Effects: Send + Sync {
    fn runner(&self) -> &dyn CommandRunner;
    fn fetcher(&self) -> &dyn ArchiveFetcher;
    fn fs(&self) -> &dyn FileSystem;
}

pub struct SystemEffects {
    runner: Arc<SystemCommandRunner>,
    fetcher: Arc<SystemArchiveFetcher>,
    fs: Arc<SystemFileSystem>,
}

impl SystemEffects {
    #[must_use]
    pub fn new() -> Self {
        Self {
            runner: Arc::new(SystemCommandRunner),
            fetcher: Arc::new(SystemArchiveFetcher),
            fs: Arc::new(SystemFileSystem),
        }
    }
}

impl Default for SystemEffects {
    fn default() -> Self {
        Self::new()
    }
}

impl Effects for SystemEffects {
    fn runner(&self) -> &dyn CommandRunner {
        self.runner.as_ref()
    }

    fn fetcher(&self) -> &dyn ArchiveFetcher {
        self.fetcher.as_ref()
    }

    fn fs(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }
}

struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<RunOutput> {
        run_command(program, args)
    }
}

struct SystemArchiveFetcher;

impl ArchiveFetcher for SystemArchiveFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let client = build_http_client()?;
        fetch_bytes(&client, url)
    }
}

pub(crate) struct SystemFileSystem;

impl FileSystem for SystemFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        fs::write(path, contents).with_context(|| format!("writing {}", path.display()))
    }

    fn write_atomic(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow!("{} has no parent directory", path.display()))?;
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
        let mut staged = tempfile::NamedTempFile::new_in(parent)
            .with_context(|| format!("staging write in {}", parent.display()))?;
        staged
            .write_all(contents)
            .with_context(|| format!("writing staged copy of {}", path.display()))?;
        staged
            .persist(path)
            .map(|_| ())
            .map_err(|err| anyhow!(err.error))
            .with_context(|| format!("replacing {}", path.display()))
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).with_context(|| format!("creating {}", path.display()))
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).with_context(|| format!("removing file {}", path.display()))
    }

    #[cfg(unix)]
    fn set_executable(&self, path: &Path) -> Result<()> {
        let mut perms = fs::metadata(path)
            .with_context(|| format!("metadata for {}", path.display()))?
            .permissions();
        perms.set_mode(WRAPPER_MODE);
        fs::set_permissions(path, perms)
            .with_context(|| format!("setting permissions on {}", path.display()))
    }

    #[cfg(not(unix))]
    fn set_executable(&self, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_writable_dir(&self, path: &Path) -> bool {
        if !path.is_dir() {
            return false;
        }
        tempfile::Builder::new()
            .prefix(".installcon-write-check")
            .tempfile_in(path)
            .is_ok()
    }
}

pub type SharedEffects = Arc<dyn Effects>;
