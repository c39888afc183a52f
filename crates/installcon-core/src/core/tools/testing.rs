//! Fakes shared by the unit tests: a scripted runner, an in-process conda,
//! and a sandboxed context that writes into a temp directory.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{anyhow, Result};
use installcon_domain::{package_name, parse_index, Index};
use serde_json::json;
use tempfile::TempDir;

use crate::config::{Config, EnvSnapshot};
use crate::effects::{ArchiveFetcher, CommandRunner, Effects, FileSystem, SystemFileSystem};
use crate::{
    install_package, list_index, uninstall_package, CommandContext, ExecutionOutcome,
    InstallRequest, ListRequest, RunOutput, UninstallRequest,
};

const ANY_PROGRAM: &str = "*";
const CHANNEL_URL: &str = "https://conda.test/";
const BUILD_SUFFIX: &str = "-1.0-0.tar.bz2";

/// Answers commands from a table keyed by program and argument line.
#[derive(Default)]
pub(crate) struct ScriptedRunner {
    responses: Mutex<HashMap<(String, String), RunOutput>>,
}

impl ScriptedRunner {
    /// Answers `args_line` regardless of which program runs it.
    pub(crate) fn respond(&self, args_line: &str, output: RunOutput) {
        self.respond_to(ANY_PROGRAM, args_line, output);
    }

    pub(crate) fn respond_to(&self, program: &str, args_line: &str, output: RunOutput) {
        self.responses
            .lock()
            .expect("responses lock")
            .insert((program.to_string(), args_line.to_string()), output);
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<RunOutput> {
        let line = args.join(" ");
        let responses = self.responses.lock().expect("responses lock");
        responses
            .get(&(program.to_string(), line.clone()))
            .or_else(|| responses.get(&(ANY_PROGRAM.to_string(), line.clone())))
            .cloned()
            .ok_or_else(|| anyhow!("no scripted response for `{program} {line}`"))
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum ArchiveCompression {
    Bzip2,
    Gzip,
    None,
}

/// Builds a package archive; entries ending in `/` become directories.
pub(crate) fn conda_archive(entries: &[&str], compression: ArchiveCompression) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for entry in entries {
        let mut header = tar::Header::new_gnu();
        if entry.ends_with('/') {
            header.set_entry_type(tar::EntryType::Directory);
            header.set_mode(0o755);
            header.set_size(0);
            builder
                .append_data(&mut header, entry, std::io::empty())
                .expect("append dir");
        } else {
            let body = b"#!/bin/sh\n";
            header.set_entry_type(tar::EntryType::Regular);
            header.set_mode(0o755);
            header.set_size(body.len() as u64);
            builder
                .append_data(&mut header, entry, &body[..])
                .expect("append file");
        }
    }
    let tar_bytes = builder.into_inner().expect("finish tar");
    match compression {
        ArchiveCompression::None => tar_bytes,
        ArchiveCompression::Bzip2 => {
            let mut encoder =
                bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::best());
            encoder.write_all(&tar_bytes).expect("bzip2 write");
            encoder.finish().expect("bzip2 finish")
        }
        ArchiveCompression::Gzip => {
            let mut encoder =
                flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
            encoder.write_all(&tar_bytes).expect("gzip write");
            encoder.finish().expect("gzip finish")
        }
    }
}

#[derive(Default)]
struct FakeState {
    packages: BTreeMap<String, Vec<String>>,
    envs: Vec<String>,
    calls: Vec<String>,
    skipped: HashSet<String>,
    fail_create: bool,
    fail_remove: bool,
    fail_info: bool,
}

struct FakeInner {
    root: TempDir,
    state: Mutex<FakeState>,
}

/// In-process stand-in for the conda CLI and its package channel.
#[derive(Clone)]
pub(crate) struct FakeConda {
    inner: Arc<FakeInner>,
}

impl FakeConda {
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(FakeInner {
                root: tempfile::tempdir().expect("conda root"),
                state: Mutex::new(FakeState::default()),
            }),
        }
    }

    pub(crate) fn with_package(self, name: &str, executables: &[&str]) -> Self {
        self.set_executables(name, executables);
        self
    }

    pub(crate) fn set_executables(&self, name: &str, executables: &[&str]) {
        self.state().packages.insert(
            name.to_string(),
            executables.iter().map(ToString::to_string).collect(),
        );
    }

    /// Leaves `name` out of created environments.
    pub(crate) fn skip_binary(&self, name: &str) {
        self.state().skipped.insert(name.to_string());
    }

    pub(crate) fn fail_create(&self) {
        self.state().fail_create = true;
    }

    pub(crate) fn fail_remove(&self) {
        self.state().fail_remove = true;
    }

    pub(crate) fn fail_info(&self) {
        self.state().fail_info = true;
    }

    pub(crate) fn root(&self) -> &Path {
        self.inner.root.path()
    }

    /// Conda argument lines seen so far.
    pub(crate) fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub(crate) fn called(&self, line: &str) -> bool {
        self.state().calls.iter().any(|call| call == line)
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.inner.state.lock().expect("fake conda lock")
    }

    fn env_prefix(&self, env: &str) -> PathBuf {
        self.root().join("envs").join(env)
    }

    fn conda(&self, args: &[String]) -> RunOutput {
        let mut state = self.state();
        state.calls.push(args.join(" "));
        let words: Vec<&str> = args.iter().map(String::as_str).collect();
        match words.as_slice() {
            ["search", spec, "--info", "--json", ..] => match state.packages.get(package_name(spec)) {
                Some(_) => {
                    let package = package_name(spec);
                    let mut payload = serde_json::Map::new();
                    payload.insert(
                        package.to_string(),
                        json!([{
                            "url": format!("{CHANNEL_URL}{package}{BUILD_SUFFIX}"),
                            "version": "1.0",
                            "build": "0",
                        }]),
                    );
                    ok(serde_json::Value::Object(payload).to_string())
                }
                None => failed("PackagesNotFoundError"),
            },
            ["search", spec, ..] => match state.packages.get(package_name(spec)) {
                Some(_) => ok(format!("# Name  Version  Build\n{}  1.0  0\n", package_name(spec))),
                None => failed(&format!(
                    "PackagesNotFoundError: The following packages are not available from current channels:\n\n  - {spec}"
                )),
            },
            ["info", "-e", "--json"] => {
                if state.fail_info {
                    return failed("CondaHTTPError: HTTP 000 CONNECTION FAILED");
                }
                let mut envs = vec![self.root().display().to_string()];
                envs.extend(
                    state
                        .envs
                        .iter()
                        .map(|env| self.env_prefix(env).display().to_string()),
                );
                ok(json!({ "envs": envs }).to_string())
            }
            ["create", "-n", env, _python, spec, "-y", ..] => {
                if state.fail_create {
                    return failed("UnsatisfiableError: The following specifications were found to be incompatible");
                }
                let bin = self.env_prefix(env).join("bin");
                std::fs::create_dir_all(&bin).expect("env bin");
                let executables = state
                    .packages
                    .get(package_name(spec))
                    .cloned()
                    .unwrap_or_default();
                for name in executables {
                    if !state.skipped.contains(&name) {
                        std::fs::write(bin.join(&name), "#!/bin/sh\n").expect("env binary");
                    }
                }
                state.envs.push((*env).to_string());
                ok(String::new())
            }
            ["remove", "--name", env, "--all", "-y"] => {
                let known = state.envs.iter().any(|existing| existing == env);
                if state.fail_remove || !known {
                    return failed("EnvironmentLocationNotFound: Not a conda environment");
                }
                state.envs.retain(|existing| existing != env);
                let _ = std::fs::remove_dir_all(self.env_prefix(env));
                ok(String::new())
            }
            _ => failed("unsupported fake conda command"),
        }
    }
}

fn ok(stdout: String) -> RunOutput {
    RunOutput {
        code: 0,
        stdout,
        stderr: String::new(),
    }
}

fn failed(stdout: &str) -> RunOutput {
    RunOutput {
        code: 1,
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

impl CommandRunner for FakeConda {
    fn run(&self, program: &str, args: &[String]) -> Result<RunOutput> {
        let name = Path::new(program)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        match (name.as_str(), args) {
            ("conda", _) => Ok(self.conda(args)),
            ("python3", [flag]) if flag == "--version" => Ok(ok("Python 3.11.7\n".into())),
            (_, [flag]) if flag == "--help" => Ok(ok(format!(
                "usage: {name} [-h]\n\n{name} does demo things\n"
            ))),
            _ => Err(anyhow!("{program} is not installed")),
        }
    }
}

impl ArchiveFetcher for FakeConda {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let package = url
            .strip_prefix(CHANNEL_URL)
            .and_then(|rest| rest.strip_suffix(BUILD_SUFFIX))
            .ok_or_else(|| anyhow!("unexpected url {url}"))?;
        let executables = self
            .state()
            .packages
            .get(package)
            .cloned()
            .ok_or_else(|| anyhow!("404 for {url}"))?;
        let mut entries = vec!["info/index.json".to_string()];
        entries.extend(executables.iter().map(|name| format!("bin/{name}")));
        let entries: Vec<&str> = entries.iter().map(String::as_str).collect();
        Ok(conda_archive(&entries, ArchiveCompression::Bzip2))
    }
}

struct TestEffects {
    conda: FakeConda,
    fs: SystemFileSystem,
}

impl Effects for TestEffects {
    fn runner(&self) -> &dyn CommandRunner {
        &self.conda
    }

    fn fetcher(&self) -> &dyn ArchiveFetcher {
        &self.conda
    }

    fn fs(&self) -> &dyn FileSystem {
        &self.fs
    }
}

/// A home directory, an index and a wrapper directory under one temp root.
pub(crate) struct Sandbox {
    _temp: TempDir,
    home: PathBuf,
    config: Config,
    effects: Arc<TestEffects>,
}

pub(crate) fn sandbox(conda: &FakeConda) -> Sandbox {
    let temp = tempfile::tempdir().expect("sandbox");
    let home = temp.path().join("home");
    let bin = home.join("bin");
    std::fs::create_dir_all(&bin).expect("sandbox bin");
    let home_str = home.display().to_string();
    let index_str = home.join(".installcon").display().to_string();
    let bin_str = bin.display().to_string();
    let root_str = conda.root().display().to_string();
    let snapshot = EnvSnapshot::testing(&[
        ("HOME", home_str.as_str()),
        ("INSTALLCON_HOME", index_str.as_str()),
        ("INSTALLCON_CONDA", "conda"),
        ("PATH", bin_str.as_str()),
        ("CONDA_PREFIX_1", root_str.as_str()),
    ]);
    let config = Config::from_snapshot(&snapshot).expect("sandbox config");
    Sandbox {
        _temp: temp,
        home,
        config,
        effects: Arc::new(TestEffects {
            conda: conda.clone(),
            fs: SystemFileSystem,
        }),
    }
}

impl Sandbox {
    pub(crate) fn without_conda(mut self) -> Self {
        self.config.conda.executable = None;
        self
    }

    pub(crate) fn with_search_path(mut self, search_path: Vec<PathBuf>) -> Self {
        self.config.wrappers.search_path = search_path;
        self
    }

    fn context(&self) -> CommandContext {
        CommandContext::with_config(self.config.clone(), self.effects.clone())
    }

    pub(crate) fn bin_dir(&self) -> PathBuf {
        self.home.join("bin")
    }

    pub(crate) fn index_file(&self) -> PathBuf {
        self.config.index().file()
    }

    pub(crate) fn read_index(&self) -> Index {
        let contents = std::fs::read_to_string(self.index_file()).expect("index file");
        parse_index(&contents).expect("index json")
    }

    pub(crate) fn install(&self, package: &str, python: &str) -> Result<ExecutionOutcome> {
        self.install_with(InstallRequest {
            package: package.to_string(),
            python: Some(python.to_string()),
            channels: Vec::new(),
            bin_dir: None,
            activation: None,
        })
    }

    pub(crate) fn install_with(&self, request: InstallRequest) -> Result<ExecutionOutcome> {
        install_package(&self.context(), &request)
    }

    pub(crate) fn uninstall(&self, package: &str) -> Result<ExecutionOutcome> {
        uninstall_package(
            &self.context(),
            &UninstallRequest {
                package: package.to_string(),
            },
        )
    }

    pub(crate) fn list(&self) -> Result<ExecutionOutcome> {
        list_index(&self.context(), ListRequest)
    }
}
