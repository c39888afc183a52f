use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use installcon_domain::{package_name, EnvName};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::effects::CommandRunner;
use crate::process::RunOutput;

/// A conda invocation that exited non-zero.
#[derive(thiserror::Error, Debug, Clone)]
#[error("`{command}` exited with status {code}")]
pub(crate) struct CondaCommandError {
    pub(crate) command: String,
    pub(crate) code: i32,
    pub(crate) output: String,
}

/// One build of a package as reported by `conda search --info --json`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub(crate) struct PackageBuild {
    pub(crate) url: String,
    #[serde(default)]
    pub(crate) version: Option<String>,
    #[serde(default)]
    pub(crate) build: Option<String>,
}

#[derive(Deserialize)]
struct EnvListing {
    #[serde(default)]
    envs: Vec<PathBuf>,
}

pub(crate) struct CondaCli<'a> {
    program: String,
    runner: &'a dyn CommandRunner,
    channels: &'a [String],
}

impl<'a> CondaCli<'a> {
    pub(crate) fn new(program: &Path, runner: &'a dyn CommandRunner, channels: &'a [String]) -> Self {
        Self {
            program: program.display().to_string(),
            runner,
            channels,
        }
    }

    /// Renders the command line for `args` the way it would be typed.
    pub(crate) fn command_line(&self, args: &[String]) -> String {
        std::iter::once(self.program.as_str())
            .chain(args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn run(&self, args: &[String]) -> Result<RunOutput> {
        let command = self.command_line(args);
        debug!(%command, "running conda");
        let output = self.runner.run(&self.program, args)?;
        debug!(%command, code = output.code, "conda finished");
        Ok(output)
    }

    fn run_checked(&self, args: &[String]) -> Result<RunOutput> {
        let output = self.run(args)?;
        if output.success() {
            Ok(output)
        } else {
            Err(anyhow!(CondaCommandError {
                command: self.command_line(args),
                code: output.code,
                output: output.combined(),
            }))
        }
    }

    fn with_channels(&self, mut args: Vec<String>) -> Vec<String> {
        for channel in self.channels {
            args.push("-c".to_string());
            args.push(channel.clone());
        }
        args
    }

    pub(crate) fn search_args(&self, package: &str) -> Vec<String> {
        self.with_channels(vec!["search".into(), package.into()])
    }

    /// Confirms `package` is available from the configured channels.
    pub(crate) fn search(&self, package: &str) -> Result<()> {
        self.run_checked(&self.search_args(package)).map(|_| ())
    }

    /// Lists the builds conda knows for `package`, oldest first.
    pub(crate) fn package_builds(&self, package: &str) -> Result<Vec<PackageBuild>> {
        let args = self.with_channels(vec![
            "search".into(),
            package.into(),
            "--info".into(),
            "--json".into(),
        ]);
        let output = self.run_checked(&args)?;
        parse_package_builds(&output.stdout, package)
    }

    /// Absolute prefixes of every environment conda knows about.
    pub(crate) fn environments(&self) -> Result<Vec<PathBuf>> {
        let args = vec!["info".into(), "-e".into(), "--json".into()];
        let output = self.run_checked(&args)?;
        let listing: EnvListing = serde_json::from_str(&output.stdout)
            .context("conda returned malformed environment JSON")?;
        Ok(listing.envs)
    }

    /// Prefix of the environment called `env`, matched on the final path
    /// component so `installcon_foo` never matches `installcon_foobar`.
    pub(crate) fn find_environment(&self, env: &EnvName) -> Result<Option<PathBuf>> {
        Ok(self.environments()?.into_iter().find(|prefix| {
            prefix
                .file_name()
                .is_some_and(|name| name == env.as_str())
        }))
    }

    pub(crate) fn create_args(&self, env: &EnvName, python: &str, package: &str) -> Vec<String> {
        self.with_channels(vec![
            "create".into(),
            "-n".into(),
            env.to_string(),
            format!("python={python}"),
            package.into(),
            "-y".into(),
        ])
    }

    pub(crate) fn create_environment(
        &self,
        env: &EnvName,
        python: &str,
        package: &str,
    ) -> Result<RunOutput> {
        self.run_checked(&self.create_args(env, python, package))
    }

    pub(crate) fn remove_environment(&self, env: &EnvName) -> Result<RunOutput> {
        let args = vec![
            "remove".into(),
            "--name".into(),
            env.to_string(),
            "--all".into(),
            "-y".into(),
        ];
        self.run_checked(&args)
    }
}

fn parse_package_builds(stdout: &str, package: &str) -> Result<Vec<PackageBuild>> {
    let payload: Value =
        serde_json::from_str(stdout).context("conda returned malformed package JSON")?;
    let map = payload
        .as_object()
        .ok_or_else(|| anyhow!("conda package info is not a JSON object"))?;
    let name = package_name(package);
    let builds = map
        .get(name)
        .or_else(|| {
            if map.len() == 1 {
                map.values().next()
            } else {
                None
            }
        })
        .ok_or_else(|| anyhow!("conda reported no builds for {name}"))?;
    let builds: Vec<PackageBuild> = serde_json::from_value(builds.clone())
        .with_context(|| format!("unexpected build list for {name}"))?;
    Ok(builds)
}
