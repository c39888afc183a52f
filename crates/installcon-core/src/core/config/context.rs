use anyhow::Result;

use crate::config::{Config, EnvSnapshot};
use crate::effects::{self, SharedEffects};
use crate::CommandGroup;

#[derive(Clone, Copy, Debug)]
pub struct CommandInfo {
    pub group: CommandGroup,
    pub name: &'static str,
}

impl CommandInfo {
    #[must_use]
    pub const fn new(group: CommandGroup, name: &'static str) -> Self {
        Self { group, name }
    }
}

pub struct CommandContext {
    config: Config,
    effects: SharedEffects,
}

impl CommandContext {
    /// Creates a new command context from the process environment.
    ///
    /// # Errors
    /// Returns an error if the configuration cannot be prepared.
    pub fn new(effects: SharedEffects) -> Result<Self> {
        let config = Config::from_snapshot(&EnvSnapshot::capture())?;
        Ok(Self::with_config(config, effects))
    }

    #[must_use]
    pub fn with_config(config: Config, effects: SharedEffects) -> Self {
        Self {
            config,
            effects,
        }
    }

    pub fn runner(&self) -> &dyn effects::CommandRunner {
        self.effects.runner()
    }

    pub fn fetcher(&self) -> &dyn effects::ArchiveFetcher {
        self.effects.fetcher()
    }

    pub fn fs(&self) -> &dyn effects::FileSystem {
        self.effects.fs()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
