//! Name-to-command resolution

use super::{Command, CommandSpec, GET_TRACK, GetTrackCommand, SAVE_TRACK, SaveTrackCommand};
use crate::download::TrackDownloader;
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Builds a fresh command instance for each invocation
pub type CommandFactory = Arc<dyn Fn() -> Box<dyn Command> + Send + Sync>;

struct Registration {
    spec: &'static CommandSpec,
    factory: CommandFactory,
}

/// Commands the script host can resolve, keyed by case-insensitive name
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Registration>,
}

impl CommandRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with `Save-Track` and `Get-Track` bound to `downloader`
    pub fn with_track_commands(downloader: TrackDownloader) -> Self {
        let mut registry = Self::new();

        let save = downloader.clone();
        registry.register(
            &SAVE_TRACK,
            Arc::new(move || Box::new(SaveTrackCommand::new(save.clone())) as Box<dyn Command>),
        );

        registry.register(
            &GET_TRACK,
            Arc::new(move || {
                Box::new(GetTrackCommand::new(downloader.clone())) as Box<dyn Command>
            }),
        );

        registry
    }

    /// Register a command, replacing any command of the same name
    pub fn register(&mut self, spec: &'static CommandSpec, factory: CommandFactory) {
        if self
            .commands
            .insert(spec.name.to_ascii_lowercase(), Registration { spec, factory })
            .is_some()
        {
            tracing::debug!(command = spec.name, "replaced existing command registration");
        }
    }

    /// Resolve a name to its spec and a new command instance
    pub fn resolve(&self, name: &str) -> Result<(&'static CommandSpec, Box<dyn Command>)> {
        let registration = self
            .commands
            .get(&name.to_ascii_lowercase())
            .ok_or_else(|| Error::CommandNotFound(name.to_string()))?;
        Ok((registration.spec, (registration.factory)()))
    }

    /// Whether a command is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(&name.to_ascii_lowercase())
    }

    /// Registered command names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.commands.values().map(|r| r.spec.name).collect();
        names.sort_unstable();
        names
    }
}
