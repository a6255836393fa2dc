//! Launcher state shared by platform callbacks
//!
//! A platform frontend keeps one [`LauncherSession`] behind a lock. Each
//! callback checks the shim out, releases the lock for the chooser or the
//! native `Load` call, and checks it back in with whatever came of it.

use crate::completion::{Completion, Selection};
use crate::config::LauncherConfig;
use crate::entry_point::EntryPoint;
use crate::log_filter::{CONFIG, FRONTEND};
use crate::resolver::CanonicalResolver;
use crate::shim::{LauncherShim, SelectionOutcome};
use std::path::PathBuf;

pub type SessionShim<E> = LauncherShim<CanonicalResolver, E>;

/// A shim taken out of the session, tagged with the configuration it was built for
pub struct Checkout<E> {
    pub shim: SessionShim<E>,
    generation: u64,
}

impl<E: EntryPoint> Checkout<E> {
    /// Hand a chooser answer to the shim.
    ///
    /// The answer normally goes through the request's [`Completion`]. When that
    /// request is gone (the shim holding it was replaced, or the completion
    /// slot is empty) the answer is handled directly so the pick still loads.
    pub fn deliver(&mut self, completion: Option<Completion>, selection: Selection) -> SelectionOutcome {
        if let Some(completion) = completion {
            completion.complete(selection.clone());
            if let Some(outcome) = self.shim.poll() {
                return outcome;
            }
        }

        log::warn!(target: FRONTEND, "Selection result arrived without its request, handling it directly");
        self.shim.on_selection_complete(selection.status, selection.handle)
    }
}

pub struct LauncherSession<E> {
    config: LauncherConfig,
    config_path: Option<PathBuf>,
    shim: Option<Checkout<E>>,
    generation: u64,
}

impl<E> Default for LauncherSession<E> {
    fn default() -> Self {
        Self {
            config: LauncherConfig::default(),
            config_path: None,
            shim: None,
            generation: 0,
        }
    }
}

impl<E: EntryPoint> LauncherSession<E> {
    pub fn new(config: LauncherConfig, config_path: Option<PathBuf>) -> Self {
        Self {
            config,
            config_path,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &LauncherConfig {
        &self.config
    }

    /// Switch to a new configuration.
    ///
    /// An idle shim is dropped and rebuilt on next use. A shim waiting for a
    /// chooser answer is kept until that answer has been handled.
    pub fn apply_config(&mut self, config: LauncherConfig, config_path: Option<PathBuf>) {
        self.config = config;
        self.config_path = config_path;
        self.generation += 1;

        if self.shim.as_ref().is_some_and(|stored| !stored.shim.is_pending()) {
            self.shim = None;
        }
    }

    /// Take the current shim, building one with `open` if there is none
    pub fn checkout(&mut self, open: impl FnOnce(&LauncherConfig) -> Option<E>) -> Option<Checkout<E>> {
        if let Some(stored) = self.shim.take() {
            return Some(stored);
        }

        let entry_point = open(&self.config)?;
        let resolver = CanonicalResolver::new(self.config.storage_volumes());
        Some(Checkout {
            shim: LauncherShim::new(resolver, entry_point),
            generation: self.generation,
        })
    }

    /// Return a checked-out shim and record a loaded file in the recent list
    pub fn checkin(&mut self, checkout: Checkout<E>, outcome: Option<&SelectionOutcome>) {
        if let Some(outcome) = outcome {
            self.record(outcome);
        }

        let pending = checkout.shim.is_pending();
        if checkout.generation != self.generation && !pending {
            log::debug!(target: FRONTEND, "Dropping launcher built for an older configuration");
            return;
        }

        match &self.shim {
            // Another callback checked a shim in meanwhile; keep the one still waiting
            Some(stored) if stored.shim.is_pending() || !pending => {}
            _ => self.shim = Some(checkout),
        }
    }

    fn record(&mut self, outcome: &SelectionOutcome) {
        let Some(path) = outcome.loaded_path() else {
            return;
        };
        self.config.add_recent(PathBuf::from(path));

        if let Some(ref config_path) = self.config_path {
            if let Err(e) = self.config.save_to(config_path) {
                log::error!(target: CONFIG, "Failed to save configuration: {}", e);
            }
        }
    }
}
