//! Startup preference persistence
//!
//! A single boolean stored as `{"startup": bool}`. The stored value and
//! the OS registration are independent facts: a failed registration
//! leaves the saved value in place, so the two can disagree until the
//! next successful sync.

use crate::autostart::Autostart;
use crate::config::write_atomic;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    startup: bool,
}

pub struct Preferences {
    path: PathBuf,
    startup_enabled: bool,
    autostart: Box<dyn Autostart>,
}

impl Preferences {
    /// Load the settings from `path`, substituting defaults for a
    /// missing or malformed file.
    pub fn load(path: PathBuf, autostart: Box<dyn Autostart>) -> Self {
        let startup_enabled = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<SettingsFile>(&content) {
                Ok(file) => file.startup,
                Err(e) => {
                    tracing::warn!("Ignoring malformed settings file {:?}: {}", path, e);
                    false
                }
            },
            Err(e) => {
                if e.kind() != ErrorKind::NotFound {
                    tracing::warn!("Could not read settings file {:?}: {}", path, e);
                }
                false
            }
        };
        Self {
            path,
            startup_enabled,
            autostart,
        }
    }

    pub fn startup_enabled(&self) -> bool {
        self.startup_enabled
    }

    /// Whether the OS currently holds a registration for this
    /// application.
    pub fn autostart_registered(&self) -> bool {
        self.autostart.is_enabled()
    }

    /// Persist a new value. The OS side is applied separately through
    /// [`Preferences::sync_autostart`], so a registration failure can
    /// never block the save.
    pub fn set_startup_enabled(&mut self, value: bool) -> Result<()> {
        self.startup_enabled = value;
        self.save()
    }

    /// Reset to defaults and persist.
    pub fn reset(&mut self) -> Result<()> {
        self.startup_enabled = false;
        self.save()
    }

    /// Bring the OS registration in line with the stored value. Already
    /// matching state is left untouched, so repeated calls are safe.
    pub fn sync_autostart(&self) -> Result<()> {
        if self.startup_enabled && !self.autostart.is_enabled() {
            self.autostart
                .enable()
                .context("Could not enable launch at startup")
        } else if !self.startup_enabled && self.autostart.is_enabled() {
            self.autostart
                .disable()
                .context("Could not disable launch at startup")
        } else {
            Ok(())
        }
    }

    fn save(&self) -> Result<()> {
        let file = SettingsFile {
            startup: self.startup_enabled,
        };
        let json = serde_json::to_string_pretty(&file).context("Failed to serialize settings")?;
        write_atomic(&self.path, &json)
    }
}
