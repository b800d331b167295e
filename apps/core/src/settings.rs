//! Draft-and-apply settings flow used by the external settings surface.
//! Validation happens against the draft; `apply` persists through the
//! config collaborator and, on Windows, mirrors the run-on-startup flag
//! into the registry.

use std::fmt::{Display, Formatter};

use crate::config_store::{ConfigError, ConfigStore};
use crate::hotkey::{parse_hotkey, HotkeyError};
use crate::logging;
use crate::startup;

#[derive(Debug)]
pub enum SettingsError {
    InvalidHotkey(HotkeyError),
    MaxResultsOutOfRange(u16),
    Config(ConfigError),
    Startup(startup::StartupError),
}

impl Display for SettingsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidHotkey(error) => write!(f, "{error}"),
            Self::MaxResultsOutOfRange(value) => {
                write!(f, "max results must be between 5 and 100, got {value}")
            }
            Self::Config(error) => write!(f, "{error}"),
            Self::Startup(error) => write!(f, "startup toggle failed: {error}"),
        }
    }
}

impl std::error::Error for SettingsError {}

impl From<ConfigError> for SettingsError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsDraft {
    pub hotkey: String,
    pub max_results: u16,
    pub run_on_startup: bool,
}

impl SettingsDraft {
    pub fn from_store(config: &ConfigStore) -> Self {
        let snapshot = config.snapshot();
        Self {
            hotkey: snapshot.hotkey,
            max_results: snapshot.max_results,
            run_on_startup: snapshot.run_on_startup,
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        parse_hotkey(&self.hotkey).map_err(SettingsError::InvalidHotkey)?;
        if !(5..=100).contains(&self.max_results) {
            return Err(SettingsError::MaxResultsOutOfRange(self.max_results));
        }
        Ok(())
    }

    /// Validates and persists the draft. The hotkey change takes effect on
    /// the next listener registration; the startup flag is mirrored into
    /// the OS immediately where supported.
    pub fn apply(&self, config: &ConfigStore) -> Result<(), SettingsError> {
        self.validate()?;

        config.set_hotkey(&self.hotkey)?;
        config.set_max_results(self.max_results)?;
        config.set_run_on_startup(self.run_on_startup)?;

        #[cfg(target_os = "windows")]
        {
            let exe = std::env::current_exe().map_err(|error| {
                SettingsError::Startup(startup::StartupError::Io(error))
            })?;
            startup::set_enabled(self.run_on_startup, &exe).map_err(SettingsError::Startup)?;
        }
        #[cfg(not(target_os = "windows"))]
        if self.run_on_startup {
            logging::warn("run-on-startup is not supported on this platform");
        }

        logging::info("settings applied");
        Ok(())
    }
}
