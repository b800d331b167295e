use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::logging;

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Serialize(serde_json::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(error) => write!(f, "config io error: {error}"),
            Self::Serialize(error) => write!(f, "config serialize error: {error}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub hotkey: String,
    pub max_results: u16,
    pub run_on_startup: bool,
    pub plugins_enabled: HashMap<String, bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hotkey: "alt+q".to_string(),
            max_results: 20,
            run_on_startup: false,
            plugins_enabled: HashMap::new(),
        }
    }
}

pub fn app_data_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Ok(appdata) = std::env::var("APPDATA") {
            if !appdata.is_empty() {
                return PathBuf::from(appdata).join("quickbar");
            }
        }
    }

    std::env::temp_dir().join("quickbar")
}

/// Persisted configuration, constructed once at startup and passed by
/// handle to whoever needs it. Mutations go through the setters so every
/// change lands on disk.
pub struct ConfigStore {
    path: PathBuf,
    data: Mutex<Config>,
}

impl ConfigStore {
    pub fn default_path() -> PathBuf {
        app_data_dir().join("config.json")
    }

    /// Opens the store at `path`. A missing file is seeded with defaults;
    /// a corrupt file falls back to defaults so the launcher always comes
    /// up. Neither case is fatal.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let data = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Config>(&raw) {
                Ok(config) => config,
                Err(error) => {
                    logging::warn(&format!(
                        "config at {} is invalid ({error}); using defaults",
                        path.display()
                    ));
                    Config::default()
                }
            },
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                let defaults = Config::default();
                if let Err(error) = write_config(&path, &defaults) {
                    logging::warn(&format!(
                        "could not seed default config at {}: {error}",
                        path.display()
                    ));
                }
                defaults
            }
            Err(error) => {
                logging::warn(&format!(
                    "config at {} unreadable ({error}); using defaults",
                    path.display()
                ));
                Config::default()
            }
        };

        Self {
            path,
            data: Mutex::new(data),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn snapshot(&self) -> Config {
        self.lock().clone()
    }

    pub fn hotkey(&self) -> String {
        self.lock().hotkey.clone()
    }

    pub fn max_results(&self) -> u16 {
        self.lock().max_results
    }

    pub fn run_on_startup(&self) -> bool {
        self.lock().run_on_startup
    }

    pub fn plugins_enabled(&self) -> HashMap<String, bool> {
        self.lock().plugins_enabled.clone()
    }

    pub fn set_hotkey(&self, hotkey: &str) -> Result<(), ConfigError> {
        let mut data = self.lock();
        data.hotkey = hotkey.to_string();
        write_config(&self.path, &data)
    }

    pub fn set_max_results(&self, max_results: u16) -> Result<(), ConfigError> {
        let mut data = self.lock();
        data.max_results = max_results;
        write_config(&self.path, &data)
    }

    pub fn set_run_on_startup(&self, enabled: bool) -> Result<(), ConfigError> {
        let mut data = self.lock();
        data.run_on_startup = enabled;
        write_config(&self.path, &data)
    }

    pub fn set_plugin_enabled(&self, name: &str, enabled: bool) -> Result<(), ConfigError> {
        let mut data = self.lock();
        data.plugins_enabled.insert(name.to_string(), enabled);
        write_config(&self.path, &data)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Config> {
        match self.data.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

fn write_config(path: &Path, data: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let raw = serde_json::to_string_pretty(data)?;
    std::fs::write(path, raw)?;
    Ok(())
}
