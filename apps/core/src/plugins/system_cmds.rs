use crate::model::ResultItem;
use crate::plugin::{Plugin, PluginError};

/// Keyword and label for each system action. The payload is the keyword;
/// the activation executor maps it to the actual OS call.
const COMMANDS: [(&str, &str); 5] = [
    ("lock", "Lock the workstation"),
    ("sleep", "Enter sleep mode"),
    ("empty", "Empty the recycle bin"),
    ("shutdown", "Shut down the system"),
    ("restart", "Restart the system"),
];

pub struct SystemCommandsPlugin;

impl Plugin for SystemCommandsPlugin {
    fn name(&self) -> &'static str {
        "System Commands"
    }

    fn description(&self) -> &'static str {
        "Quick system actions (lock, sleep, shutdown...)"
    }

    fn keywords(&self) -> &'static [&'static str] {
        &["sys"]
    }

    fn execute(&self, query: &str) -> Result<Vec<ResultItem>, PluginError> {
        let needle = query.trim().to_ascii_lowercase();

        if needle.is_empty() {
            return Ok(COMMANDS
                .iter()
                .map(|(key, label)| ResultItem::system_command(format!("{key}: {label}"), *key))
                .collect());
        }

        Ok(COMMANDS
            .iter()
            .filter(|(key, _)| key.contains(&needle))
            .map(|(key, label)| ResultItem::system_command(*label, *key))
            .collect())
    }
}
