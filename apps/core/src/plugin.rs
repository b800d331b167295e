use std::fmt::{Display, Formatter};

use crate::model::ResultItem;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginError {
    message: String,
}

impl PluginError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for PluginError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for PluginError {}

/// The capability set every plugin must satisfy. `execute` is synchronous
/// and local (no network I/O): plugin mode applies no cancellation, unlike
/// search sources.
pub trait Plugin: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    /// Trigger keywords, matched exactly against the whole query.
    fn keywords(&self) -> &'static [&'static str];
    fn execute(&self, query: &str) -> Result<Vec<ResultItem>, PluginError>;
    /// Called when plugin mode is activated for this plugin.
    fn on_enter(&self) {}
    /// Called when plugin mode is deactivated.
    fn on_exit(&self) {}
}

/// Registry-owned snapshot of one loaded plugin, as shown to the settings
/// surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginDescriptor {
    pub name: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub enabled: bool,
}
