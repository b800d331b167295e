use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crate::model::ResultItem;
use crate::plugin::Plugin;
use crate::registry::PluginRegistry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    message: String,
}

impl SourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SourceError {}

/// One heterogeneous result producer the dispatcher fans out to. A source
/// must not raise on empty or malformed queries; it returns an empty list
/// instead. A failing source yields zero results for that generation and
/// never aborts the others.
pub trait SearchSource: Send + Sync {
    fn source_name(&self) -> &'static str;
    fn search(&self, query: &str) -> Result<Vec<ResultItem>, SourceError>;
}

/// Surfaces an enter-plugin-mode row when the query is exactly an enabled
/// plugin's trigger keyword. Listed before the app index so the trigger
/// always tops the merged batch.
pub struct PluginTriggerSource {
    registry: Arc<PluginRegistry>,
}

impl PluginTriggerSource {
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self { registry }
    }
}

impl SearchSource for PluginTriggerSource {
    fn source_name(&self) -> &'static str {
        "plugin-trigger"
    }

    fn search(&self, query: &str) -> Result<Vec<ResultItem>, SourceError> {
        let keyword = query.trim();
        if keyword.is_empty() {
            return Ok(Vec::new());
        }

        match self.registry.find_by_keyword(keyword) {
            Some(plugin) => Ok(vec![ResultItem::plugin_trigger(
                format!("{} Mode", plugin.name()),
                keyword,
            )]),
            None => Ok(Vec::new()),
        }
    }
}
