/// What a result item does when the user activates it. The dispatcher and
/// controller never look past this tag; payload semantics belong to whoever
/// produced the item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    App,
    File,
    PluginResult,
    PluginError,
    PluginTrigger,
    SystemCommand,
}

/// One candidate row surfaced to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultItem {
    pub title: String,
    pub payload: String,
    pub kind: ResultKind,
}

impl ResultItem {
    pub fn new(kind: ResultKind, title: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            payload: payload.into(),
            kind,
        }
    }

    pub fn app(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(ResultKind::App, name, path)
    }

    pub fn file(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(ResultKind::File, name, path)
    }

    pub fn plugin_result(title: impl Into<String>, payload: impl Into<String>) -> Self {
        Self::new(ResultKind::PluginResult, title, payload)
    }

    pub fn plugin_error(message: impl Into<String>) -> Self {
        Self::new(ResultKind::PluginError, message, "")
    }

    pub fn plugin_trigger(title: impl Into<String>, keyword: impl Into<String>) -> Self {
        Self::new(ResultKind::PluginTrigger, title, keyword)
    }

    pub fn system_command(title: impl Into<String>, command: impl Into<String>) -> Self {
        Self::new(ResultKind::SystemCommand, title, command)
    }
}
