//! The one owner of "are we in plugin mode, and which plugin".
//!
//! Every keystroke-driven query change enters here and is routed either to
//! the dispatcher (free mode) or to the active plugin (plugin mode). All
//! transitions between the two modes happen through this controller and
//! nowhere else.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc::Sender;
use std::sync::Arc;

use crate::action_executor::{activation_for, Activation};
use crate::dispatcher::QueryDispatcher;
use crate::events::{CoreEvent, ModeSignal, SurfaceSignal};
use crate::logging;
use crate::model::{ResultItem, ResultKind};
use crate::plugin::Plugin;
use crate::registry::PluginRegistry;

/// What a consumed Escape did. Only `HideSurface` propagates past the
/// controller; exiting plugin mode swallows the keypress entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeDisposition {
    ExitedPluginMode,
    HideSurface,
}

pub struct ModeController {
    dispatcher: Arc<QueryDispatcher>,
    registry: Arc<PluginRegistry>,
    active: Option<Arc<dyn Plugin>>,
    events: Sender<CoreEvent>,
}

impl ModeController {
    pub fn new(
        dispatcher: Arc<QueryDispatcher>,
        registry: Arc<PluginRegistry>,
        events: Sender<CoreEvent>,
    ) -> Self {
        Self {
            dispatcher,
            registry,
            active: None,
            events,
        }
    }

    pub fn mode(&self) -> ModeSignal {
        match &self.active {
            Some(plugin) => ModeSignal::Plugin {
                name: plugin.name().to_string(),
            },
            None => ModeSignal::Free,
        }
    }

    /// Routes one query-text change. In plugin mode the plugin executes
    /// synchronously and its batch replaces the displayed list; in free mode
    /// the text goes to the dispatcher, which answers through its own
    /// delivery callback.
    pub fn on_query_changed(&mut self, text: &str) {
        match self.active.clone() {
            Some(plugin) => {
                let items = run_plugin(plugin.as_ref(), text);
                self.emit_results(text, items);
            }
            None => self.dispatcher.submit(text),
        }
    }

    /// Escape in plugin mode exits the plugin and consumes the key; Escape
    /// in free mode asks the surface to hide.
    pub fn on_escape(&mut self) -> EscapeDisposition {
        match self.active.take() {
            Some(plugin) => {
                plugin.on_exit();
                self.dispatcher.invalidate();
                self.emit(CoreEvent::Mode(ModeSignal::Free));
                self.emit_results("", Vec::new());
                EscapeDisposition::ExitedPluginMode
            }
            None => {
                self.emit(CoreEvent::Surface(SurfaceSignal::Hide));
                EscapeDisposition::HideSurface
            }
        }
    }

    /// Handles activation of a selected result row. A `PluginTrigger` row
    /// transitions into plugin mode here; every other kind is translated to
    /// an activation plan for the executor.
    pub fn on_item_activated(&mut self, item: &ResultItem) -> Option<Activation> {
        if item.kind == ResultKind::PluginTrigger {
            self.enter_plugin(&item.payload);
            return None;
        }
        Some(activation_for(item))
    }

    /// Enters plugin mode for the enabled plugin owning `keyword`. Entering
    /// while another plugin is active is not a direct transition: the
    /// current plugin is exited first, then the new one entered.
    pub fn enter_plugin(&mut self, keyword: &str) -> bool {
        let Some(plugin) = self.registry.find_by_keyword(keyword) else {
            logging::warn(&format!("no enabled plugin for trigger keyword '{keyword}'"));
            return false;
        };

        if let Some(previous) = self.active.take() {
            previous.on_exit();
        }
        plugin.on_enter();

        self.emit(CoreEvent::Mode(ModeSignal::Plugin {
            name: plugin.name().to_string(),
        }));
        // Pending free-search work must never surface inside plugin mode.
        self.dispatcher.invalidate();
        self.emit_results("", Vec::new());

        self.active = Some(plugin);
        true
    }

    fn emit_results(&self, query: &str, items: Vec<ResultItem>) {
        self.emit(CoreEvent::Results {
            query: query.to_string(),
            items,
        });
    }

    fn emit(&self, event: CoreEvent) {
        let _ = self.events.send(event);
    }
}

/// Runs `plugin.execute`, converting an error or panic into a single
/// user-visible `PluginError` row. The mode itself survives the failure.
fn run_plugin(plugin: &dyn Plugin, query: &str) -> Vec<ResultItem> {
    match catch_unwind(AssertUnwindSafe(|| plugin.execute(query))) {
        Ok(Ok(items)) => items,
        Ok(Err(error)) => {
            logging::warn(&format!("plugin '{}' failed: {error}", plugin.name()));
            vec![ResultItem::plugin_error(error.to_string())]
        }
        Err(_) => {
            logging::error(&format!("plugin '{}' panicked", plugin.name()));
            vec![ResultItem::plugin_error(format!(
                "{} failed unexpectedly",
                plugin.name()
            ))]
        }
    }
}
