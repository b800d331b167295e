pub mod action_executor;
pub mod app_index;
pub mod config_store;
pub mod dispatcher;
pub mod events;
pub mod file_search;
pub mod hotkey;
pub mod hotkey_listener;
pub mod index_store;
pub mod logging;
pub mod mode;
pub mod model;
pub mod plugin;
pub mod plugins;
pub mod registry;
pub mod runtime;
pub mod settings;
pub mod source;
pub mod startup;
