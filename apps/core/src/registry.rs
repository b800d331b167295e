use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::config_store::{ConfigError, ConfigStore};
use crate::logging;
use crate::plugin::{Plugin, PluginDescriptor};

/// Owns every loaded plugin and its enabled flag. Plugins come from an
/// explicit registration list, validated one at a time: a rejected plugin
/// is logged and skipped, never aborting the rest of the load. Disabling a
/// plugin only filters it out of lookups; nothing is unloaded while the
/// process runs.
pub struct PluginRegistry {
    plugins: Vec<Arc<dyn Plugin>>,
    enabled: Mutex<HashMap<String, bool>>,
    config: Arc<ConfigStore>,
    load_warnings: Vec<String>,
}

impl PluginRegistry {
    pub fn load(candidates: Vec<Arc<dyn Plugin>>, config: Arc<ConfigStore>) -> Self {
        let persisted = config.plugins_enabled();
        let mut plugins: Vec<Arc<dyn Plugin>> = Vec::with_capacity(candidates.len());
        let mut enabled = HashMap::new();
        let mut load_warnings = Vec::new();
        let mut seen: HashSet<&'static str> = HashSet::new();

        for candidate in candidates {
            if let Err(reason) = validate(candidate.as_ref(), &seen) {
                let warning = format!("plugin '{}' rejected: {reason}", candidate.name());
                logging::warn(&warning);
                load_warnings.push(warning);
                continue;
            }

            let name = candidate.name();
            seen.insert(name);
            // Unknown plugins start enabled; only an explicit toggle turns
            // one off.
            let flag = persisted.get(name).copied().unwrap_or(true);
            enabled.insert(name.to_string(), flag);
            plugins.push(candidate);
        }

        logging::info(&format!("plugin registry loaded {} plugin(s)", plugins.len()));
        Self {
            plugins,
            enabled: Mutex::new(enabled),
            config,
            load_warnings,
        }
    }

    pub fn load_warnings(&self) -> &[String] {
        &self.load_warnings
    }

    pub fn descriptors(&self) -> Vec<PluginDescriptor> {
        self.plugins
            .iter()
            .map(|plugin| self.describe(plugin.as_ref()))
            .collect()
    }

    pub fn enabled_descriptors(&self) -> Vec<PluginDescriptor> {
        self.descriptors()
            .into_iter()
            .filter(|descriptor| descriptor.enabled)
            .collect()
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.enabled_map().get(name).copied().unwrap_or(false)
    }

    /// Flips the enabled flag and persists it through the config
    /// collaborator. The plugin itself stays loaded either way.
    pub fn set_enabled(&self, name: &str, enabled: bool) -> Result<(), ConfigError> {
        {
            let mut map = match self.enabled.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if !map.contains_key(name) {
                logging::warn(&format!("toggle for unknown plugin '{name}' ignored"));
                return Ok(());
            }
            map.insert(name.to_string(), enabled);
        }
        self.config.set_plugin_enabled(name, enabled)
    }

    /// Exact keyword match among enabled plugins. Keywords are short fixed
    /// tokens, so there is no prefix or fuzzy matching. If two enabled
    /// plugins claim the same keyword the first registered wins.
    pub fn find_by_keyword(&self, keyword: &str) -> Option<Arc<dyn Plugin>> {
        let enabled = self.enabled_map();
        self.plugins
            .iter()
            .filter(|plugin| enabled.get(plugin.name()).copied().unwrap_or(false))
            .find(|plugin| plugin.keywords().contains(&keyword))
            .cloned()
    }

    fn describe(&self, plugin: &dyn Plugin) -> PluginDescriptor {
        PluginDescriptor {
            name: plugin.name().to_string(),
            description: plugin.description().to_string(),
            keywords: plugin.keywords().iter().map(|kw| kw.to_string()).collect(),
            enabled: self.is_enabled(plugin.name()),
        }
    }

    fn enabled_map(&self) -> HashMap<String, bool> {
        match self.enabled.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

fn validate(plugin: &dyn Plugin, seen: &HashSet<&'static str>) -> Result<(), String> {
    let name = plugin.name();
    if name.trim().is_empty() {
        return Err("blank name".to_string());
    }
    if seen.contains(name) {
        return Err("duplicate name".to_string());
    }
    if plugin.keywords().is_empty() {
        return Err("no trigger keywords".to_string());
    }
    if plugin.keywords().iter().any(|kw| kw.trim().is_empty()) {
        return Err("blank trigger keyword".to_string());
    }
    Ok(())
}
