use uuid::Uuid;

use crate::model::ResultItem;
use crate::plugin::{Plugin, PluginError};

const DEFAULT_COUNT: usize = 5;
const MAX_COUNT: usize = 50;

/// Random v4 UUIDs. A bare query yields a handful; a numeric query asks
/// for that many, capped.
pub struct UuidPlugin;

impl Plugin for UuidPlugin {
    fn name(&self) -> &'static str {
        "UUID"
    }

    fn description(&self) -> &'static str {
        "Generate random v4 UUIDs"
    }

    fn keywords(&self) -> &'static [&'static str] {
        &["uuid"]
    }

    fn execute(&self, query: &str) -> Result<Vec<ResultItem>, PluginError> {
        let count = requested_count(query.trim());
        let items = (0..count)
            .map(|_| {
                let value = Uuid::new_v4().to_string();
                ResultItem::plugin_result(value.clone(), value)
            })
            .collect();
        Ok(items)
    }
}

fn requested_count(query: &str) -> usize {
    if query.is_empty() || !query.bytes().all(|b| b.is_ascii_digit()) {
        return DEFAULT_COUNT;
    }
    query.parse::<usize>().unwrap_or(DEFAULT_COUNT).min(MAX_COUNT)
}

#[cfg(test)]
mod tests {
    use super::{requested_count, UuidPlugin};
    use crate::plugin::Plugin;

    #[test]
    fn default_batch_is_five() {
        assert_eq!(UuidPlugin.execute("").unwrap().len(), 5);
    }

    #[test]
    fn numeric_query_sets_count_with_a_cap() {
        assert_eq!(requested_count("3"), 3);
        assert_eq!(requested_count("500"), 50);
        assert_eq!(requested_count("abc"), 5);
    }

    #[test]
    fn generated_values_parse_and_differ() {
        let items = UuidPlugin.execute("2").unwrap();
        assert_eq!(items.len(), 2);
        assert_ne!(items[0].payload, items[1].payload);
        assert!(uuid::Uuid::parse_str(&items[0].payload).is_ok());
    }
}
