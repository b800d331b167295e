use crate::model::ResultItem;
use crate::plugin::{Plugin, PluginError};

const PREVIEW_CHARS: usize = 100;

/// JSON pretty-printing and minification. Row titles carry a truncated
/// preview; the payload is always the full text.
pub struct JsonPlugin;

impl Plugin for JsonPlugin {
    fn name(&self) -> &'static str {
        "JSON"
    }

    fn description(&self) -> &'static str {
        "Format or minify a JSON document"
    }

    fn keywords(&self) -> &'static [&'static str] {
        &["j"]
    }

    fn execute(&self, query: &str) -> Result<Vec<ResultItem>, PluginError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }

        let parsed: serde_json::Value = match serde_json::from_str(trimmed) {
            Ok(value) => value,
            Err(error) => {
                return Ok(vec![ResultItem::plugin_error(format!(
                    "JSON parse error: {error}"
                ))]);
            }
        };

        let formatted = match serde_json::to_string_pretty(&parsed) {
            Ok(text) => text,
            Err(error) => return Err(PluginError::new(error.to_string())),
        };
        let minified = match serde_json::to_string(&parsed) {
            Ok(text) => text,
            Err(error) => return Err(PluginError::new(error.to_string())),
        };

        Ok(vec![
            ResultItem::plugin_result(format!("Formatted: {}", preview(&formatted)), formatted.clone()),
            ResultItem::plugin_result(format!("Minified: {}", preview(&minified)), minified.clone()),
        ])
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_CHARS {
        return text.to_string();
    }
    let head: String = text.chars().take(PREVIEW_CHARS).collect();
    format!("{head}...")
}

#[cfg(test)]
mod tests {
    use super::{preview, JsonPlugin};
    use crate::model::ResultKind;
    use crate::plugin::Plugin;

    #[test]
    fn formats_and_minifies() {
        let items = JsonPlugin.execute(r#"{ "a" : [1, 2] }"#).unwrap();
        assert_eq!(items.len(), 2);
        assert!(items[0].payload.contains("\n"));
        assert_eq!(items[1].payload, r#"{"a":[1,2]}"#);
    }

    #[test]
    fn invalid_json_becomes_an_error_row() {
        let items = JsonPlugin.execute("{nope").unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].kind, ResultKind::PluginError);
    }

    #[test]
    fn long_payloads_are_previewed_in_the_title() {
        let long = "x".repeat(300);
        assert!(preview(&long).ends_with("..."));
        assert_eq!(preview("short"), "short");
    }
}
