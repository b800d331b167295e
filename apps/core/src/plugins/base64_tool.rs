use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::model::ResultItem;
use crate::plugin::{Plugin, PluginError};

/// Base64 both ways: if the input happens to decode to valid UTF-8 the
/// decoded row comes first, and an encoded row is always offered.
pub struct Base64Plugin;

impl Plugin for Base64Plugin {
    fn name(&self) -> &'static str {
        "Base64"
    }

    fn description(&self) -> &'static str {
        "Encode or decode Base64 text"
    }

    fn keywords(&self) -> &'static [&'static str] {
        &["b"]
    }

    fn execute(&self, query: &str) -> Result<Vec<ResultItem>, PluginError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }

        let mut items = Vec::new();

        if let Ok(bytes) = STANDARD.decode(trimmed) {
            if let Ok(text) = String::from_utf8(bytes) {
                items.push(ResultItem::plugin_result(
                    format!("Decoded: {text}"),
                    text.clone(),
                ));
            }
        }

        let encoded = STANDARD.encode(trimmed.as_bytes());
        items.push(ResultItem::plugin_result(
            format!("Encoded: {encoded}"),
            encoded.clone(),
        ));

        Ok(items)
    }
}
