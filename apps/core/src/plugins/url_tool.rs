use crate::model::ResultItem;
use crate::plugin::{Plugin, PluginError};

/// Percent encoding and decoding. A decode row appears only when decoding
/// actually changes the input; an encode row is always offered.
pub struct UrlPlugin;

impl Plugin for UrlPlugin {
    fn name(&self) -> &'static str {
        "URL"
    }

    fn description(&self) -> &'static str {
        "Percent-encode or decode a URL"
    }

    fn keywords(&self) -> &'static [&'static str] {
        &["u"]
    }

    fn execute(&self, query: &str) -> Result<Vec<ResultItem>, PluginError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }

        let mut items = Vec::new();

        if let Some(decoded) = percent_decode(trimmed) {
            if decoded != trimmed {
                items.push(ResultItem::plugin_result(
                    format!("Decoded: {decoded}"),
                    decoded.clone(),
                ));
            }
        }

        let encoded = percent_encode(trimmed);
        items.push(ResultItem::plugin_result(
            format!("Encoded: {encoded}"),
            encoded.clone(),
        ));

        Ok(items)
    }
}

/// Unreserved characters and '/' pass through; everything else becomes
/// %XX per byte of its UTF-8 encoding.
fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.as_bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                out.push(*byte as char);
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Decodes %XX sequences, leaving malformed escapes as literal text. None
/// only when the decoded bytes are not valid UTF-8.
fn percent_decode(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push(hi << 4 | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8(out).ok()
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{percent_decode, percent_encode, UrlPlugin};
    use crate::plugin::Plugin;

    #[test]
    fn encoding_escapes_reserved_characters() {
        assert_eq!(percent_encode("a b&c"), "a%20b%26c");
        assert_eq!(percent_encode("path/to/file.txt"), "path/to/file.txt");
    }

    #[test]
    fn decoding_round_trips_encoding() {
        let original = "hello world/änder?";
        let encoded = percent_encode(original);
        assert_eq!(percent_decode(&encoded).as_deref(), Some(original));
    }

    #[test]
    fn malformed_escape_stays_literal() {
        assert_eq!(percent_decode("100%").as_deref(), Some("100%"));
        assert_eq!(percent_decode("%zz").as_deref(), Some("%zz"));
    }

    #[test]
    fn plain_text_gets_only_an_encode_row() {
        let items = UrlPlugin.execute("hello").unwrap();
        assert_eq!(items.len(), 1);
        assert!(items[0].title.starts_with("Encoded:"));
    }

    #[test]
    fn escaped_input_gets_a_decode_row_first() {
        let items = UrlPlugin.execute("a%20b").unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].payload, "a b");
    }
}
