use md5::{Digest, Md5};
use sha1::Sha1;
use sha2::Sha256;

use crate::model::ResultItem;
use crate::plugin::{Plugin, PluginError};

/// Hex digests of the query text, one row per algorithm.
pub struct HashPlugin;

impl Plugin for HashPlugin {
    fn name(&self) -> &'static str {
        "Hash"
    }

    fn description(&self) -> &'static str {
        "MD5, SHA-1 and SHA-256 digests of the input"
    }

    fn keywords(&self) -> &'static [&'static str] {
        &["h"]
    }

    fn execute(&self, query: &str) -> Result<Vec<ResultItem>, PluginError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }

        let data = trimmed.as_bytes();
        let md5_hex = format!("{:x}", Md5::digest(data));
        let sha1_hex = format!("{:x}", Sha1::digest(data));
        let sha256_hex = format!("{:x}", Sha256::digest(data));

        Ok(vec![
            ResultItem::plugin_result(format!("MD5: {md5_hex}"), md5_hex.clone()),
            ResultItem::plugin_result(format!("SHA1: {sha1_hex}"), sha1_hex.clone()),
            ResultItem::plugin_result(format!("SHA256: {sha256_hex}"), sha256_hex.clone()),
        ])
    }
}
