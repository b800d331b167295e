//! The built-in plugin set. Registration is an explicit list rather than
//! any runtime discovery: what ships is what loads, and the registry
//! validates each entry on the way in.

mod base64_tool;
mod calculator;
mod hash_tool;
mod json_tool;
mod system_cmds;
mod timestamp;
mod url_tool;
mod uuid_tool;

pub use base64_tool::Base64Plugin;
pub use calculator::CalculatorPlugin;
pub use hash_tool::HashPlugin;
pub use json_tool::JsonPlugin;
pub use system_cmds::SystemCommandsPlugin;
pub use timestamp::TimestampPlugin;
pub use url_tool::UrlPlugin;
pub use uuid_tool::UuidPlugin;

use std::sync::Arc;

use crate::plugin::Plugin;

pub fn builtin_plugins() -> Vec<Arc<dyn Plugin>> {
    vec![
        Arc::new(CalculatorPlugin),
        Arc::new(Base64Plugin),
        Arc::new(HashPlugin),
        Arc::new(JsonPlugin),
        Arc::new(TimestampPlugin),
        Arc::new(UrlPlugin),
        Arc::new(UuidPlugin),
        Arc::new(SystemCommandsPlugin),
    ]
}
