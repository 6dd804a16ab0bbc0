//! Built-in checks, grouped by category

mod local;
mod onpage;
mod technical;

pub use local::LocalBusinessSchemaCheck;
pub use onpage::{H1TagCheck, ImageAltTextCheck, MetaDescriptionCheck, TitleTagCheck};
pub use technical::{HttpStatusCheck, HttpsCheck, MobileFriendlyCheck, RobotsDirectivesCheck};

use crate::analyzer::Check;
use serde_json::{Map, Value};

/// The standard registry, in evaluation order
pub fn default_checks() -> Vec<Box<dyn Check>> {
    vec![
        Box::new(HttpStatusCheck),
        Box::new(HttpsCheck),
        Box::new(MobileFriendlyCheck),
        Box::new(RobotsDirectivesCheck),
        Box::new(TitleTagCheck),
        Box::new(MetaDescriptionCheck),
        Box::new(H1TagCheck),
        Box::new(ImageAltTextCheck),
        Box::new(LocalBusinessSchemaCheck),
    ]
}

/// Unwraps a `json!({...})` literal into an evidence map
pub(crate) fn evidence(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
