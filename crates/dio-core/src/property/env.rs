use serde_json::Value;

use crate::kernel::constants::ENV_KEY_SEPARATOR;
use crate::property::store::{PropertyLayer, PropertyStore};

/// Fold an environment variable name into a dotted property key.
///
/// `APP_WEB_PORT` becomes `app.web.port`.
pub fn fold_env_key(name: &str) -> String {
    name.replace(ENV_KEY_SEPARATOR, ".").to_lowercase()
}

/// Copy every `(name, value)` pair into the override layer, folding names
/// with [`fold_env_key`]. Values are kept as strings.
///
/// Returns the number of properties written.
pub fn migrate_env<I>(store: &mut PropertyStore, vars: I) -> usize
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut count = 0;
    let mut map = serde_json::Map::new();
    for (name, value) in vars {
        let key = fold_env_key(&name);
        if key.is_empty() || key.starts_with('.') || key.ends_with('.') {
            log::debug!("Skipping environment variable '{}' with no usable key", name);
            continue;
        }
        map.insert(key, Value::String(value));
        count += 1;
    }
    store.write_map(PropertyLayer::Override, map);
    count
}
