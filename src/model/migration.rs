//! Legacy record migration.
//!
//! Older editors wrote shapes the typed model no longer accepts directly.
//! Records are normalized as raw JSON before decoding, so a portfolio saved
//! by any editor version loads without losing fields.

use serde_json::{Map, Value};

type MigrationFn = fn(&mut Map<String, Value>) -> bool;

/// Editor-state migrations, applied in order.
const EDITOR_STATE_MIGRATIONS: &[(&str, MigrationFn)] = &[
    ("social links object to array", social_links_to_array),
    ("avatarSrc to avatar", avatar_src_to_avatar),
];

/// Normalize a stored portfolio record in place. Returns true if anything
/// changed.
pub fn migrate_portfolio(record: &mut Value) -> bool {
    match record
        .as_object_mut()
        .and_then(|obj| obj.get_mut("editorState"))
    {
        Some(state) => migrate_editor_state(state),
        None => false,
    }
}

/// Normalize a raw editor-state object in place. Returns true if anything
/// changed.
pub fn migrate_editor_state(state: &mut Value) -> bool {
    let Some(obj) = state.as_object_mut() else {
        return false;
    };

    let mut changed = false;
    for (name, migration) in EDITOR_STATE_MIGRATIONS {
        if migration(obj) {
            tracing::debug!(migration = name, "migrated legacy editor state");
            changed = true;
        }
    }
    changed
}

/// `{"github": "https://..."}` becomes `[{"platform": "github", "url": "https://..."}]`.
fn social_links_to_array(state: &mut Map<String, Value>) -> bool {
    let Some(Value::Object(links)) = state.get("socialLinks") else {
        return false;
    };

    let converted: Vec<Value> = links
        .iter()
        .filter_map(|(platform, url)| {
            url.as_str().map(|url| {
                serde_json::json!({
                    "platform": platform,
                    "url": url,
                })
            })
        })
        .collect();

    state.insert("socialLinks".to_string(), Value::Array(converted));
    true
}

fn avatar_src_to_avatar(state: &mut Map<String, Value>) -> bool {
    let has_avatar = state
        .get("avatar")
        .and_then(Value::as_str)
        .is_some_and(|s| !s.is_empty());
    if has_avatar {
        return false;
    }

    match state.get("avatarSrc").and_then(Value::as_str) {
        Some(src) if !src.is_empty() => {
            let src = src.to_string();
            state.insert("avatar".to_string(), Value::String(src));
            true
        }
        _ => false,
    }
}
