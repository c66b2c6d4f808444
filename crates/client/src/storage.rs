//! Cross-platform durable storage.
//!
//! One key/value API backed by:
//! - Web: `localStorage`
//! - Native: JSON files under the platform config directory
//!   (`~/.config/postboard/` on Linux), overridable with
//!   `POSTBOARD_CONFIG_DIR`.

use serde::{de::DeserializeOwned, Serialize};

/// Persist a value. Returns `true` on success.
pub fn save<T: Serialize>(key: &str, value: &T) -> bool {
    match serde_json::to_string(value) {
        Ok(json) => save_raw(key, &json),
        Err(_) => false,
    }
}

/// Load a persisted value.
///
/// Returns `None` when the key is absent or the stored data fails to decode.
pub fn load<T: DeserializeOwned>(key: &str) -> Option<T> {
    serde_json::from_str(&load_raw(key)?).ok()
}

/// Remove a persisted value. Removing an absent key is a no-op.
pub fn remove(key: &str) {
    remove_raw(key);
}

// =========================================
// Web (WASM) implementation
// =========================================

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok()?
}

#[cfg(target_arch = "wasm32")]
fn save_raw(key: &str, value: &str) -> bool {
    match local_storage() {
        Some(storage) => storage.set_item(key, value).is_ok(),
        None => false,
    }
}

#[cfg(target_arch = "wasm32")]
pub(crate) fn load_raw(key: &str) -> Option<String> {
    local_storage()?.get_item(key).ok()?
}

#[cfg(target_arch = "wasm32")]
fn remove_raw(key: &str) {
    if let Some(storage) = local_storage() {
        let _ = storage.remove_item(key);
    }
}

// =========================================
// Native implementation
// =========================================

#[cfg(not(target_arch = "wasm32"))]
fn storage_dir() -> Option<std::path::PathBuf> {
    let dir = match std::env::var("POSTBOARD_CONFIG_DIR") {
        Ok(dir) => std::path::PathBuf::from(dir),
        Err(_) => dirs::config_dir()?.join("postboard"),
    };
    if !dir.exists() {
        std::fs::create_dir_all(&dir).ok()?;
    }
    Some(dir)
}

#[cfg(not(target_arch = "wasm32"))]
fn entry_path(key: &str) -> Option<std::path::PathBuf> {
    // Sanitize the key so it is always a valid filename
    let safe_key = key.replace(['/', '\\', ':', '*', '?', '"', '<', '>', '|'], "_");
    Some(storage_dir()?.join(format!("{safe_key}.json")))
}

#[cfg(not(target_arch = "wasm32"))]
fn save_raw(key: &str, value: &str) -> bool {
    match entry_path(key) {
        Some(path) => std::fs::write(path, value).is_ok(),
        None => false,
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn load_raw(key: &str) -> Option<String> {
    std::fs::read_to_string(entry_path(key)?).ok()
}

#[cfg(not(target_arch = "wasm32"))]
fn remove_raw(key: &str) {
    if let Some(path) = entry_path(key) {
        let _ = std::fs::remove_file(path);
    }
}
