//! The session token must survive a simulated page reload.
//!
//! Kept as a single test: it owns the process-wide `POSTBOARD_CONFIG_DIR`
//! override for this binary.

use postboard_client::SessionStore;
use tempfile::TempDir;

#[test]
fn token_survives_reload_until_cleared() {
    let dir = TempDir::new().unwrap();
    std::env::set_var("POSTBOARD_CONFIG_DIR", dir.path());

    // Fresh install: nothing persisted
    let store = SessionStore::load();
    assert_eq!(store.get(), None);

    store.set("persisted-tok");
    drop(store);

    // "Reload the page": a new store restores the token
    let store = SessionStore::load();
    assert_eq!(store.get().as_deref(), Some("persisted-tok"));

    store.clear();
    drop(store);

    // After logout the token is gone for good
    let store = SessionStore::load();
    assert_eq!(store.get(), None);
}
