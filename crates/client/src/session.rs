//! Session store: the process-wide owner of the bearer token.

use std::cell::RefCell;

use crate::storage;

const SESSION_KEY: &str = "postboard_session";

/// Owner of the authentication token.
///
/// Exactly one instance exists per process, shared into the controllers via
/// `Rc`. Mutations are synchronous and serialized by the single-threaded UI
/// event loop; the only writers are the auth controller on success and the
/// logout / account-deletion / session-invalidation paths.
#[derive(Debug)]
pub struct SessionStore {
    token: RefCell<Option<String>>,
    durable: bool,
}

impl SessionStore {
    /// Create a store, restoring any token persisted by a previous page load.
    pub fn load() -> Self {
        Self {
            token: RefCell::new(storage::load(SESSION_KEY)),
            durable: true,
        }
    }

    /// In-memory store that skips durable persistence entirely. For tests and
    /// embedders that manage persistence themselves.
    pub fn ephemeral() -> Self {
        Self {
            token: RefCell::new(None),
            durable: false,
        }
    }

    /// Store a token. Pure assignment, cannot fail.
    pub fn set(&self, token: impl Into<String>) {
        let token = token.into();
        if self.durable {
            storage::save(SESSION_KEY, &token);
        }
        *self.token.borrow_mut() = Some(token);
    }

    /// Remove the token, including its persisted copy. Idempotent.
    pub fn clear(&self) {
        if self.durable {
            storage::remove(SESSION_KEY);
        }
        self.token.borrow_mut().take();
    }

    /// Current token, if a session is active.
    pub fn get(&self) -> Option<String> {
        self.token.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.borrow().is_some()
    }
}
