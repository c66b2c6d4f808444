//! Postboard client core.
//!
//! Session and data-synchronization layer for the postboard single-page
//! application: authentication token lifecycle, navigation guarding, and
//! reconciliation of the remote profile and post collection. The view layer
//! lives elsewhere; it renders the state exposed here and calls back into the
//! controllers on user actions.

pub mod api_client;
pub mod auth;
pub mod config;
pub mod guard;
pub mod logging;
pub mod posts;
pub mod session;
pub mod storage;

pub use api_client::ApiClient;
pub use auth::{AuthController, AuthError, AuthPhase};
pub use config::{Config, ConfigError};
pub use guard::{route_decision, RouteDecision};
pub use posts::{LoadOutcome, PostDraft, PostEdit, PostSyncController, SyncError};
pub use session::SessionStore;
