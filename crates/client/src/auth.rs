//! Auth controller: orchestrates login, registration, and social login.

use std::cell::Cell;
use std::rc::Rc;

use thiserror::Error;

use postboard_shared::{ApiError, AuthResponse};

use crate::api_client::ApiClient;
use crate::session::SessionStore;
use crate::{log_debug, log_warn};

const LOGIN_FALLBACK: &str = "Could not sign in.";
const REGISTER_FALLBACK: &str = "Could not create the account.";
const SOCIAL_FALLBACK: &str = "Social sign-in failed. Please try again.";
const DELETE_ACCOUNT_FALLBACK: &str = "Could not delete the account.";
const PASSWORD_MISMATCH: &str = "Passwords do not match.";
const NOT_SIGNED_IN: &str = "You are not signed in.";
const CONNECTION_FAILED: &str = "Could not reach the server. Please try again.";

/// Session phase as seen by the view layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    Unauthenticated,
    Authenticating,
    Authenticated,
}

/// User-facing authentication failure.
///
/// Every variant carries a ready-to-display message; nothing here propagates
/// as an uncaught failure into the view layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// A local precondition failed; no request was issued.
    #[error("{0}")]
    Validation(String),
    /// The server rejected the attempt.
    #[error("{0}")]
    Rejected(String),
    /// No response was received from the server.
    #[error("{0}")]
    Connection(String),
}

/// Orchestrates the session state machine:
/// `Unauthenticated -> Authenticating -> Authenticated`, back to
/// `Unauthenticated` on logout or a server-confirmed invalid token.
pub struct AuthController {
    api: ApiClient,
    session: Rc<SessionStore>,
    phase: Cell<AuthPhase>,
}

impl AuthController {
    pub fn new(api: ApiClient, session: Rc<SessionStore>) -> Self {
        // A token restored from a previous page load starts us authenticated;
        // the first profile fetch will confirm or invalidate it.
        let phase = if session.is_authenticated() {
            AuthPhase::Authenticated
        } else {
            AuthPhase::Unauthenticated
        };
        Self {
            api,
            session,
            phase: Cell::new(phase),
        }
    }

    pub fn phase(&self) -> AuthPhase {
        self.phase.get()
    }

    /// Log in with email and password.
    ///
    /// A call made while another attempt is in flight is ignored: it returns
    /// `Ok(())` without issuing a request, so duplicate submissions cannot
    /// create a second session.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let Some(prior) = self.begin_attempt() else {
            return Ok(());
        };
        let result = self.api.login(email, password).await;
        self.finish_attempt(prior, result, LOGIN_FALLBACK)
    }

    /// Register a new account.
    ///
    /// The password confirmation is checked locally before any network call;
    /// a mismatch fails fast as a [`AuthError::Validation`].
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<(), AuthError> {
        if password != confirm_password {
            return Err(AuthError::Validation(PASSWORD_MISMATCH.to_string()));
        }
        let Some(prior) = self.begin_attempt() else {
            return Ok(());
        };
        let result = self.api.register(email, password).await;
        self.finish_attempt(prior, result, REGISTER_FALLBACK)
    }

    /// Log in with an opaque credential issued by a social provider.
    pub async fn social_login(&self, provider: &str, credential: &str) -> Result<(), AuthError> {
        let Some(prior) = self.begin_attempt() else {
            return Ok(());
        };
        let result = self.api.social_login(provider, credential).await;
        self.finish_attempt(prior, result, SOCIAL_FALLBACK)
    }

    /// Clear the session unconditionally. Idempotent.
    pub fn logout(&self) {
        self.session.clear();
        self.phase.set(AuthPhase::Unauthenticated);
    }

    /// Delete the account behind the current session.
    ///
    /// Success behaves exactly like [`Self::logout`]; failure preserves the
    /// session and has no other side effects.
    pub async fn delete_account(&self) -> Result<(), AuthError> {
        let Some(token) = self.session.get() else {
            return Err(AuthError::Validation(NOT_SIGNED_IN.to_string()));
        };
        match self.api.delete_account(&token).await {
            Ok(()) => {
                self.logout();
                Ok(())
            }
            Err(ApiError::Network(msg)) => {
                log_warn!("account deletion did not reach the server: {msg}");
                Err(AuthError::Connection(CONNECTION_FAILED.to_string()))
            }
            Err(err) => Err(AuthError::Rejected(
                err.server_message()
                    .unwrap_or_else(|| DELETE_ACCOUNT_FALLBACK.to_string()),
            )),
        }
    }

    /// Claim the in-flight slot, returning the phase to restore on failure.
    /// `None` means an attempt is already running and the caller must bail
    /// out without touching the phase.
    fn begin_attempt(&self) -> Option<AuthPhase> {
        let prior = self.phase.get();
        if prior == AuthPhase::Authenticating {
            log_debug!("auth attempt ignored: another one is in flight");
            return None;
        }
        self.phase.set(AuthPhase::Authenticating);
        Some(prior)
    }

    /// A failed attempt restores the prior phase: a rejected re-login while
    /// already authenticated leaves the existing session intact, so the phase
    /// must keep agreeing with the token in the store.
    fn finish_attempt(
        &self,
        prior: AuthPhase,
        result: Result<AuthResponse, ApiError>,
        fallback: &str,
    ) -> Result<(), AuthError> {
        match result {
            Ok(AuthResponse { token }) => {
                self.session.set(token);
                self.phase.set(AuthPhase::Authenticated);
                Ok(())
            }
            Err(ApiError::Network(msg)) => {
                self.phase.set(prior);
                log_warn!("auth request did not reach the server: {msg}");
                Err(AuthError::Connection(CONNECTION_FAILED.to_string()))
            }
            Err(err) => {
                self.phase.set(prior);
                Err(AuthError::Rejected(
                    err.server_message().unwrap_or_else(|| fallback.to_string()),
                ))
            }
        }
    }
}
