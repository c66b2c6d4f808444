//! Navigation guard for protected views.

use crate::session::SessionStore;

/// Outcome of evaluating a protected route against the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// A session is present; the protected view may render.
    Allow,
    /// No session; the view layer must navigate to the login view.
    RedirectToLogin,
}

/// Decide whether a protected view may render.
///
/// Pure function of session state, re-evaluated on every protected-view entry
/// and after any session change. The post-sync controller's
/// session-invalidation path clears the store before reporting, so a
/// post-mount invalidation converges on the same redirect.
pub fn route_decision(session: &SessionStore) -> RouteDecision {
    if session.is_authenticated() {
        RouteDecision::Allow
    } else {
        RouteDecision::RedirectToLogin
    }
}
