//! Route access decisions.

use crate::store::SessionStatus;

/// Message shown while a decision has to wait on the session store
pub const VERIFYING_MESSAGE: &str = "Verifying authentication...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Auth,
    CodeReviewer,
    History,
}

impl Route {
    /// Routes that need a signed-in user
    pub fn is_protected(self) -> bool {
        matches!(self, Route::CodeReviewer | Route::History)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Wait,
    Redirect(Route),
    Allow,
}

/// Decide whether `route` may be shown for the current session.
pub fn decide(route: Route, status: SessionStatus, loading: bool) -> GuardDecision {
    if loading {
        return GuardDecision::Wait;
    }
    let authenticated = status == SessionStatus::Authenticated;
    match route {
        r if r.is_protected() && !authenticated => GuardDecision::Redirect(Route::Auth),
        Route::Auth if authenticated => GuardDecision::Redirect(Route::CodeReviewer),
        _ => GuardDecision::Allow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_waits() {
        for route in [Route::Auth, Route::CodeReviewer, Route::History] {
            assert_eq!(
                decide(route, SessionStatus::Authenticating, true),
                GuardDecision::Wait
            );
        }
    }

    #[test]
    fn test_protected_routes_redirect_anonymous() {
        assert_eq!(
            decide(Route::CodeReviewer, SessionStatus::Anonymous, false),
            GuardDecision::Redirect(Route::Auth)
        );
        assert_eq!(
            decide(Route::History, SessionStatus::Anonymous, false),
            GuardDecision::Redirect(Route::Auth)
        );
    }

    #[test]
    fn test_auth_route_redirects_signed_in_user() {
        assert_eq!(
            decide(Route::Auth, SessionStatus::Authenticated, false),
            GuardDecision::Redirect(Route::CodeReviewer)
        );
    }

    #[test]
    fn test_allowed() {
        assert_eq!(
            decide(Route::Auth, SessionStatus::Anonymous, false),
            GuardDecision::Allow
        );
        assert_eq!(
            decide(Route::History, SessionStatus::Authenticated, false),
            GuardDecision::Allow
        );
    }
}
