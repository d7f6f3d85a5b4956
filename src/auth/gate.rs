// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Role-gated access decisions.
//!
//! [`authorize`] is a pure function of the session and the route's
//! requirement. Decisions are never cached: [`RouteGuard::evaluate`]
//! re-reads the live store on every call, so a cleared or replaced session
//! takes effect on the next navigation.

use crate::auth::roles::Role;
use crate::models::Session;
use crate::session::SessionStore;

/// Outcome of a gate evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// Render the requested route.
    Admit,
    /// No active session; send the user to authenticate.
    RedirectLogin,
    /// Authenticated, but this role is not allowed here.
    RedirectForbidden,
}

/// Decide access for a route requiring one of `required` roles.
///
/// An empty requirement admits any authenticated session. Authentication is
/// checked before role membership, so an anonymous user is always sent to
/// login, never to the forbidden screen.
pub fn authorize(session: Option<&Session>, required: &[Role]) -> AccessDecision {
    let Some(session) = session else {
        return AccessDecision::RedirectLogin;
    };
    if required.is_empty() || required.contains(&session.principal.role) {
        AccessDecision::Admit
    } else {
        AccessDecision::RedirectForbidden
    }
}

/// A route's required-role set, held declaratively and evaluated against
/// the live session store.
#[derive(Debug, Clone, Default)]
pub struct RouteGuard {
    required: Vec<Role>,
}

impl RouteGuard {
    /// Guard that admits any authenticated session.
    pub fn any_authenticated() -> Self {
        Self {
            required: Vec::new(),
        }
    }

    /// Guard restricted to the given roles.
    pub fn for_roles(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            required: roles.into_iter().collect(),
        }
    }

    pub fn required(&self) -> &[Role] {
        &self.required
    }

    /// Evaluate against the store's current session.
    pub fn evaluate(&self, store: &SessionStore) -> AccessDecision {
        authorize(store.current().as_ref(), &self.required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Principal, TokenPair};

    fn session_with_role(role: Role) -> Session {
        Session::issue(
            Principal {
                id: 1,
                username: "sam".to_string(),
                email: "sam@example.mil".to_string(),
                first_name: String::new(),
                last_name: String::new(),
                role,
                assigned_base: None,
            },
            TokenPair {
                access: "acc".to_string(),
                refresh: "ref".to_string(),
            },
        )
    }

    #[test]
    fn anonymous_is_sent_to_login() {
        assert_eq!(authorize(None, &[]), AccessDecision::RedirectLogin);
        assert_eq!(
            authorize(None, &[Role::Admin]),
            AccessDecision::RedirectLogin
        );
    }

    #[test]
    fn empty_requirement_admits_any_session() {
        let session = session_with_role(Role::LogisticsOfficer);
        assert_eq!(authorize(Some(&session), &[]), AccessDecision::Admit);
    }

    #[test]
    fn member_role_is_admitted() {
        let session = session_with_role(Role::BaseCommander);
        assert_eq!(
            authorize(Some(&session), &[Role::Admin, Role::BaseCommander]),
            AccessDecision::Admit
        );
    }

    #[test]
    fn non_member_role_is_forbidden_not_logged_out() {
        let session = session_with_role(Role::LogisticsOfficer);
        assert_eq!(
            authorize(Some(&session), &[Role::Admin]),
            AccessDecision::RedirectForbidden
        );
    }

    #[test]
    fn guard_reflects_store_changes_on_every_evaluation() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path());
        let guard = RouteGuard::for_roles([Role::LogisticsOfficer]);

        assert_eq!(guard.evaluate(&store), AccessDecision::RedirectLogin);

        store
            .establish(session_with_role(Role::LogisticsOfficer))
            .unwrap();
        assert_eq!(guard.evaluate(&store), AccessDecision::Admit);

        store.clear().unwrap();
        assert_eq!(guard.evaluate(&store), AccessDecision::RedirectLogin);
    }

    #[test]
    fn any_authenticated_guard_has_no_role_requirement() {
        let guard = RouteGuard::any_authenticated();
        assert!(guard.required().is_empty());
    }
}
