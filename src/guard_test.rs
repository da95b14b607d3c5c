use std::sync::Arc;

use super::*;
use crate::credentials::MemoryCredentialStore;
use crate::testing::{ScriptedTransport, json, manager, me_reply, token_reply};
use crate::types::Identity;

fn unauthenticated() -> Session {
    Session::default()
}

fn validating() -> Session {
    Session { token: Some("tok".into()), identity: None, loading: true }
}

fn signed_in(role: Role) -> Session {
    Session {
        token: Some("tok".into()),
        identity: Some(Identity { id: 1, username: "alice".into(), role }),
        loading: false,
    }
}

const PROTECTED: [Access; 3] = [Access::Authenticated, Access::Role(Role::User), Access::Role(Role::Admin)];

// =============================================================================
// evaluate
// =============================================================================

#[test]
fn unauthenticated_redirects_to_login_for_any_requirement() {
    let guard = AccessGuard::default();
    for access in PROTECTED {
        let decision = guard.evaluate(&unauthenticated(), access, "/edit/4");
        assert_eq!(decision, Decision::RedirectToLogin { return_to: Some("/edit/4".into()) });
    }
}

#[test]
fn validating_is_pending_never_redirect() {
    let guard = AccessGuard::new(DenyTarget::Forbidden);
    for access in PROTECTED {
        let decision = guard.evaluate(&validating(), access, "/admin/users");
        assert_eq!(decision, Decision::Pending);
        assert!(!decision.is_redirect());
    }
}

#[test]
fn regular_user_denied_admin_route_without_login_redirect() {
    let guard = AccessGuard::default();
    let decision = guard.evaluate(&signed_in(Role::User), Access::Role(Role::Admin), "/admin/users");
    assert_eq!(decision, Decision::Deny(DenyTarget::Home));
    assert_eq!(decision.redirect_path(), Some("/"));
}

#[test]
fn deny_target_can_be_forbidden_page() {
    let guard = AccessGuard::new(DenyTarget::Forbidden);
    let decision = guard.evaluate(&signed_in(Role::User), Access::Role(Role::Admin), "/admin/users");
    assert_eq!(decision.redirect_path(), Some("/403"));
}

#[test]
fn admin_renders_everything() {
    let guard = AccessGuard::default();
    for access in PROTECTED {
        assert_eq!(guard.evaluate(&signed_in(Role::Admin), access, "/"), Decision::Render);
    }
}

#[test]
fn regular_user_renders_authenticated_routes() {
    let guard = AccessGuard::default();
    assert_eq!(guard.evaluate(&signed_in(Role::User), Access::Authenticated, "/"), Decision::Render);
    assert_eq!(guard.evaluate(&signed_in(Role::User), Access::Role(Role::User), "/"), Decision::Render);
}

#[test]
fn public_routes_render_in_every_state() {
    let guard = AccessGuard::default();
    for session in [unauthenticated(), validating(), signed_in(Role::User)] {
        assert_eq!(guard.evaluate(&session, Access::Public, "/login"), Decision::Render);
    }
}

#[test]
fn login_location_is_not_captured_as_return_target() {
    let guard = AccessGuard::default();
    let decision = guard.evaluate(&unauthenticated(), Access::Authenticated, "/login");
    assert_eq!(decision, Decision::RedirectToLogin { return_to: None });
}

// =============================================================================
// navigate
// =============================================================================

#[test]
fn navigate_follows_admin_alias() {
    let guard = AccessGuard::default();
    let nav = guard.navigate(&signed_in(Role::Admin), "/admin");
    assert_eq!(nav.route, Route::AdminUsers);
    assert_eq!(nav.decision, Decision::Render);
}

#[test]
fn navigate_unknown_path_renders_not_found() {
    let guard = AccessGuard::default();
    let nav = guard.navigate(&unauthenticated(), "/nope");
    assert_eq!(nav.route, Route::NotFound);
    assert_eq!(nav.decision, Decision::Render);
}

// =============================================================================
// scenarios with a live session manager
// =============================================================================

#[tokio::test]
async fn startup_with_rejected_token_redirects_protected_routes() {
    let store = Arc::new(MemoryCredentialStore::with_token("stale"));
    let transport = ScriptedTransport::new(vec![json(401, serde_json::json!({}))]);
    let mgr = manager(&store, &transport);
    let guard = AccessGuard::default();

    assert_eq!(guard.navigate(&mgr.snapshot(), "/").decision, Decision::Pending);
    mgr.initialize().await;

    for location in ["/", "/new", "/edit/1", "/admin/users"] {
        let decision = guard.navigate(&mgr.snapshot(), location).decision;
        assert!(matches!(decision, Decision::RedirectToLogin { .. }), "{location}: {decision:?}");
    }
}

#[tokio::test]
async fn admin_login_permits_admin_users() {
    let store = Arc::new(MemoryCredentialStore::new());
    let transport = ScriptedTransport::new(vec![token_reply("tok"), me_reply(1, "alice", "ROLE_ADMIN")]);
    let mgr = manager(&store, &transport);
    mgr.login("alice", "secret").await.unwrap();

    let guard = AccessGuard::default();
    for location in ["/admin/users", "/admin/users/new", "/admin/users/2/edit", "/", "/new"] {
        assert_eq!(guard.navigate(&mgr.snapshot(), location).decision, Decision::Render);
    }
}

#[tokio::test]
async fn logout_then_any_protected_route_redirects_to_login() {
    let store = Arc::new(MemoryCredentialStore::new());
    let transport = ScriptedTransport::new(vec![token_reply("tok"), me_reply(1, "alice", "ROLE_ADMIN")]);
    let mgr = manager(&store, &transport);
    mgr.login("alice", "secret").await.unwrap();
    mgr.logout();

    let guard = AccessGuard::default();
    for location in ["/", "/admin/users", "/edit/3"] {
        assert!(matches!(guard.navigate(&mgr.snapshot(), location).decision, Decision::RedirectToLogin { .. }));
    }
}

#[tokio::test]
async fn watch_reevaluates_on_session_change() {
    let store = Arc::new(MemoryCredentialStore::new());
    let transport = ScriptedTransport::new(vec![token_reply("tok"), me_reply(1, "bob", "ROLE_USER")]);
    let mgr = manager(&store, &transport);
    let mut changes = mgr.subscribe();
    let guard = AccessGuard::default();

    mgr.login("bob", "pw").await.unwrap();
    let nav = guard.watch(&mut changes, "/admin/users").await.unwrap();
    assert_eq!(nav.decision, Decision::Deny(DenyTarget::Home));

    assert!(mgr.invalidate("tok"));
    let nav = guard.watch(&mut changes, "/").await.unwrap();
    assert!(matches!(nav.decision, Decision::RedirectToLogin { .. }));
}

#[tokio::test]
async fn watch_ends_when_manager_dropped() {
    let store = Arc::new(MemoryCredentialStore::new());
    let transport = ScriptedTransport::new(vec![]);
    let mgr = manager(&store, &transport);
    let mut changes = mgr.subscribe();
    drop(mgr);

    assert!(AccessGuard::default().watch(&mut changes, "/").await.is_none());
}
