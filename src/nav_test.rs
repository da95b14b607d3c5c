use super::*;
use crate::types::{Identity, Role};

fn session_for(role: Role) -> Session {
    Session {
        token: Some("tok".into()),
        identity: Some(Identity { id: 1, username: "alice".into(), role }),
        loading: false,
    }
}

#[test]
fn hidden_without_token() {
    assert_eq!(NavMenu::for_session(&Session::default(), "/"), None);
}

#[test]
fn hidden_on_auth_screens() {
    let session = session_for(Role::Admin);
    assert_eq!(NavMenu::for_session(&session, "/login"), None);
    assert_eq!(NavMenu::for_session(&session, "/register"), None);
}

#[test]
fn admin_gets_admin_link() {
    let menu = NavMenu::for_session(&session_for(Role::Admin), "/").unwrap();
    assert_eq!(menu.primary, NavLink { label: "Admin", path: "/admin/users" });
    assert_eq!(menu.greeting, "alice (ADMIN)");
    assert!(menu.show_logout);
}

#[test]
fn regular_user_gets_home_link() {
    let menu = NavMenu::for_session(&session_for(Role::User), "/new").unwrap();
    assert_eq!(menu.primary, NavLink { label: "Home", path: "/" });
    assert_eq!(menu.greeting, "alice (USER)");
}

#[test]
fn pending_identity_shows_empty_greeting() {
    let session = Session { token: Some("tok".into()), identity: None, loading: true };
    let menu = NavMenu::for_session(&session, "/").unwrap();
    assert_eq!(menu.primary.path, "/");
    assert!(menu.greeting.is_empty());
}
