use super::*;

// =============================================================
// Role parsing and serde
// =============================================================

#[test]
fn role_parses_wire_and_bare_spellings() {
    assert_eq!("ROLE_ADMIN".parse::<Role>().unwrap(), Role::Admin);
    assert_eq!("ROLE_USER".parse::<Role>().unwrap(), Role::User);
    assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
    assert_eq!(" role_user ".parse::<Role>().unwrap(), Role::User);
}

#[test]
fn role_rejects_substring_matches() {
    assert!("SUPERADMIN".parse::<Role>().is_err());
    assert!("ROLE_ADMINISTRATOR".parse::<Role>().is_err());
    assert!("".parse::<Role>().is_err());
}

#[test]
fn role_serializes_to_wire_form() {
    assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ROLE_ADMIN\"");
    assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"ROLE_USER\"");
}

#[test]
fn role_deserialize_unknown_is_error() {
    assert!(serde_json::from_str::<Role>("\"ROLE_GUEST\"").is_err());
}

#[test]
fn role_satisfies_capabilities() {
    assert!(Role::Admin.satisfies(Role::Admin));
    assert!(Role::Admin.satisfies(Role::User));
    assert!(Role::User.satisfies(Role::User));
    assert!(!Role::User.satisfies(Role::Admin));
}

#[test]
fn role_label_strips_prefix() {
    assert_eq!(Role::Admin.label(), "ADMIN");
    assert_eq!(Role::User.to_string(), "ROLE_USER");
}

// =============================================================
// Identity
// =============================================================

#[test]
fn identity_deserializes_me_payload() {
    let me: Identity = serde_json::from_str(r#"{"id":1,"username":"alice","role":"ROLE_ADMIN"}"#).unwrap();
    assert_eq!(me, Identity { id: 1, username: "alice".into(), role: Role::Admin });
    assert!(me.is_admin());
}

// =============================================================
// Page
// =============================================================

#[test]
fn page_deserializes_paginated_shape() {
    let json = r#"{"content":[{"id":1,"title":"a","content":"b"}],"totalElements":11,"totalPages":2,"number":1,"size":10}"#;
    let page: Page<Post> = serde_json::from_str(json).unwrap();
    assert_eq!(page.content.len(), 1);
    assert_eq!(page.total_elements, 11);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.number, 1);
    assert_eq!(page.size, 10);
    assert!(page.has_previous());
    assert!(!page.has_next());
}

#[test]
fn page_accepts_bare_array() {
    let json = r#"[{"id":1,"title":"a","content":"b"},{"id":2}]"#;
    let page: Page<Post> = serde_json::from_str(json).unwrap();
    assert_eq!(page.content.len(), 2);
    assert_eq!(page.content[1].title, "");
    assert_eq!(page.total_pages, 1);
    assert!(!page.has_previous());
    assert!(!page.has_next());
}

#[test]
fn page_empty_array_has_zero_pages() {
    let page: Page<Post> = serde_json::from_str("[]").unwrap();
    assert_eq!(page.total_pages, 0);
    assert_eq!(page.total_elements, 0);
}

#[test]
fn page_serializes_camel_case() {
    let page = Page::single(vec![1_u8, 2]);
    let value = serde_json::to_value(&page).unwrap();
    assert_eq!(value["totalElements"], 2);
    assert_eq!(value["totalPages"], 1);
}

#[test]
fn page_map_keeps_metadata() {
    let page = Page { content: vec![1, 2, 3], total_elements: 30, total_pages: 3, number: 2, size: 10 };
    let mapped = page.map(|n| n * 2);
    assert_eq!(mapped.content, vec![2, 4, 6]);
    assert_eq!(mapped.number, 2);
    assert_eq!(mapped.total_elements, 30);
}

// =============================================================
// Bodies
// =============================================================

#[test]
fn error_body_prefers_error_then_message() {
    let body: ErrorBody = serde_json::from_str(r#"{"message":"m"}"#).unwrap();
    assert_eq!(body.into_message().as_deref(), Some("m"));
    let body: ErrorBody = serde_json::from_str(r#"{"error":" "}"#).unwrap();
    assert_eq!(body.into_message(), None);
}

#[test]
fn user_update_omits_absent_password() {
    let update = UserUpdate { username: "bob".into(), password: None };
    assert_eq!(serde_json::to_value(&update).unwrap(), serde_json::json!({"username": "bob"}));
}

#[test]
fn new_user_serializes_role_wire_form() {
    let user = NewUser { username: "bob".into(), password: "pw".into(), role: Role::User };
    let value = serde_json::to_value(&user).unwrap();
    assert_eq!(value["role"], "ROLE_USER");
}
