use time::OffsetDateTime;
use uuid::Uuid;

use super::*;

fn session(email: &str, token: &str) -> Session {
    Session {
        user_id: Uuid::new_v4(),
        email: email.to_owned(),
        access_token: token.to_owned(),
        expires_at: OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap(),
    }
}

// =============================================================================
// Role
// =============================================================================

#[test]
fn role_parses_known_values() {
    assert_eq!(Role::from("admin".to_owned()), Role::Admin);
    assert_eq!(Role::from("member".to_owned()), Role::Member);
}

#[test]
fn role_preserves_unknown_values() {
    let role = Role::from("editor".to_owned());
    assert_eq!(role, Role::Other("editor".to_owned()));
    assert_eq!(role.as_str(), "editor");
}

#[test]
fn role_round_trips_through_string() {
    for raw in ["admin", "member", "editor"] {
        let role = Role::from(raw.to_owned());
        assert_eq!(String::from(role), raw);
    }
}

#[test]
fn role_deserializes_from_json_string() {
    let role: Role = serde_json::from_str("\"admin\"").unwrap();
    assert_eq!(role, Role::Admin);
}

#[test]
fn role_display_matches_as_str() {
    assert_eq!(Role::Admin.to_string(), "admin");
    assert_eq!(Role::Other("editor".into()).to_string(), "editor");
}

// =============================================================================
// SessionEvent
// =============================================================================

#[test]
fn signed_in_carries_the_session() {
    let s = session("a@b.com", "t1");
    assert_eq!(SessionEvent::SignedIn(s.clone()).into_session(), Some(s));
}

#[test]
fn token_refresh_carries_the_session() {
    let s = session("a@b.com", "t2");
    assert_eq!(SessionEvent::TokenRefreshed(s.clone()).into_session(), Some(s));
}

#[test]
fn signed_out_clears_the_session() {
    assert_eq!(SessionEvent::SignedOut.into_session(), None);
}

// =============================================================================
// same_session
// =============================================================================

#[test]
fn same_session_matches_user_and_token() {
    let a = session("a@b.com", "t1");
    assert!(same_session(&a, &a.clone()));
}

#[test]
fn same_session_rejects_rotated_token() {
    let a = session("a@b.com", "t1");
    let mut b = a.clone();
    b.access_token = "t2".to_owned();
    assert!(!same_session(&a, &b));
}

#[test]
fn same_session_rejects_different_user() {
    let a = session("a@b.com", "t1");
    let mut b = a.clone();
    b.user_id = Uuid::new_v4();
    assert!(!same_session(&a, &b));
}

// =============================================================================
// Serde
// =============================================================================

#[test]
fn session_serializes_expiry_as_unix_timestamp() {
    let s = session("a@b.com", "t1");
    let json: serde_json::Value = serde_json::to_value(&s).unwrap();
    assert_eq!(json["expires_at"], 1_700_000_000);

    let restored: Session = serde_json::from_value(json).unwrap();
    assert_eq!(restored, s);
}

#[test]
fn message_deserializes_a_row_api_payload() {
    let raw = r#"{
        "id": "7f1aa3a2-31c6-4bb1-a3a4-3a9b2a6f7a01",
        "user_id": "1f0a93f2-6f6e-4f9a-9f59-0f6f3a2e9b11",
        "content": "hello",
        "created_at": "2026-08-07T01:23:45.123456Z"
    }"#;
    let msg: Message = serde_json::from_str(raw).unwrap();
    assert_eq!(msg.content, "hello");
    assert_eq!(msg.created_at.year(), 2026);
}

#[test]
fn message_serde_round_trip() {
    let msg = Message {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        content: "hi".to_owned(),
        created_at: OffsetDateTime::from_unix_timestamp(1_700_000_123).unwrap(),
    };
    let json = serde_json::to_string(&msg).unwrap();
    let restored: Message = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, msg);
}
