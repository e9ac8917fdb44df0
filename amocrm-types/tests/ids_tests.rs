use amocrm_types::EntityId;
use serde_json::json;

// ── Construction ─────────────────────────────────────────────────

#[test]
fn new_and_get() {
    let id = EntityId::new(42);
    assert_eq!(id.get(), 42);
    assert_eq!(u64::from(id), 42);
}

#[test]
fn try_from_negative_fails() {
    assert!(EntityId::try_from(-1i64).is_err());
    assert_eq!(EntityId::try_from(7i64).unwrap(), EntityId::new(7));
}

// ── Parsing ──────────────────────────────────────────────────────

#[test]
fn parse_digits() {
    let id: EntityId = "1234".parse().unwrap();
    assert_eq!(id, EntityId::new(1234));
}

#[test]
fn parse_rejects_non_digits() {
    assert!("12a".parse::<EntityId>().is_err());
    assert!("".parse::<EntityId>().is_err());
    assert!("-5".parse::<EntityId>().is_err());
}

#[test]
fn display_matches_number() {
    assert_eq!(EntityId::new(99).to_string(), "99");
}

// ── Wire form ────────────────────────────────────────────────────

#[test]
fn from_json_number() {
    assert_eq!(EntityId::from_json(&json!(5)), Some(EntityId::new(5)));
}

#[test]
fn from_json_digit_string() {
    assert_eq!(EntityId::from_json(&json!("17")), Some(EntityId::new(17)));
}

#[test]
fn from_json_id_object() {
    assert_eq!(EntityId::from_json(&json!({"id": 3})), Some(EntityId::new(3)));
}

#[test]
fn from_json_rejects_other_shapes() {
    assert_eq!(EntityId::from_json(&json!(null)), None);
    assert_eq!(EntityId::from_json(&json!(-4)), None);
    assert_eq!(EntityId::from_json(&json!("abc")), None);
    assert_eq!(EntityId::from_json(&json!([1])), None);
}

#[test]
fn serde_is_transparent() {
    let id = EntityId::new(8);
    assert_eq!(serde_json::to_value(id).unwrap(), json!(8));
    let back: EntityId = serde_json::from_value(json!(8)).unwrap();
    assert_eq!(back, id);
    assert_eq!(id.to_json(), json!(8));
}
