use amocrm_types::EpochSeconds;
use chrono::{NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use serde_json::json;

// ── Wire parsing ─────────────────────────────────────────────────

#[test]
fn from_json_integer() {
    let ts = EpochSeconds::from_json(&json!(1_600_000_000)).unwrap();
    assert_eq!(ts, Some(EpochSeconds::new(1_600_000_000)));
}

#[test]
fn from_json_float_drops_fraction() {
    let ts = EpochSeconds::from_json(&json!(1_600_000_000.75)).unwrap();
    assert_eq!(ts, Some(EpochSeconds::new(1_600_000_000)));
}

#[test]
fn from_json_numeric_string() {
    let ts = EpochSeconds::from_json(&json!("1600000000")).unwrap();
    assert_eq!(ts, Some(EpochSeconds::new(1_600_000_000)));
}

#[test]
fn from_json_null_is_absent() {
    assert_eq!(EpochSeconds::from_json(&json!(null)).unwrap(), None);
    assert_eq!(EpochSeconds::from_json(&json!("")).unwrap(), None);
}

#[test]
fn from_json_rejects_garbage() {
    assert!(EpochSeconds::from_json(&json!("yesterday")).is_err());
    assert!(EpochSeconds::from_json(&json!({"ts": 1})).is_err());
}

// ── chrono conversions ───────────────────────────────────────────

#[test]
fn datetime_round_trip() {
    let dt = Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap();
    let ts = EpochSeconds::from_datetime(&dt);
    assert_eq!(ts.to_datetime(), Some(dt));
}

#[test]
fn date_is_midnight_utc() {
    let date = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
    let ts = EpochSeconds::from_date(date);
    assert_eq!(ts.get(), 1_577_923_200);
    assert_eq!(ts.to_date(), Some(date));
}

// ── Monotonic advance ────────────────────────────────────────────

#[test]
fn advance_without_previous_uses_now() {
    let now = EpochSeconds::new(1000);
    assert_eq!(EpochSeconds::advance(None, now), now);
}

#[test]
fn advance_with_past_previous_uses_now() {
    let now = EpochSeconds::new(1000);
    assert_eq!(EpochSeconds::advance(Some(EpochSeconds::new(900)), now), now);
}

#[test]
fn advance_past_future_previous() {
    let now = EpochSeconds::new(1000);
    let skewed = EpochSeconds::new(1500);
    assert_eq!(EpochSeconds::advance(Some(skewed), now), EpochSeconds::new(1501));
}

#[test]
fn advance_when_equal_moves_forward() {
    let now = EpochSeconds::new(1000);
    assert_eq!(EpochSeconds::advance(Some(now), now), EpochSeconds::new(1001));
}

#[test]
fn tick_is_not_before_wall_clock() {
    let before = EpochSeconds::now();
    let ts = EpochSeconds::tick(None);
    assert!(ts >= before);
}

proptest! {
    #[test]
    fn advance_is_strictly_after_previous_and_not_before_now(
        prev in 0i64..4_000_000_000,
        now in 0i64..4_000_000_000,
    ) {
        let next = EpochSeconds::advance(Some(EpochSeconds::new(prev)), EpochSeconds::new(now));
        prop_assert!(next.get() > prev);
        prop_assert!(next.get() >= now);
    }
}
