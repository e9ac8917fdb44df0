//! Epoch-second timestamps.
//!
//! The API stores every date as whole seconds since the Unix epoch (UTC).
//! `EpochSeconds` is that wire value; conversions to `chrono` types happen at
//! the field layer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// Seconds since the Unix epoch, UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpochSeconds(i64);

impl EpochSeconds {
    /// Current wall-clock time.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now().timestamp())
    }

    #[must_use]
    pub const fn new(secs: i64) -> Self {
        Self(secs)
    }

    #[must_use]
    pub const fn get(&self) -> i64 {
        self.0
    }

    /// Truncates a datetime to whole seconds.
    #[must_use]
    pub fn from_datetime(dt: &DateTime<Utc>) -> Self {
        Self(dt.timestamp())
    }

    /// Midnight UTC of the given date.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.and_hms_opt(0, 0, 0).map_or(0, |dt| dt.and_utc().timestamp()))
    }

    /// Converts back to a UTC datetime. `None` only for out-of-range values.
    #[must_use]
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp(self.0, 0)
    }

    /// Calendar date (UTC) of this instant.
    #[must_use]
    pub fn to_date(self) -> Option<NaiveDate> {
        self.to_datetime().map(|dt| dt.date_naive())
    }

    /// Reads a wire timestamp.
    ///
    /// Accepts integers, floats (fraction dropped) and numeric strings.
    /// `null` is a legitimate absence and yields `Ok(None)`.
    pub fn from_json(value: &Value) -> Result<Option<Self>> {
        match value {
            Value::Null => Ok(None),
            Value::Number(n) => {
                if let Some(secs) = n.as_i64() {
                    Ok(Some(Self(secs)))
                } else if let Some(secs) = n.as_f64() {
                    Ok(Some(Self(secs.floor() as i64)))
                } else {
                    Err(Error::InvalidTimestamp(n.to_string()))
                }
            }
            Value::String(s) if s.is_empty() => Ok(None),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map(|secs| Some(Self(secs.floor() as i64)))
                .map_err(|_| Error::InvalidTimestamp(s.clone())),
            other => Err(Error::InvalidTimestamp(other.to_string())),
        }
    }

    /// Wire form of the timestamp.
    #[must_use]
    pub fn to_json(self) -> Value {
        Value::from(self.0)
    }

    /// Next `last_modified` stamp for a record.
    ///
    /// Never earlier than `now`, and strictly greater than `previous`: if the
    /// server recorded a modification time ahead of the local clock, the new
    /// stamp moves one second past it instead of going backward.
    #[must_use]
    pub fn advance(previous: Option<Self>, now: Self) -> Self {
        match previous {
            Some(prev) if prev.0 >= now.0 => Self(prev.0.saturating_add(1)),
            _ => now,
        }
    }

    /// [`EpochSeconds::advance`] against the current wall clock.
    #[must_use]
    pub fn tick(previous: Option<Self>) -> Self {
        Self::advance(previous, Self::now())
    }
}

impl From<DateTime<Utc>> for EpochSeconds {
    fn from(value: DateTime<Utc>) -> Self {
        Self::from_datetime(&value)
    }
}
