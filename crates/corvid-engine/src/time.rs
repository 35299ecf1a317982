//! Engine time representation
//!
//! Engine timestamps count microseconds since 1601-01-01T00:00:00Z, the epoch
//! used by Chromium-based engines. Conversions fail for dates the engine cannot
//! represent (before 1601 or after year 30827).

use chrono::{DateTime, Datelike, Utc};

use crate::error::EngineError;
use crate::Result;

/// Microseconds between 1601-01-01 and 1970-01-01.
const UNIX_EPOCH_OFFSET_MICROS: i64 = 11_644_473_600_000_000;

const MIN_YEAR: i32 = 1601;
const MAX_YEAR: i32 = 30827;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EngineTime(i64);

impl EngineTime {
    pub fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    pub fn as_micros(&self) -> i64 {
        self.0
    }

    pub fn from_utc(time: DateTime<Utc>) -> Result<Self> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&time.year()) {
            return Err(EngineError::TimeOutOfRange(time.to_rfc3339()));
        }

        time.timestamp_micros()
            .checked_add(UNIX_EPOCH_OFFSET_MICROS)
            .map(Self)
            .ok_or_else(|| EngineError::TimeOutOfRange(time.to_rfc3339()))
    }

    pub fn to_utc(&self) -> Result<DateTime<Utc>> {
        if self.0 < 0 {
            return Err(EngineError::TimeOutOfRange(format!("{}us", self.0)));
        }

        let unix_micros = self.0 - UNIX_EPOCH_OFFSET_MICROS;
        let secs = unix_micros.div_euclid(1_000_000);
        let nanos = (unix_micros.rem_euclid(1_000_000) * 1_000) as u32;

        DateTime::from_timestamp(secs, nanos)
            .filter(|t| t.year() <= MAX_YEAR)
            .ok_or_else(|| EngineError::TimeOutOfRange(format!("{}us", self.0)))
    }
}
