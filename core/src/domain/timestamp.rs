//! Minute-precision UTC instants
//!
//! Every boundary of an attachment or data-life window is a [`Timestamp`].
//! Values cross the public boundary as ISO-8601 strings and are truncated to
//! the minute on the way in, so two inputs that name the same minute compare
//! equal regardless of how many seconds the caller sent along.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use thiserror::Error;

const DISPLAY_FORMAT: &str = "%Y-%m-%dT%H:%MZ";

// RFC 3339 insists on seconds
const OFFSET_FORMATS: &[&str] = &[
	"%Y-%m-%dT%H:%M%:z",
	"%Y-%m-%dT%H:%M%z",
	"%Y-%m-%d %H:%M%:z",
];

const NAIVE_FORMATS: &[&str] = &[
	"%Y-%m-%dT%H:%M",
	"%Y-%m-%dT%H:%MZ",
	"%Y-%m-%d %H:%M",
	"%Y-%m-%dT%H:%M:%S",
	"%Y-%m-%d %H:%M:%S",
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{input}' is not an ISO-8601 timestamp")]
pub struct TimestampParseError {
	pub input: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
	/// Truncates anything below the minute
	pub fn from_datetime(at: DateTime<Utc>) -> Self {
		let truncated = at
			.with_second(0)
			.and_then(|t| t.with_nanosecond(0))
			.unwrap_or(at);

		Self(truncated)
	}

	pub fn now() -> Self {
		Self::from_datetime(Utc::now())
	}

	pub fn as_datetime(&self) -> DateTime<Utc> {
		self.0
	}

	pub fn parse(input: &str) -> Result<Self, TimestampParseError> {
		let trimmed = input.trim();
		let err = || TimestampParseError {
			input: input.to_string(),
		};

		if let Ok(at) = DateTime::parse_from_rfc3339(trimmed) {
			return Ok(Self::from_datetime(at.with_timezone(&Utc)));
		}

		for format in OFFSET_FORMATS {
			if let Ok(at) = DateTime::parse_from_str(trimmed, format) {
				return Ok(Self::from_datetime(at.with_timezone(&Utc)));
			}
		}

		for format in NAIVE_FORMATS {
			if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
				return Ok(Self::from_datetime(naive.and_utc()));
			}
		}

		let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| err())?;
		let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(err)?;

		Ok(Self::from_datetime(midnight.and_utc()))
	}
}

impl From<DateTime<Utc>> for Timestamp {
	fn from(at: DateTime<Utc>) -> Self {
		Self::from_datetime(at)
	}
}

impl From<Timestamp> for DateTime<Utc> {
	fn from(ts: Timestamp) -> Self {
		ts.0
	}
}

impl FromStr for Timestamp {
	type Err = TimestampParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

impl fmt::Display for Timestamp {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0.format(DISPLAY_FORMAT))
	}
}

impl Serialize for Timestamp {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for Timestamp {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let raw = String::deserialize(deserializer)?;
		Self::parse(&raw).map_err(serde::de::Error::custom)
	}
}
