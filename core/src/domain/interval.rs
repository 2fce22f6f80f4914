//! Interval arithmetic over [`Timestamp`]s
//!
//! An [`Interval`] with no end is unbounded to the right. Overlap uses
//! start-inclusive, end-exclusive semantics so that a detach and the next
//! attach may share the same instant.

use super::{data_life::WindowError, timestamp::Timestamp};
use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Interval {
	start: Timestamp,
	end: Option<Timestamp>,
}

impl Interval {
	pub fn new(start: Timestamp, end: Option<Timestamp>) -> Result<Self, WindowError> {
		match end {
			Some(end) if start > end => Err(WindowError::InvalidInterval { start, end }),
			_ => Ok(Self { start, end }),
		}
	}

	pub fn open(start: Timestamp) -> Self {
		Self { start, end: None }
	}

	pub fn start(&self) -> Timestamp {
		self.start
	}

	pub fn end(&self) -> Option<Timestamp> {
		self.end
	}

	pub fn is_open(&self) -> bool {
		self.end.is_none()
	}

	/// `start <= at < end`
	pub fn contains_instant(&self, at: Timestamp) -> bool {
		self.start <= at && self.end.map_or(true, |end| at < end)
	}

	pub fn contains(&self, inner: &Interval) -> bool {
		contains(self, inner)
	}

	pub fn overlaps(&self, other: &Interval) -> bool {
		overlaps(self, other)
	}
}

/// Compares two right bounds, `None` being +infinity
fn cmp_end(a: Option<Timestamp>, b: Option<Timestamp>) -> Ordering {
	match (a, b) {
		(None, None) => Ordering::Equal,
		(None, Some(_)) => Ordering::Greater,
		(Some(_), None) => Ordering::Less,
		(Some(a), Some(b)) => a.cmp(&b),
	}
}

/// Whether `start` lies strictly before the right bound `end`
fn before_end(start: Timestamp, end: Option<Timestamp>) -> bool {
	end.map_or(true, |end| start < end)
}

pub fn contains(outer: &Interval, inner: &Interval) -> bool {
	outer.start <= inner.start && cmp_end(inner.end, outer.end) != Ordering::Greater
}

pub fn overlaps(a: &Interval, b: &Interval) -> bool {
	before_end(a.start, b.end) && before_end(b.start, a.end)
}

/// Pulls both bounds of `inner` into `outer`.
///
/// Display-only helper; saves never clamp, they reject.
pub fn clamp_to_outer(inner: &Interval, outer: &Interval) -> Interval {
	let clamp = |at: Timestamp| {
		let at = at.max(outer.start);
		match outer.end {
			Some(end) => at.min(end),
			None => at,
		}
	};

	let start = clamp(inner.start);
	let end = match inner.end {
		Some(end) => Some(clamp(end)),
		None => outer.end,
	};

	Interval { start, end }
}
