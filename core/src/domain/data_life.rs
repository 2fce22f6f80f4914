//! The data-life window of an attachment
//!
//! A [`DataLifeWindow`] pairs the attachment interval (when a device was on an
//! animal) with the data-life interval (when its readings count as evidence
//! for that animal). The nesting rule
//!
//! ```text
//! attachment_start <= data_life_start <= data_life_end <= attachment_end
//! ```
//!
//! holds for every value of this type: the fields are private and every
//! constructor and edit validates before returning. An open attachment never
//! has a data-life end.

use super::{interval::Interval, timestamp::Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// One of the two movable data-life bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DataLifeBound {
	DataLifeStart,
	DataLifeEnd,
}

/// Upper limit of an allowed range, printed as `open` when unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpperLimit(pub Option<Timestamp>);

impl fmt::Display for UpperLimit {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.0 {
			Some(at) => write!(f, "{at}"),
			None => f.write_str("open"),
		}
	}
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
	#[error("interval starts at {start} but ends earlier, at {end}")]
	InvalidInterval { start: Timestamp, end: Timestamp },

	#[error("{bound} {value} must lie within [{lower}, {upper}]")]
	NestingViolation {
		bound: DataLifeBound,
		value: Timestamp,
		lower: Timestamp,
		upper: UpperLimit,
	},

	#[error("data_life_end cannot be set while the attachment is still open")]
	OpenAttachment,

	#[error("attachment closed at {attachment_end} has no data_life_end")]
	MissingDataLifeEnd { attachment_end: Timestamp },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "WindowFields", into = "WindowFields")]
pub struct DataLifeWindow {
	attachment: Interval,
	data_life: Interval,
	start_customized: bool,
	end_customized: bool,
}

/// Flat wire/storage form of a window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowFields {
	pub attachment_start: Timestamp,
	pub attachment_end: Option<Timestamp>,
	pub data_life_start: Timestamp,
	pub data_life_end: Option<Timestamp>,
	#[serde(default)]
	pub start_customized: bool,
	#[serde(default)]
	pub end_customized: bool,
}

impl DataLifeWindow {
	/// Build a window, defaulting omitted data-life bounds to the attachment bounds
	pub fn create(
		attachment_start: Timestamp,
		attachment_end: Option<Timestamp>,
		data_life_start: Option<Timestamp>,
		data_life_end: Option<Timestamp>,
	) -> Result<Self, WindowError> {
		let attachment = Interval::new(attachment_start, attachment_end)?;

		if attachment.is_open() && data_life_end.is_some() {
			return Err(WindowError::OpenAttachment);
		}

		let data_life_start = data_life_start.unwrap_or(attachment_start);
		let data_life_end = data_life_end.or(attachment_end);

		Self::validated(attachment, data_life_start, data_life_end, false, false)
	}

	/// Rebuild a stored window, keeping its customization flags
	pub fn restore(fields: WindowFields) -> Result<Self, WindowError> {
		let attachment = Interval::new(fields.attachment_start, fields.attachment_end)?;

		if attachment.is_open() && fields.data_life_end.is_some() {
			return Err(WindowError::OpenAttachment);
		}
		if let (Some(attachment_end), None) = (fields.attachment_end, fields.data_life_end) {
			return Err(WindowError::MissingDataLifeEnd { attachment_end });
		}

		Self::validated(
			attachment,
			fields.data_life_start,
			fields.data_life_end,
			fields.start_customized,
			fields.end_customized,
		)
	}

	fn validated(
		attachment: Interval,
		data_life_start: Timestamp,
		data_life_end: Option<Timestamp>,
		start_customized: bool,
		end_customized: bool,
	) -> Result<Self, WindowError> {
		let attachment_start = attachment.start();
		let attachment_end = attachment.end();

		if data_life_start < attachment_start
			|| attachment_end.is_some_and(|end| data_life_start > end)
		{
			return Err(WindowError::NestingViolation {
				bound: DataLifeBound::DataLifeStart,
				value: data_life_start,
				lower: attachment_start,
				upper: UpperLimit(data_life_end.or(attachment_end)),
			});
		}

		if let Some(end) = data_life_end {
			if end < data_life_start || attachment_end.is_some_and(|limit| end > limit) {
				return Err(WindowError::NestingViolation {
					bound: DataLifeBound::DataLifeEnd,
					value: end,
					lower: data_life_start,
					upper: UpperLimit(attachment_end),
				});
			}
		}

		let data_life = Interval::new(data_life_start, data_life_end)?;

		Ok(Self {
			attachment,
			data_life,
			start_customized: start_customized || data_life_start != attachment_start,
			end_customized: end_customized
				|| (attachment_end.is_some() && data_life_end != attachment_end),
		})
	}

	pub fn with_data_life_start(&self, start: Timestamp) -> Result<Self, WindowError> {
		self.with_data_life(Some(start), None)
	}

	pub fn with_data_life_end(&self, end: Timestamp) -> Result<Self, WindowError> {
		self.with_data_life(None, Some(end))
	}

	/// Move either or both bounds in a single validated step
	pub fn with_data_life(
		&self,
		start: Option<Timestamp>,
		end: Option<Timestamp>,
	) -> Result<Self, WindowError> {
		if end.is_some() && self.is_open() {
			return Err(WindowError::OpenAttachment);
		}

		Self::validated(
			self.attachment,
			start.unwrap_or(self.data_life.start()),
			end.or(self.data_life.end()),
			self.start_customized,
			self.end_customized,
		)
	}

	/// Close an open window at `attachment_end`
	pub fn close(
		&self,
		attachment_end: Timestamp,
		data_life_end: Option<Timestamp>,
	) -> Result<Self, WindowError> {
		let attachment = Interval::new(self.attachment.start(), Some(attachment_end))?;

		Self::validated(
			attachment,
			self.data_life.start(),
			Some(data_life_end.unwrap_or(attachment_end)),
			self.start_customized,
			false,
		)
	}

	pub fn attachment(&self) -> Interval {
		self.attachment
	}

	pub fn data_life(&self) -> Interval {
		self.data_life
	}

	pub fn attachment_start(&self) -> Timestamp {
		self.attachment.start()
	}

	pub fn attachment_end(&self) -> Option<Timestamp> {
		self.attachment.end()
	}

	pub fn data_life_start(&self) -> Timestamp {
		self.data_life.start()
	}

	pub fn data_life_end(&self) -> Option<Timestamp> {
		self.data_life.end()
	}

	pub fn is_open(&self) -> bool {
		self.attachment.is_open()
	}

	pub fn is_data_life_start_modified(&self) -> bool {
		self.data_life.start() != self.attachment.start()
	}

	pub fn is_data_life_end_modified(&self) -> bool {
		self.attachment.end().is_some() && self.data_life.end() != self.attachment.end()
	}

	pub fn start_customized(&self) -> bool {
		self.start_customized
	}

	pub fn end_customized(&self) -> bool {
		self.end_customized
	}

	/// Modified now, or customized at some point in the past
	pub fn is_start_locked(&self) -> bool {
		self.is_data_life_start_modified() || self.start_customized
	}

	pub fn is_end_locked(&self) -> bool {
		self.is_data_life_end_modified() || self.end_customized
	}

	/// Whether a reading taken at `at` counts as evidence, both ends inclusive
	pub fn covers(&self, at: Timestamp) -> bool {
		self.data_life.start() <= at && self.data_life.end().map_or(true, |end| at <= end)
	}

	pub fn fields(&self) -> WindowFields {
		WindowFields {
			attachment_start: self.attachment.start(),
			attachment_end: self.attachment.end(),
			data_life_start: self.data_life.start(),
			data_life_end: self.data_life.end(),
			start_customized: self.start_customized,
			end_customized: self.end_customized,
		}
	}
}

impl TryFrom<WindowFields> for DataLifeWindow {
	type Error = WindowError;

	fn try_from(fields: WindowFields) -> Result<Self, Self::Error> {
		Self::restore(fields)
	}
}

impl From<DataLifeWindow> for WindowFields {
	fn from(window: DataLifeWindow) -> Self {
		window.fields()
	}
}
