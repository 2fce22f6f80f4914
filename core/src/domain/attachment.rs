//! Attachment records
//!
//! An [`Attachment`] is one continuous period during which a device was
//! mounted on an animal. Records are append-only history: they are closed by
//! a detach or corrected by a data-life edit, never deleted.

use super::{data_life::DataLifeWindow, timestamp::Timestamp};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
	/// Assignment identifier, stable for the life of the record
	pub assignment_id: Uuid,

	/// Device (collar) mounted for this period
	pub device_id: Uuid,

	/// Animal wearing the device
	pub animal_id: Uuid,

	/// Attachment and data-life bounds
	#[serde(flatten)]
	pub window: DataLifeWindow,

	/// Optimistic concurrency counter
	pub version: i64,

	/// Timestamps
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl Attachment {
	/// Create a new open record
	pub fn new(device_id: Uuid, animal_id: Uuid, window: DataLifeWindow) -> Self {
		let now = Utc::now();
		Self {
			assignment_id: Uuid::new_v4(),
			device_id,
			animal_id,
			window,
			version: 1,
			created_at: now,
			updated_at: now,
		}
	}

	pub fn is_open(&self) -> bool {
		self.window.is_open()
	}

	pub fn attachment_start(&self) -> Timestamp {
		self.window.attachment_start()
	}

	pub fn attachment_end(&self) -> Option<Timestamp> {
		self.window.attachment_end()
	}

	/// Next revision of this record carrying `window`
	pub fn revise(&self, window: DataLifeWindow) -> Self {
		Self {
			window,
			version: self.version + 1,
			updated_at: Utc::now(),
			..self.clone()
		}
	}
}
