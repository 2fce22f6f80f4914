//! Attachment history persistence
//!
//! The lifecycle manager only sees the [`HistoryStore`] trait. Two
//! implementations ship with the crate: [`MemoryHistoryStore`] for tests and
//! embedding, and [`DatabaseHistoryStore`] over SQLite.

use crate::domain::Attachment;
use crate::ops::attachments::error::AttachmentResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

mod database;
mod memory;

pub use database::DatabaseHistoryStore;
pub use memory::MemoryHistoryStore;

/// Which records a history query selects; both set means both must match
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryFilter {
	pub device_id: Option<Uuid>,
	pub animal_id: Option<Uuid>,
}

impl HistoryFilter {
	pub fn device(device_id: Uuid) -> Self {
		Self {
			device_id: Some(device_id),
			animal_id: None,
		}
	}

	pub fn animal(animal_id: Uuid) -> Self {
		Self {
			device_id: None,
			animal_id: Some(animal_id),
		}
	}

	pub fn matches(&self, attachment: &Attachment) -> bool {
		self.device_id.map_or(true, |id| id == attachment.device_id)
			&& self.animal_id.map_or(true, |id| id == attachment.animal_id)
	}
}

/// Oldest first: attachment start, then creation time, then id
pub fn timeline_order(a: &Attachment, b: &Attachment) -> Ordering {
	a.attachment_start()
		.cmp(&b.attachment_start())
		.then(a.created_at.cmp(&b.created_at))
		.then(a.assignment_id.cmp(&b.assignment_id))
}

#[async_trait]
pub trait HistoryStore: Send + Sync {
	async fn get(&self, assignment_id: Uuid) -> AttachmentResult<Option<Attachment>>;

	/// Matching records in [`timeline_order`]
	async fn timeline(&self, filter: &HistoryFilter) -> AttachmentResult<Vec<Attachment>>;

	/// Store a new record. Fails if its device or animal already has an open record.
	async fn insert(&self, attachment: &Attachment) -> AttachmentResult<()>;

	/// Replace the stored revision `attachment.version - 1` with `attachment`.
	///
	/// Fails with `StaleRecord` when the stored version moved on.
	async fn update(&self, attachment: &Attachment) -> AttachmentResult<()>;
}
