//! Read side of the attachment history

use super::error::AttachmentResult;
use crate::domain::{Attachment, Interval, Timestamp};
use crate::infra::store::{HistoryFilter, HistoryStore};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct HistoryQuery {
	store: Arc<dyn HistoryStore>,
}

impl HistoryQuery {
	pub fn new(store: Arc<dyn HistoryStore>) -> Self {
		Self { store }
	}

	/// Matching attachments, oldest first
	pub async fn timeline_for(&self, filter: &HistoryFilter) -> AttachmentResult<Vec<Attachment>> {
		self.store.timeline(filter).await
	}

	pub async fn open_for_device(&self, device_id: Uuid) -> AttachmentResult<Option<Attachment>> {
		let timeline = self.timeline_for(&HistoryFilter::device(device_id)).await?;
		Ok(find_open(&timeline).cloned())
	}

	pub async fn open_for_animal(&self, animal_id: Uuid) -> AttachmentResult<Option<Attachment>> {
		let timeline = self.timeline_for(&HistoryFilter::animal(animal_id)).await?;
		Ok(find_open(&timeline).cloned())
	}

	/// The attachment a reading taken by `device_id` at `at` counts towards.
	///
	/// `None` when the reading falls outside every data-life window.
	pub async fn attribute_reading(
		&self,
		device_id: Uuid,
		at: Timestamp,
	) -> AttachmentResult<Option<Attachment>> {
		let timeline = self.timeline_for(&HistoryFilter::device(device_id)).await?;

		// A reading on the detach instant of one record and the attach instant
		// of the next goes to the newer record
		Ok(timeline.into_iter().rev().find(|a| a.window.covers(at)))
	}
}

pub fn find_open(timeline: &[Attachment]) -> Option<&Attachment> {
	timeline.iter().find(|a| a.is_open())
}

/// First record in `timeline` whose attachment overlaps `candidate`
pub fn find_overlap<'a>(timeline: &'a [Attachment], candidate: &Interval) -> Option<&'a Attachment> {
	timeline
		.iter()
		.find(|a| a.window.attachment().overlaps(candidate))
}
