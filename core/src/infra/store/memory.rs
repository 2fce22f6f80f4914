use super::{timeline_order, HistoryFilter, HistoryStore};
use crate::domain::Attachment;
use crate::ops::attachments::error::{AttachmentError, AttachmentResult};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// History kept in process memory
#[derive(Default)]
pub struct MemoryHistoryStore {
	records: RwLock<HashMap<Uuid, Attachment>>,
}

impl MemoryHistoryStore {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
	async fn get(&self, assignment_id: Uuid) -> AttachmentResult<Option<Attachment>> {
		Ok(self.records.read().await.get(&assignment_id).cloned())
	}

	async fn timeline(&self, filter: &HistoryFilter) -> AttachmentResult<Vec<Attachment>> {
		let mut matching = self
			.records
			.read()
			.await
			.values()
			.filter(|a| filter.matches(a))
			.cloned()
			.collect::<Vec<_>>();

		matching.sort_by(timeline_order);
		Ok(matching)
	}

	async fn insert(&self, attachment: &Attachment) -> AttachmentResult<()> {
		let mut records = self.records.write().await;

		if attachment.is_open() {
			for existing in records.values().filter(|a| a.is_open()) {
				if existing.device_id == attachment.device_id {
					return Err(AttachmentError::DeviceAlreadyAttached {
						device_id: attachment.device_id,
					});
				}
				if existing.animal_id == attachment.animal_id {
					return Err(AttachmentError::AnimalAlreadyAttached {
						animal_id: attachment.animal_id,
					});
				}
			}
		}

		if records.contains_key(&attachment.assignment_id) {
			return Err(AttachmentError::StaleRecord(attachment.assignment_id));
		}

		records.insert(attachment.assignment_id, attachment.clone());
		Ok(())
	}

	async fn update(&self, attachment: &Attachment) -> AttachmentResult<()> {
		let mut records = self.records.write().await;

		let stored = records
			.get_mut(&attachment.assignment_id)
			.ok_or(AttachmentError::AttachmentNotFound(attachment.assignment_id))?;

		if stored.version != attachment.version - 1 {
			return Err(AttachmentError::StaleRecord(attachment.assignment_id));
		}

		*stored = attachment.clone();
		Ok(())
	}
}
