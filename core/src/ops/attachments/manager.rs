//! Attachment lifecycle manager
//!
//! Orchestrates attach / detach / data-life edits against a [`HistoryStore`].
//! Every operation re-reads history while holding the locks for the keys it
//! touches, validates, and only then writes. Replaying the currently stored
//! values is a successful no-op, so callers may retry after a timeout.

use super::{
	error::{AttachmentError, AttachmentResult, ErrorCategory},
	history::{find_open, find_overlap, HistoryQuery},
	input::{AttachInput, DetachInput, EditDataLifeInput, HistoryInput},
	locks::{KeyedLocks, LockKey},
	policy::MutationPolicy,
};
use crate::domain::{ActorRole, Attachment, DataLifeBound, DataLifeWindow, Interval, Timestamp};
use crate::infra::store::{HistoryFilter, HistoryStore};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

fn log_rejection(operation: &'static str, err: &AttachmentError) {
	match err.category() {
		ErrorCategory::Conflict => warn!(operation, error = %err, "Rejected against current history"),
		ErrorCategory::Storage => warn!(operation, error = %err, "Storage failure"),
		_ => debug!(operation, error = %err, "Rejected"),
	}
}

pub struct AttachmentManager {
	store: Arc<dyn HistoryStore>,
	history: HistoryQuery,
	locks: KeyedLocks,
}

impl AttachmentManager {
	pub fn new(store: Arc<dyn HistoryStore>) -> Self {
		Self {
			history: HistoryQuery::new(store.clone()),
			store,
			locks: KeyedLocks::new(),
		}
	}

	pub fn history(&self) -> &HistoryQuery {
		&self.history
	}

	/// Mount `device_id` on `animal_id` from `attachment_start` on
	pub async fn attach_device(
		&self,
		device_id: Uuid,
		animal_id: Uuid,
		attachment_start: Timestamp,
		data_life_start: Option<Timestamp>,
	) -> AttachmentResult<Attachment> {
		self.try_attach(device_id, animal_id, attachment_start, data_life_start)
			.await
			.inspect_err(|e| log_rejection("attach", e))
	}

	async fn try_attach(
		&self,
		device_id: Uuid,
		animal_id: Uuid,
		attachment_start: Timestamp,
		data_life_start: Option<Timestamp>,
	) -> AttachmentResult<Attachment> {
		let _guards = self
			.locks
			.acquire([LockKey::Device(device_id), LockKey::Animal(animal_id)])
			.await;

		let device_timeline = self
			.history
			.timeline_for(&HistoryFilter::device(device_id))
			.await?;

		if let Some(open) = find_open(&device_timeline) {
			let replay = open.animal_id == animal_id
				&& open.attachment_start() == attachment_start
				&& data_life_start.map_or(true, |start| start == open.window.data_life_start());

			if replay {
				debug!(assignment_id = %open.assignment_id, "Attach matches the open record, nothing to do");
				return Ok(open.clone());
			}

			return Err(AttachmentError::DeviceAlreadyAttached { device_id });
		}

		if let Some(conflict) = find_overlap(&device_timeline, &Interval::open(attachment_start)) {
			return Err(AttachmentError::OverlappingAttachment {
				device_id,
				conflicting: conflict.assignment_id,
			});
		}

		if self.history.open_for_animal(animal_id).await?.is_some() {
			return Err(AttachmentError::AnimalAlreadyAttached { animal_id });
		}

		let window = DataLifeWindow::create(attachment_start, None, data_life_start, None)?;
		let attachment = Attachment::new(device_id, animal_id, window);
		self.store.insert(&attachment).await?;

		info!(
			assignment_id = %attachment.assignment_id,
			%device_id,
			%animal_id,
			attachment_start = %attachment_start,
			"Device attached"
		);

		Ok(attachment)
	}

	/// Close the open attachment `assignment_id` at `attachment_end`
	pub async fn detach_device(
		&self,
		assignment_id: Uuid,
		attachment_end: Timestamp,
		data_life_end: Option<Timestamp>,
	) -> AttachmentResult<Attachment> {
		self.try_detach(assignment_id, attachment_end, data_life_end)
			.await
			.inspect_err(|e| log_rejection("detach", e))
	}

	async fn try_detach(
		&self,
		assignment_id: Uuid,
		attachment_end: Timestamp,
		data_life_end: Option<Timestamp>,
	) -> AttachmentResult<Attachment> {
		// The device never changes, so reading it before locking is safe
		let device_id = self.load(assignment_id).await?.device_id;
		let _guards = self
			.locks
			.acquire([LockKey::Assignment(assignment_id), LockKey::Device(device_id)])
			.await;

		let current = self.load(assignment_id).await?;

		if !current.is_open() {
			let replay = current.attachment_end() == Some(attachment_end)
				&& data_life_end.map_or(true, |end| Some(end) == current.window.data_life_end());

			if replay {
				debug!(%assignment_id, "Detach matches the stored record, nothing to do");
				return Ok(current);
			}

			return Err(AttachmentError::AttachmentNotOpen(assignment_id));
		}

		let window = current.window.close(attachment_end, data_life_end)?;
		let detached = current.revise(window);
		self.store.update(&detached).await?;

		info!(
			%assignment_id,
			device_id = %detached.device_id,
			attachment_end = %attachment_end,
			"Device detached"
		);

		Ok(detached)
	}

	/// Move the data-life bounds of `assignment_id` on behalf of `role`
	pub async fn edit_data_life(
		&self,
		assignment_id: Uuid,
		role: ActorRole,
		data_life_start: Option<Timestamp>,
		data_life_end: Option<Timestamp>,
	) -> AttachmentResult<Attachment> {
		self.try_edit(assignment_id, role, data_life_start, data_life_end)
			.await
			.inspect_err(|e| log_rejection("edit_data_life", e))
	}

	async fn try_edit(
		&self,
		assignment_id: Uuid,
		role: ActorRole,
		data_life_start: Option<Timestamp>,
		data_life_end: Option<Timestamp>,
	) -> AttachmentResult<Attachment> {
		let _guards = self
			.locks
			.acquire([LockKey::Assignment(assignment_id)])
			.await;

		let current = self.load(assignment_id).await?;
		let window = &current.window;

		// Resubmitting a stored value is not an edit
		let start = data_life_start.filter(|start| *start != window.data_life_start());
		let end = data_life_end.filter(|end| Some(*end) != window.data_life_end());

		if start.is_none() && end.is_none() {
			debug!(%assignment_id, "Data-life edit changes nothing");
			return Ok(current);
		}

		if start.is_some() {
			MutationPolicy::authorize(window, role, DataLifeBound::DataLifeStart)?;
		}
		if end.is_some() {
			MutationPolicy::authorize(window, role, DataLifeBound::DataLifeEnd)?;
		}

		let edited = current.revise(window.with_data_life(start, end)?);
		self.store.update(&edited).await?;

		info!(
			%assignment_id,
			%role,
			data_life_start = %edited.window.data_life_start(),
			data_life_end = ?edited.window.data_life_end().map(|end| end.to_string()),
			"Data life edited"
		);

		Ok(edited)
	}

	/// Attachments matching `filter`, oldest first
	pub async fn get_history(&self, filter: &HistoryFilter) -> AttachmentResult<Vec<Attachment>> {
		self.history.timeline_for(filter).await
	}

	pub async fn attach(&self, input: AttachInput) -> AttachmentResult<Attachment> {
		let (start, data_life_start) = input.timestamps()?;
		self.attach_device(input.device_id, input.animal_id, start, data_life_start)
			.await
	}

	pub async fn detach(&self, input: DetachInput) -> AttachmentResult<Attachment> {
		let (end, data_life_end) = input.timestamps()?;
		self.detach_device(input.assignment_id, end, data_life_end)
			.await
	}

	pub async fn edit(&self, input: EditDataLifeInput) -> AttachmentResult<Attachment> {
		let (start, end) = input.timestamps()?;
		self.edit_data_life(input.assignment_id, input.actor_role, start, end)
			.await
	}

	pub async fn history_for(&self, input: HistoryInput) -> AttachmentResult<Vec<Attachment>> {
		self.get_history(&input.into()).await
	}

	async fn load(&self, assignment_id: Uuid) -> AttachmentResult<Attachment> {
		self.store
			.get(assignment_id)
			.await?
			.ok_or(AttachmentError::AttachmentNotFound(assignment_id))
	}
}
