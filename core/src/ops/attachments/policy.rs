//! Who may move which data-life bound
//!
//! A bound that still equals its attachment bound has never been customized
//! and anyone may set it. Once it has been moved, only an admin may move it
//! again, so field staff cannot keep redefining the evidentiary record.

use super::error::{AttachmentError, AttachmentResult};
use crate::domain::{ActorRole, DataLifeBound, DataLifeWindow, WindowError};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MutationRights {
	pub can_change_start: bool,
	pub can_change_end: bool,
}

impl MutationRights {
	pub fn permits(&self, bound: DataLifeBound) -> bool {
		match bound {
			DataLifeBound::DataLifeStart => self.can_change_start,
			DataLifeBound::DataLifeEnd => self.can_change_end,
		}
	}
}

pub struct MutationPolicy;

impl MutationPolicy {
	pub fn evaluate(window: &DataLifeWindow, role: ActorRole) -> MutationRights {
		MutationRights {
			can_change_start: role.is_admin() || !window.is_start_locked(),
			can_change_end: role.is_admin() || !window.is_end_locked(),
		}
	}

	/// Fails unless `role` may move `bound` on `window`
	pub fn authorize(
		window: &DataLifeWindow,
		role: ActorRole,
		bound: DataLifeBound,
	) -> AttachmentResult<()> {
		if bound == DataLifeBound::DataLifeEnd && window.is_open() {
			return Err(WindowError::OpenAttachment.into());
		}

		if Self::evaluate(window, role).permits(bound) {
			Ok(())
		} else {
			Err(AttachmentError::PermissionDenied { bound, role })
		}
	}
}
