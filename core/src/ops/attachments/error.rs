//! Errors raised by attachment lifecycle operations

use crate::domain::{ActorRole, DataLifeBound, TimestampParseError, WindowError};
use thiserror::Error;
use uuid::Uuid;

/// How a caller should react to a failed operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
	/// Fix the input and resubmit
	MalformedInput,
	/// The requested state would break window nesting
	InvariantViolation,
	/// History changed underneath the caller; re-fetch and retry once
	Conflict,
	/// Never retried
	Authorization,
	NotFound,
	Storage,
}

#[derive(Error, Debug)]
pub enum AttachmentError {
	#[error(transparent)]
	Window(#[from] WindowError),

	#[error("Malformed timestamp: {0}")]
	MalformedTimestamp(#[from] TimestampParseError),

	#[error("Device {device_id} is already attached")]
	DeviceAlreadyAttached { device_id: Uuid },

	#[error("Animal {animal_id} already has a device attached")]
	AnimalAlreadyAttached { animal_id: Uuid },

	#[error("Device {device_id} attachment would overlap assignment {conflicting}")]
	OverlappingAttachment { device_id: Uuid, conflicting: Uuid },

	#[error("Assignment {0} is not open")]
	AttachmentNotOpen(Uuid),

	#[error("Assignment {0} not found")]
	AttachmentNotFound(Uuid),

	#[error("Assignment {0} was modified concurrently")]
	StaleRecord(Uuid),

	#[error("You do not have permission to modify {bound} (role: {role})")]
	PermissionDenied {
		bound: DataLifeBound,
		role: ActorRole,
	},

	#[error("Database error: {0}")]
	Database(#[from] sea_orm::DbErr),
}

impl AttachmentError {
	pub fn category(&self) -> ErrorCategory {
		match self {
			Self::Window(WindowError::InvalidInterval { .. }) | Self::MalformedTimestamp(_) => {
				ErrorCategory::MalformedInput
			}
			Self::Window(_) => ErrorCategory::InvariantViolation,
			Self::DeviceAlreadyAttached { .. }
			| Self::AnimalAlreadyAttached { .. }
			| Self::OverlappingAttachment { .. }
			| Self::AttachmentNotOpen(_)
			| Self::StaleRecord(_) => ErrorCategory::Conflict,
			Self::PermissionDenied { .. } => ErrorCategory::Authorization,
			Self::AttachmentNotFound(_) => ErrorCategory::NotFound,
			Self::Database(_) => ErrorCategory::Storage,
		}
	}

	pub fn is_retryable(&self) -> bool {
		self.category() == ErrorCategory::Conflict
	}
}

pub type AttachmentResult<T> = Result<T, AttachmentError>;
