//! Transport-agnostic inputs
//!
//! Timestamps arrive as ISO-8601 strings and are parsed here, at the edge;
//! everything past this module works with [`Timestamp`].

use crate::domain::{ActorRole, Timestamp, TimestampParseError};
use crate::infra::store::HistoryFilter;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn parse_optional(raw: Option<&str>) -> Result<Option<Timestamp>, TimestampParseError> {
	raw.map(Timestamp::parse).transpose()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachInput {
	pub device_id: Uuid,
	pub animal_id: Uuid,
	pub attachment_start: String,
	#[serde(default)]
	pub data_life_start: Option<String>,
}

impl AttachInput {
	pub fn timestamps(&self) -> Result<(Timestamp, Option<Timestamp>), TimestampParseError> {
		Ok((
			Timestamp::parse(&self.attachment_start)?,
			parse_optional(self.data_life_start.as_deref())?,
		))
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetachInput {
	pub assignment_id: Uuid,
	pub attachment_end: String,
	#[serde(default)]
	pub data_life_end: Option<String>,
}

impl DetachInput {
	pub fn timestamps(&self) -> Result<(Timestamp, Option<Timestamp>), TimestampParseError> {
		Ok((
			Timestamp::parse(&self.attachment_end)?,
			parse_optional(self.data_life_end.as_deref())?,
		))
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditDataLifeInput {
	pub assignment_id: Uuid,
	pub actor_role: ActorRole,
	#[serde(default)]
	pub data_life_start: Option<String>,
	#[serde(default)]
	pub data_life_end: Option<String>,
}

impl EditDataLifeInput {
	pub fn timestamps(
		&self,
	) -> Result<(Option<Timestamp>, Option<Timestamp>), TimestampParseError> {
		Ok((
			parse_optional(self.data_life_start.as_deref())?,
			parse_optional(self.data_life_end.as_deref())?,
		))
	}
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct HistoryInput {
	#[serde(default)]
	pub device_id: Option<Uuid>,
	#[serde(default)]
	pub animal_id: Option<Uuid>,
}

impl From<HistoryInput> for HistoryFilter {
	fn from(input: HistoryInput) -> Self {
		Self {
			device_id: input.device_id,
			animal_id: input.animal_id,
		}
	}
}
