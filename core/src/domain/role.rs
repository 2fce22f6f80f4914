//! Roles a caller can act under when editing attachment history

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

#[derive(
	Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ActorRole {
	/// Trusted to correct history at any time
	Admin,
	/// Field staff and project members
	User,
}

impl ActorRole {
	pub fn is_admin(&self) -> bool {
		matches!(self, ActorRole::Admin)
	}
}
