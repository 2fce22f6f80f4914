//! Collar-animal assignment entity
//!
//! SeaORM entity backing the attachment history. One row per attachment;
//! rows are updated in place on detach or data-life correction, guarded by
//! `version`.

use crate::domain::{Attachment, DataLifeWindow, Timestamp, WindowError, WindowFields};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, Set};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "collar_animal_assignment")]
pub struct Model {
	#[sea_orm(primary_key)]
	pub id: i32,

	#[sea_orm(unique)]
	pub uuid: Uuid,

	#[sea_orm(indexed)]
	pub device_id: Uuid,

	#[sea_orm(indexed)]
	pub animal_id: Uuid,

	pub attachment_start: DateTimeUtc,
	pub attachment_end: Option<DateTimeUtc>,
	pub data_life_start: DateTimeUtc,
	pub data_life_end: Option<DateTimeUtc>,

	pub start_customized: bool,
	pub end_customized: bool,

	pub version: i64,
	pub created_at: DateTimeUtc,
	pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
	/// Rebuild the domain record, re-checking window nesting
	pub fn to_domain(&self) -> Result<Attachment, WindowError> {
		let window = DataLifeWindow::restore(WindowFields {
			attachment_start: Timestamp::from(self.attachment_start),
			attachment_end: self.attachment_end.map(Timestamp::from),
			data_life_start: Timestamp::from(self.data_life_start),
			data_life_end: self.data_life_end.map(Timestamp::from),
			start_customized: self.start_customized,
			end_customized: self.end_customized,
		})?;

		Ok(Attachment {
			assignment_id: self.uuid,
			device_id: self.device_id,
			animal_id: self.animal_id,
			window,
			version: self.version,
			created_at: self.created_at,
			updated_at: self.updated_at,
		})
	}
}

impl ActiveModel {
	/// Insertable row for a new record
	pub fn from_domain(attachment: &Attachment) -> Self {
		let fields = attachment.window.fields();

		Self {
			id: NotSet,
			uuid: Set(attachment.assignment_id),
			device_id: Set(attachment.device_id),
			animal_id: Set(attachment.animal_id),
			attachment_start: Set(fields.attachment_start.into()),
			attachment_end: Set(fields.attachment_end.map(Into::into)),
			data_life_start: Set(fields.data_life_start.into()),
			data_life_end: Set(fields.data_life_end.map(Into::into)),
			start_customized: Set(fields.start_customized),
			end_customized: Set(fields.end_customized),
			version: Set(attachment.version),
			created_at: Set(attachment.created_at),
			updated_at: Set(attachment.updated_at),
		}
	}
}
