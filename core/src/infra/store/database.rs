use super::{timeline_order, HistoryFilter, HistoryStore};
use crate::domain::Attachment;
use crate::infra::db::{
	entities::collar_animal_assignment::{self, ActiveModel, Column, Entity},
	Database,
};
use crate::ops::attachments::error::{AttachmentError, AttachmentResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
	sea_query::Expr, ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
	SqlErr,
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// History persisted in the SQLite database
#[derive(Clone)]
pub struct DatabaseHistoryStore {
	db: Arc<Database>,
}

impl DatabaseHistoryStore {
	pub fn new(db: Arc<Database>) -> Self {
		Self { db }
	}

	/// Translate a hit on one of the open-attachment unique indexes
	fn map_write_error(err: DbErr, attachment: &Attachment) -> AttachmentError {
		match err.sql_err() {
			Some(SqlErr::UniqueConstraintViolation(message)) if message.contains("animal_id") => {
				AttachmentError::AnimalAlreadyAttached {
					animal_id: attachment.animal_id,
				}
			}
			Some(SqlErr::UniqueConstraintViolation(message)) if message.contains("device_id") => {
				AttachmentError::DeviceAlreadyAttached {
					device_id: attachment.device_id,
				}
			}
			_ => AttachmentError::Database(err),
		}
	}
}

#[async_trait]
impl HistoryStore for DatabaseHistoryStore {
	async fn get(&self, assignment_id: Uuid) -> AttachmentResult<Option<Attachment>> {
		let model = Entity::find()
			.filter(Column::Uuid.eq(assignment_id))
			.one(self.db.conn())
			.await?;

		Ok(model.map(|m| m.to_domain()).transpose()?)
	}

	async fn timeline(&self, filter: &HistoryFilter) -> AttachmentResult<Vec<Attachment>> {
		let mut query = Entity::find();

		if let Some(device_id) = filter.device_id {
			query = query.filter(Column::DeviceId.eq(device_id));
		}
		if let Some(animal_id) = filter.animal_id {
			query = query.filter(Column::AnimalId.eq(animal_id));
		}

		let models = query
			.order_by_asc(Column::AttachmentStart)
			.order_by_asc(Column::CreatedAt)
			.all(self.db.conn())
			.await?;

		let mut timeline = models
			.iter()
			.map(collar_animal_assignment::Model::to_domain)
			.collect::<Result<Vec<_>, _>>()?;

		// Text-encoded timestamps only sort correctly while offsets agree
		timeline.sort_by(timeline_order);

		Ok(timeline)
	}

	async fn insert(&self, attachment: &Attachment) -> AttachmentResult<()> {
		ActiveModel::from_domain(attachment)
			.insert(self.db.conn())
			.await
			.map_err(|e| Self::map_write_error(e, attachment))?;

		debug!(assignment_id = %attachment.assignment_id, "Inserted attachment row");
		Ok(())
	}

	async fn update(&self, attachment: &Attachment) -> AttachmentResult<()> {
		let fields = attachment.window.fields();

		let result = Entity::update_many()
			.col_expr(
				Column::AttachmentEnd,
				Expr::value(fields.attachment_end.map(DateTime::<Utc>::from)),
			)
			.col_expr(
				Column::DataLifeStart,
				Expr::value(DateTime::<Utc>::from(fields.data_life_start)),
			)
			.col_expr(
				Column::DataLifeEnd,
				Expr::value(fields.data_life_end.map(DateTime::<Utc>::from)),
			)
			.col_expr(Column::StartCustomized, Expr::value(fields.start_customized))
			.col_expr(Column::EndCustomized, Expr::value(fields.end_customized))
			.col_expr(Column::Version, Expr::value(attachment.version))
			.col_expr(Column::UpdatedAt, Expr::value(attachment.updated_at))
			.filter(Column::Uuid.eq(attachment.assignment_id))
			.filter(Column::Version.eq(attachment.version - 1))
			.exec(self.db.conn())
			.await
			.map_err(|e| Self::map_write_error(e, attachment))?;

		if result.rows_affected == 0 {
			return match self.get(attachment.assignment_id).await? {
				Some(_) => Err(AttachmentError::StaleRecord(attachment.assignment_id)),
				None => Err(AttachmentError::AttachmentNotFound(attachment.assignment_id)),
			};
		}

		debug!(
			assignment_id = %attachment.assignment_id,
			version = attachment.version,
			"Updated attachment row"
		);
		Ok(())
	}
}
