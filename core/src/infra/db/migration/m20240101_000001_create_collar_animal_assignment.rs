//! Attachment history table
//!
//! Besides the table itself this creates the two partial unique indexes that
//! keep at most one open attachment per device and per animal, even when two
//! processes write to the same database.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
	async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		manager
			.create_table(
				Table::create()
					.table(CollarAnimalAssignment::Table)
					.if_not_exists()
					.col(
						ColumnDef::new(CollarAnimalAssignment::Id)
							.integer()
							.not_null()
							.auto_increment()
							.primary_key(),
					)
					.col(
						ColumnDef::new(CollarAnimalAssignment::Uuid)
							.uuid()
							.not_null()
							.unique_key(),
					)
					.col(ColumnDef::new(CollarAnimalAssignment::DeviceId).uuid().not_null())
					.col(ColumnDef::new(CollarAnimalAssignment::AnimalId).uuid().not_null())
					.col(
						ColumnDef::new(CollarAnimalAssignment::AttachmentStart)
							.timestamp_with_time_zone()
							.not_null(),
					)
					.col(ColumnDef::new(CollarAnimalAssignment::AttachmentEnd).timestamp_with_time_zone())
					.col(
						ColumnDef::new(CollarAnimalAssignment::DataLifeStart)
							.timestamp_with_time_zone()
							.not_null(),
					)
					.col(ColumnDef::new(CollarAnimalAssignment::DataLifeEnd).timestamp_with_time_zone())
					.col(
						ColumnDef::new(CollarAnimalAssignment::StartCustomized)
							.boolean()
							.not_null()
							.default(false),
					)
					.col(
						ColumnDef::new(CollarAnimalAssignment::EndCustomized)
							.boolean()
							.not_null()
							.default(false),
					)
					.col(
						ColumnDef::new(CollarAnimalAssignment::Version)
							.big_integer()
							.not_null()
							.default(1),
					)
					.col(
						ColumnDef::new(CollarAnimalAssignment::CreatedAt)
							.timestamp_with_time_zone()
							.not_null(),
					)
					.col(
						ColumnDef::new(CollarAnimalAssignment::UpdatedAt)
							.timestamp_with_time_zone()
							.not_null(),
					)
					.to_owned(),
			)
			.await?;

		manager
			.create_index(
				Index::create()
					.name("idx_assignment_device_start")
					.table(CollarAnimalAssignment::Table)
					.col(CollarAnimalAssignment::DeviceId)
					.col(CollarAnimalAssignment::AttachmentStart)
					.to_owned(),
			)
			.await?;

		manager
			.create_index(
				Index::create()
					.name("idx_assignment_animal_start")
					.table(CollarAnimalAssignment::Table)
					.col(CollarAnimalAssignment::AnimalId)
					.col(CollarAnimalAssignment::AttachmentStart)
					.to_owned(),
			)
			.await?;

		// Partial indexes are not expressible through the index builder
		let conn = manager.get_connection();
		conn.execute_unprepared(
			"CREATE UNIQUE INDEX IF NOT EXISTS idx_assignment_open_device \
			 ON collar_animal_assignment (device_id) WHERE attachment_end IS NULL",
		)
		.await?;
		conn.execute_unprepared(
			"CREATE UNIQUE INDEX IF NOT EXISTS idx_assignment_open_animal \
			 ON collar_animal_assignment (animal_id) WHERE attachment_end IS NULL",
		)
		.await?;

		Ok(())
	}

	async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		manager
			.drop_table(Table::drop().table(CollarAnimalAssignment::Table).to_owned())
			.await
	}
}

#[derive(DeriveIden)]
enum CollarAnimalAssignment {
	Table,
	Id,
	Uuid,
	DeviceId,
	AnimalId,
	AttachmentStart,
	AttachmentEnd,
	DataLifeStart,
	DataLifeEnd,
	StartCustomized,
	EndCustomized,
	Version,
	CreatedAt,
	UpdatedAt,
}
