//! Database infrastructure using SeaORM

use crate::config::DatabaseConfig;
use sea_orm::{ConnectOptions, Database as SeaDatabase, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod entities;
pub mod migration;

/// Database wrapper for the attachment history
pub struct Database {
	/// SeaORM database connection
	conn: DatabaseConnection,
}

impl Database {
	/// Create (or open) a database at the specified path
	pub async fn create(path: &Path, config: &DatabaseConfig) -> Result<Self, DbErr> {
		// Ensure parent directory exists
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent)
				.map_err(|e| DbErr::Custom(format!("Failed to create directory: {}", e)))?;
		}

		let db_url = format!("sqlite://{}?mode=rwc", path.display());
		let conn = SeaDatabase::connect(Self::options(db_url, config)).await?;

		info!("Created database at {:?}", path);

		Ok(Self { conn })
	}

	/// Open an existing database
	pub async fn open(path: &Path, config: &DatabaseConfig) -> Result<Self, DbErr> {
		if !path.exists() {
			return Err(DbErr::Custom(format!(
				"Database does not exist: {}",
				path.display()
			)));
		}

		let db_url = format!("sqlite://{}", path.display());
		let conn = SeaDatabase::connect(Self::options(db_url, config)).await?;

		info!("Opened database at {:?}", path);

		Ok(Self { conn })
	}

	/// Private in-memory database, already migrated
	pub async fn in_memory() -> Result<Self, DbErr> {
		// Every pooled connection would get its own empty database
		let mut opt = ConnectOptions::new("sqlite::memory:");
		opt.max_connections(1)
			.min_connections(1)
			.sqlx_logging(false);

		let db = Self {
			conn: SeaDatabase::connect(opt).await?,
		};
		db.migrate().await?;

		Ok(db)
	}

	fn options(db_url: String, config: &DatabaseConfig) -> ConnectOptions {
		let mut opt = ConnectOptions::new(db_url);
		opt.max_connections(config.max_connections)
			.min_connections(1)
			.connect_timeout(Duration::from_secs(config.connect_timeout_secs))
			.sqlx_logging(false); // We'll use tracing instead
		opt
	}

	/// Run migrations
	pub async fn migrate(&self) -> Result<(), DbErr> {
		migration::Migrator::up(&self.conn, None).await?;
		info!("Database migrations completed successfully");
		Ok(())
	}

	/// Get the database connection
	pub fn conn(&self) -> &DatabaseConnection {
		&self.conn
	}
}
