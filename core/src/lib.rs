//! Collar attachment tracking core
//!
//! Records which tracking device was fitted to which animal and when, together with
//! the window of data that is trusted for analysis.

pub mod common;
pub mod config;
pub mod domain;
pub mod infra;
pub mod ops;

use crate::common::Result;
use crate::config::AppConfig;
use crate::infra::db::Database;
use crate::infra::store::{DatabaseHistoryStore, HistoryStore, MemoryHistoryStore};
use crate::ops::attachments::AttachmentManager;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Wires configuration, storage and the attachment manager together
pub struct Core {
	/// Application configuration
	pub config: AppConfig,

	/// Backing database, absent for in-memory cores
	pub db: Option<Arc<Database>>,

	/// Attachment lifecycle operations
	pub attachments: Arc<AttachmentManager>,
}

impl Core {
	/// Initialize a Core from the platform default data directory
	pub async fn new() -> Result<Self> {
		let data_dir = crate::config::default_data_dir()?;
		Self::new_with_config(data_dir).await
	}

	/// Initialize a Core with a custom data directory
	pub async fn new_with_config(data_dir: PathBuf) -> Result<Self> {
		let config = AppConfig::load_from(&data_dir)?;
		Self::from_config(config).await
	}

	/// Initialize a Core from an already loaded configuration
	pub async fn from_config(config: AppConfig) -> Result<Self> {
		info!("Initializing telemetry core at {:?}", config.data_dir);
		config.ensure_directories()?;

		let db_path = config.database_path();
		let db = if db_path.exists() {
			Database::open(&db_path, &config.database).await?
		} else {
			Database::create(&db_path, &config.database).await?
		};
		db.migrate().await?;
		let db = Arc::new(db);

		let store: Arc<dyn HistoryStore> = Arc::new(DatabaseHistoryStore::new(db.clone()));

		info!("Telemetry core ready");
		Ok(Self {
			config,
			db: Some(db),
			attachments: Arc::new(AttachmentManager::new(store)),
		})
	}

	/// A Core that keeps history in process memory only
	pub fn in_memory(config: AppConfig) -> Self {
		let store: Arc<dyn HistoryStore> = Arc::new(MemoryHistoryStore::new());
		Self {
			config,
			db: None,
			attachments: Arc::new(AttachmentManager::new(store)),
		}
	}
}
