//! Application configuration

use super::{default_data_dir, DatabaseConfig, LoggingConfig};
use crate::config::migration::Migrate;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tw_utils::FileIOError;

const CONFIG_FILE: &str = "telemetry.json";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
	/// Config schema version
	pub version: u32,

	/// Data directory path
	pub data_dir: PathBuf,

	/// Logging level
	pub log_level: String,

	#[serde(default)]
	pub database: DatabaseConfig,

	#[serde(default)]
	pub logging: LoggingConfig,
}

impl AppConfig {
	/// Load configuration from the default location
	pub fn load() -> Result<Self> {
		let data_dir = default_data_dir()?;
		Self::load_from(&data_dir)
	}

	/// Load configuration from a specific data directory, writing defaults on first run
	pub fn load_from(data_dir: &Path) -> Result<Self> {
		let config_path = data_dir.join(CONFIG_FILE);

		if config_path.exists() {
			info!("Loading config from {:?}", config_path);
			let json = fs::read_to_string(&config_path)
				.map_err(|e| FileIOError::with_context(&config_path, e, "reading config"))?;
			let mut config: AppConfig = serde_json::from_str(&json)?;

			if config.needs_migration() {
				info!(
					"Migrating config from v{} to v{}",
					config.version,
					Self::target_version()
				);
				config.migrate()?;
				config.save()?;
			}

			Ok(config)
		} else {
			warn!("No config found, creating default at {:?}", config_path);
			let config = Self::default_with_dir(data_dir.to_path_buf());
			config.save()?;
			Ok(config)
		}
	}

	/// Create default configuration with specific data directory
	pub fn default_with_dir(data_dir: PathBuf) -> Self {
		Self {
			version: Self::target_version(),
			data_dir,
			log_level: "info".to_string(),
			database: DatabaseConfig::default(),
			logging: LoggingConfig::default(),
		}
	}

	/// Save configuration to disk
	pub fn save(&self) -> Result<()> {
		fs::create_dir_all(&self.data_dir)
			.map_err(|e| FileIOError::with_context(&self.data_dir, e, "creating data directory"))?;

		let config_path = self.data_dir.join(CONFIG_FILE);
		let json = serde_json::to_string_pretty(self)?;
		fs::write(&config_path, json)
			.map_err(|e| FileIOError::with_context(&config_path, e, "writing config"))?;
		info!("Saved config to {:?}", config_path);
		Ok(())
	}

	/// Get the path for logs directory
	pub fn logs_dir(&self) -> PathBuf {
		self.data_dir.join(&self.logging.log_directory)
	}

	/// Get the path of the SQLite file
	pub fn database_path(&self) -> PathBuf {
		self.data_dir.join(&self.database.file_name)
	}

	/// Ensure all required directories exist
	pub fn ensure_directories(&self) -> Result<()> {
		fs::create_dir_all(&self.data_dir)?;
		if self.logging.file_logging {
			fs::create_dir_all(self.logs_dir())?;
		}
		Ok(())
	}
}

impl Default for AppConfig {
	fn default() -> Self {
		let data_dir = default_data_dir().unwrap_or_else(|_| PathBuf::from("."));
		Self::default_with_dir(data_dir)
	}
}

impl Migrate for AppConfig {
	fn current_version(&self) -> u32 {
		self.version
	}

	fn target_version() -> u32 {
		2
	}

	fn migrate(&mut self) -> Result<()> {
		match self.version {
			0 => {
				self.version = 1;
				self.migrate()
			}
			1 => {
				// v2 split database and logging settings out of the top level
				self.database = DatabaseConfig::default();
				self.logging = LoggingConfig::default();
				self.version = 2;
				Ok(())
			}
			2 => Ok(()),
			v => Err(anyhow!("Unknown config version: {}", v)),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;
	use tempfile::TempDir;

	#[test]
	fn first_load_writes_defaults() {
		let temp = TempDir::new().unwrap();

		let config = AppConfig::load_from(temp.path()).unwrap();

		assert_eq!(config.version, AppConfig::target_version());
		assert_eq!(config.log_level, "info");
		assert!(temp.path().join(CONFIG_FILE).exists());
		assert_eq!(config.database_path(), temp.path().join("telemetry.db"));
		assert_eq!(config.logs_dir(), temp.path().join("logs"));
	}

	#[test]
	fn saved_changes_survive_reload() {
		let temp = TempDir::new().unwrap();

		let mut config = AppConfig::load_from(temp.path()).unwrap();
		config.log_level = "debug".to_string();
		config.database.max_connections = 2;
		config.save().unwrap();

		let reloaded = AppConfig::load_from(temp.path()).unwrap();
		assert_eq!(reloaded.log_level, "debug");
		assert_eq!(reloaded.database.max_connections, 2);
	}

	#[test]
	fn old_config_is_migrated_on_load() {
		let temp = TempDir::new().unwrap();
		let legacy = serde_json::json!({
			"version": 1,
			"data_dir": temp.path(),
			"log_level": "warn",
		});
		fs::write(temp.path().join(CONFIG_FILE), legacy.to_string()).unwrap();

		let config = AppConfig::load_from(temp.path()).unwrap();

		assert_eq!(config.version, 2);
		assert_eq!(config.log_level, "warn");
		assert!(config.logging.file_logging);

		let on_disk: AppConfig =
			serde_json::from_str(&fs::read_to_string(temp.path().join(CONFIG_FILE)).unwrap())
				.unwrap();
		assert_eq!(on_disk.version, 2);
	}

	#[test]
	fn unknown_version_is_rejected() {
		let mut config = AppConfig::default_with_dir(PathBuf::from("/tmp/unused"));
		config.version = 99;

		assert!(config.migrate().is_err());
	}
}
