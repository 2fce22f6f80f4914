//! Application configuration management

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub mod app_config;
pub mod migration;

pub use app_config::AppConfig;
pub use migration::Migrate;

/// Platform-specific data directory resolution
pub fn default_data_dir() -> Result<PathBuf> {
	#[cfg(target_os = "windows")]
	let dir = dirs::data_dir()
		.ok_or_else(|| anyhow!("Could not determine data directory"))?
		.join("Telemetry");

	#[cfg(target_os = "linux")]
	let dir = dirs::data_local_dir()
		.ok_or_else(|| anyhow!("Could not determine data directory"))?
		.join("telemetry");

	#[cfg(not(any(target_os = "windows", target_os = "linux")))]
	let dir = dirs::data_dir()
		.ok_or_else(|| anyhow!("Could not determine data directory"))?
		.join("telemetry");

	fs::create_dir_all(&dir)?;

	Ok(dir)
}

/// SQLite connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
	/// Database file name (relative to data_dir)
	pub file_name: String,

	pub max_connections: u32,

	pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
	fn default() -> Self {
		Self {
			file_name: "telemetry.db".to_string(),
			max_connections: 5,
			connect_timeout_secs: 8,
		}
	}
}

/// File logging settings, console logging is always on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
	/// Whether a daily rolling log file is written
	pub file_logging: bool,

	/// Directory for log files (relative to data_dir)
	pub log_directory: String,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			file_logging: true,
			log_directory: "logs".to_string(),
		}
	}
}
