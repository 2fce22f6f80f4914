//! Tracing setup

use crate::config::AppConfig;
use anyhow::{anyhow, Result};
use std::sync::Once;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use tw_utils::FileIOError;

/// Install the global subscriber: stderr always, plus a daily log file when enabled.
///
/// `RUST_LOG` wins over the configured level. Later calls are no-ops.
pub fn initialize_tracing(config: &AppConfig) -> Result<()> {
	static INIT: Once = Once::new();
	let mut result = Ok(());

	INIT.call_once(|| {
		let default_filter = format!(
			"tw_core={level},telemetry={level},warn",
			level = config.log_level
		);
		let env_filter =
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

		// stdout carries command output, so the console layer goes to stderr
		let console = fmt::layer()
			.with_target(true)
			.with_writer(std::io::stderr);

		let file = if config.logging.file_logging {
			let logs_dir = config.logs_dir();
			if let Err(e) = std::fs::create_dir_all(&logs_dir) {
				result = Err(FileIOError::new(&logs_dir, e).into());
				return;
			}

			Some(
				fmt::layer()
					.with_target(true)
					.with_ansi(false) // No ANSI colors in log files
					.with_writer(RollingFileAppender::new(
						Rotation::DAILY,
						logs_dir,
						"telemetry.log",
					))
					.boxed(),
			)
		} else {
			None
		};

		if let Err(e) = tracing_subscriber::registry()
			.with(env_filter)
			.with(console)
			.with(file)
			.try_init()
		{
			result = Err(anyhow!("Failed to initialize tracing: {}", e));
		}
	});

	result
}
