//! Versioned config upgrades

use anyhow::Result;

/// Implemented by persisted configs whose schema can change between releases.
pub trait Migrate {
	fn current_version(&self) -> u32;

	fn target_version() -> u32;

	/// Upgrade in place, one version step at a time, until `target_version` is reached.
	fn migrate(&mut self) -> Result<()>;

	fn needs_migration(&self) -> bool {
		self.current_version() < Self::target_version()
	}
}
