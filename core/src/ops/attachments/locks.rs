//! Per-key async locks
//!
//! The check-then-write of every lifecycle operation runs while holding the
//! locks for the device, animal, or assignment it touches. Keys are always
//! taken in sorted order, so two operations sharing keys cannot deadlock.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LockKey {
	Assignment(Uuid),
	Device(Uuid),
	Animal(Uuid),
}

/// Held locks, released on drop
pub struct KeyGuards {
	_guards: Vec<OwnedMutexGuard<()>>,
}

#[derive(Default)]
pub struct KeyedLocks {
	slots: Mutex<HashMap<LockKey, Arc<AsyncMutex<()>>>>,
}

impl KeyedLocks {
	pub fn new() -> Self {
		Self::default()
	}

	pub async fn acquire(&self, keys: impl IntoIterator<Item = LockKey>) -> KeyGuards {
		let mut keys = keys.into_iter().collect::<Vec<_>>();
		keys.sort();
		keys.dedup();

		let mut guards = Vec::with_capacity(keys.len());
		for key in keys {
			let slot = self.slot(key);
			guards.push(slot.lock_owned().await);
		}

		KeyGuards { _guards: guards }
	}

	fn slot(&self, key: LockKey) -> Arc<AsyncMutex<()>> {
		let mut slots = self.slots.lock();
		// Nobody holds or waits on a slot only the map references
		slots.retain(|_, slot| Arc::strong_count(slot) > 1);
		slots.entry(key).or_default().clone()
	}

	#[cfg(test)]
	fn len(&self) -> usize {
		self.slots.lock().len()
	}
}
