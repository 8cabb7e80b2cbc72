//! Changed-for-persistence marking.
//!
//! The enclosing persistence system owns checkpointing and conflict
//! resolution; this crate only records that something needs saving. A
//! [`ChangeMark`] is shared (cloned) between a container and its nested
//! stores, so a nested structure marking itself changed marks the
//! container too.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared changed-for-persistence flag.
#[derive(Clone, Debug, Default)]
pub struct ChangeMark(Arc<AtomicBool>);

impl ChangeMark {
	pub fn new() -> Self {
		Self::default()
	}

	/// Marks the owner changed-for-persistence.
	pub fn set(&self) {
		self.0.store(true, Ordering::Release);
	}

	pub fn is_set(&self) -> bool {
		self.0.load(Ordering::Acquire)
	}

	/// Clears the mark, typically after a checkpoint.
	pub fn clear(&self) {
		self.0.store(false, Ordering::Release);
	}
}
