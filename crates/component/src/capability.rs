//! Capability keys for registry lookups.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ANONYMOUS: AtomicU64 = AtomicU64::new(1);

/// Identifies a queryable contract in a component bundle.
///
/// Named capabilities are the durable vocabulary: their name orders the
/// same way in every process, so maps keyed by them can be promoted to
/// ordered tree storage. Anonymous capabilities are minted at runtime for
/// identity-only lookups; they have no stable cross-process order and
/// block promotion of any map they key.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
	/// Durable, name-identified capability.
	Named(Arc<str>),
	/// Process-local capability; ordering is identity-based only.
	Anonymous(u64),
}

impl Capability {
	/// A durable capability identified by `name`.
	pub fn named(name: impl Into<Arc<str>>) -> Self {
		Capability::Named(name.into())
	}

	/// Mints a fresh process-local capability.
	pub fn anonymous() -> Self {
		Capability::Anonymous(NEXT_ANONYMOUS.fetch_add(1, Ordering::Relaxed))
	}

	/// Whether this key orders the same way in every process that may
	/// load a map keyed by it.
	pub fn has_stable_order(&self) -> bool {
		matches!(self, Capability::Named(_))
	}

	/// The durable name, if this is a named capability.
	pub fn name(&self) -> Option<&str> {
		match self {
			Capability::Named(name) => Some(name),
			Capability::Anonymous(_) => None,
		}
	}
}

impl fmt::Debug for Capability {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Capability::Named(name) => write!(f, "Capability({name})"),
			Capability::Anonymous(id) => write!(f, "Capability(#anon{id})"),
		}
	}
}
