//! Error types for the component registry.

use thiserror::Error;

/// Fatal registry errors.
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
	/// Adding a base would create a cycle in the base graph.
	#[error("base cycle: '{name}' already reaches this bundle through its resolution order")]
	BaseCycle {
		/// Name of the bundle whose addition was rejected.
		name: String,
	},
}

/// A map could not be promoted to ordered-tree storage.
///
/// This never crosses the public API: promotion sites log it and leave
/// the map hash-backed, and processing continues.
#[derive(Debug, Clone, Error)]
#[error("key {key} has no stable order")]
pub struct PromotionError {
	/// Debug rendering of the offending key.
	pub key: String,
}
