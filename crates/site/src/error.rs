//! Error types for site resolution and traversal.

use thiserror::Error;

/// Errors from site resolution and mutation.
#[derive(Debug, Clone, Error)]
pub enum SiteError {
	/// The resolver's synthesis path was reached with a non-persisted
	/// fallback site or bundle. That is a programming error by the
	/// caller, not a recoverable runtime condition.
	#[error("synthesis fallback requires a persisted site and a persisted bundle")]
	UnpersistedFallback,
	/// Proxied sites never accept a replacement bundle.
	#[error("cannot replace the component bundle of a proxied site")]
	ProxyImmutable,
}

/// Traversal was rejected because the current and new site
/// configurations cannot be safely reconciled.
#[derive(Debug, Clone, Error)]
pub enum TraversalError {
	#[error("cannot reconcile site '{new}' with current site '{current}'")]
	UnresolvableSite { new: String, current: String },
}

impl TraversalError {
	/// True for failures the boundary should surface as "resource not
	/// found" rather than as a generic fault.
	pub fn is_not_found(&self) -> bool {
		matches!(self, TraversalError::UnresolvableSite { .. })
	}
}
