//! Declarative host-name redirection.
//!
//! A site mapping says "requests arriving for `source` should be treated
//! as `target`". Mappings are registered as named singletons keyed by the
//! lower-cased source name; registration is one-directional and lookup
//! is exact-match only.

use std::sync::Arc;

use manor_component::Components;
use serde::Deserialize;

use crate::caps;


/// An immutable source-to-target host-name pair, both lower-cased.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SiteMapping {
	pub source_site_name: Arc<str>,
	pub target_site_name: Arc<str>,
}

/// Declarative registration input for a [`SiteMapping`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct SiteMappingDirective {
	pub source_site_name: String,
	pub target_site_name: String,
}

/// Creates and registers a site mapping keyed by the lower-cased source
/// name.
///
/// Re-registration under the same (lower-cased) name replaces the prior
/// mapping.
pub fn register_site_mapping(
	policies: &Arc<Components>,
	directive: SiteMappingDirective,
) -> Arc<SiteMapping> {
	// Store and register in lowercase; lookups arrive lower-cased from
	// HTTP headers.
	let mapping = Arc::new(SiteMapping {
		source_site_name: directive.source_site_name.to_lowercase().into(),
		target_site_name: directive.target_site_name.to_lowercase().into(),
	});
	policies.register_utility(
		caps::SITE_MAPPING.clone(),
		mapping.source_site_name.clone(),
		mapping.clone(),
	);
	mapping
}

/// Exact-match mapping lookup by source site name.
pub fn query_site_mapping(
	policies: &Arc<Components>,
	name: &str,
) -> Option<Arc<SiteMapping>> {
	policies.utility_of::<SiteMapping>(&caps::SITE_MAPPING, &name.to_lowercase())
}
