//! Host-policy lookup and site resolution.
//!
//! Host policies are component bundles registered as named utilities on
//! a policy bundle (normally the global one), under the lower-cased host
//! name they apply to. Resolution turns an ordered list of candidate
//! host names into a site: a persisted one filed under the fallback's
//! host-sites container when available, otherwise a transient composite
//! mixing the host registrations with the fallback's.

use std::sync::Arc;

use manor_component::Components;

use crate::caps;
use crate::error::SiteError;
use crate::node::{HOST_SITES_NAME, Site, SiteHandle, SiteKind};


/// Registers `bundle` as the host policy for `host_name`.
///
/// Host names are case-insensitive: lower-cased here and at lookup time.
pub fn register_host_policy(
	policies: &Arc<Components>,
	host_name: &str,
	bundle: Arc<Components>,
) {
	policies.register_utility(
		caps::SITE_POLICY.clone(),
		host_name.to_lowercase(),
		bundle,
	);
}

/// Returns the policy bundle named for the first matching host name.
///
/// An empty name always denotes the global/default configuration and
/// terminates the scan; names after it are never considered.
pub fn find_site_components(
	policies: &Arc<Components>,
	site_names: &[&str],
) -> Option<Arc<Components>> {
	for name in site_names {
		if name.is_empty() {
			return None;
		}
		let name = name.to_lowercase();
		if let Some(bundle) = policies.utility_of::<Components>(&caps::SITE_POLICY, &name) {
			return Some(bundle);
		}
	}
	None
}

/// Resolves the site for an ordered list of candidate host names.
///
/// With no registered policy for any candidate, `fallback` is returned
/// unchanged. A match prefers the persisted site filed under the
/// fallback's host-sites container; failing that, a transient composite
/// site is synthesized whose bundle puts the host-specific registrations
/// before the fallback's.
///
/// # Errors
///
/// [`SiteError::UnpersistedFallback`] when the synthesis path is reached
/// with a non-persisted fallback site or bundle. Callers are responsible
/// for only invoking this path with persisted fallbacks; the failure is
/// an assertion-class programming error, not a recoverable condition.
pub fn get_site_for_site_names(
	policies: &Arc<Components>,
	site_names: &[&str],
	fallback: &SiteHandle,
) -> Result<SiteHandle, SiteError> {
	let matched = if site_names.is_empty() {
		None
	} else {
		find_site_components(policies, site_names)
	};
	let Some(matched) = matched else {
		return Ok(fallback.clone());
	};

	// A persisted site filed under the fallback's host-sites container
	// always wins over synthesis.
	if let Some(host_sites) = fallback.child(HOST_SITES_NAME)
		&& let Some(persisted) = host_sites.child(matched.name())
	{
		return Ok(persisted);
	}

	// Degraded path: nothing persisted for this policy. The host bundle
	// is only a partial configuration, so it is mixed with the persisted
	// main bundle; order matters, host-specific registrations first.
	if !fallback.is_persisted() || !fallback.components().is_persisted() {
		return Err(SiteError::UnpersistedFallback);
	}
	let name: Arc<str> = matched.name().into();
	let composite = Components::host_composite(name.clone(), matched, fallback.components());
	let site = Site::transient(name, SiteKind::Plain, composite);
	site.set_parent(fallback);
	let site: SiteHandle = site;
	Ok(site)
}

/// Policy bundles for a persisted host site, most specific first.
///
/// Walks the bundle parent chain while each bundle's name is still filed
/// in the site's containing host-sites folder.
pub fn component_hierarchy(
	policies: &Arc<Components>,
	site: &SiteHandle,
) -> Vec<Arc<Components>> {
	let mut chain = Vec::new();
	let Some(host_sites) = site.parent() else {
		return chain;
	};
	let mut bundle = find_site_components(policies, &[site.name()]);
	while let Some(current) = bundle {
		if host_sites.child(current.name()).is_none() {
			break;
		}
		chain.push(current.clone());
		bundle = current.parent();
	}
	chain
}

/// Names of the bundles in [`component_hierarchy`] order, optionally
/// reversed (least specific first).
pub fn component_hierarchy_names(
	policies: &Arc<Components>,
	site: &SiteHandle,
	reverse: bool,
) -> Vec<String> {
	let mut names: Vec<String> = component_hierarchy(policies, site)
		.iter()
		.map(|bundle| bundle.name().to_string())
		.collect();
	if reverse {
		names.reverse();
	}
	names
}
