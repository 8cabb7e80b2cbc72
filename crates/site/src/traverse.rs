//! Traversal-time site switching.
//!
//! Invoked once per container boundary crossed, with the newly entered
//! site. Keeps the per-thread current site pointed at the right node
//! while preserving any previously installed host (site-name)
//! configuration at lower priority than the new site's own chain.
//!
//! Sites encountered during traversal are expected to have the main
//! application site in their base chain, so its configuration and
//! persistent utilities stay reachable. When the root or main
//! application folders are encountered, nothing happens here; something
//! upstream establishes the base context at those boundaries, and
//! something else takes care of clearing the site afterwards.

use manor_component::Components;

use crate::current::{current_site, set_current_site};
use crate::error::TraversalError;
use crate::node::{ProxiedSite, SiteHandle, SiteKind};

#[cfg(test)]
mod tests;

/// Points the current-site state at `new_site`, preserving previously
/// installed host overrides.
///
/// # Errors
///
/// [`TraversalError::UnresolvableSite`] when the current site carries no
/// recognized override and is neither identical nor host-kind-compatible
/// with `new_site`; the boundary maps this to "resource not found".
pub fn before_traverse(new_site: &SiteHandle) -> Result<(), TraversalError> {
	if matches!(
		new_site.kind(),
		SiteKind::Root | SiteKind::MainApplication
	) {
		return Ok(());
	}

	let Some(current) = current_site() else {
		// First site of the walk.
		set_current_site(Some(new_site.clone()));
		return Ok(());
	};

	if current.site_id() == new_site.site_id() {
		// Already positioned here. Typically traversal directly into a
		// utility registered under the current site.
		return Ok(());
	}

	if current.kind() == SiteKind::HostPolicy && new_site.kind() == SiteKind::HostPolicy {
		// Traversal into another host's subtree with some host already
		// current. Allow it without switching host configurations.
		return Ok(());
	}

	if let Some(host) = current.components().host_components() {
		// The current site was synthesized by the resolver or by a
		// previous application of this rule. Keep the host components in
		// the bases of the new site. Tacked on at the end: the
		// resolution order keeps an earlier occurrence where it was, so
		// a chain that already contains them is unaffected.
		let mut bases = new_site.components().bases();
		bases.push(host.clone());
		let composite = Components::based(new_site.name(), bases);
		composite.set_host_components(host);
		let proxy: SiteHandle = ProxiedSite::new(new_site.clone(), composite);
		tracing::debug!(
			domain = "site",
			site = new_site.name(),
			"carried host override into traversed site",
		);
		set_current_site(Some(proxy));
		return Ok(());
	}

	Err(TraversalError::UnresolvableSite {
		new: new_site.name().to_string(),
		current: current.name().to_string(),
	})
}
