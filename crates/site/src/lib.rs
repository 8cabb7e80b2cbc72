//! Virtual-host site configuration resolution.
//!
//! Sites are nodes in a containment tree that express configuration by
//! owning (or proxying) a component bundle. One persistent site, the main
//! application site, must always be reachable from the current site when
//! application code runs. Host policies are bundles registered under the
//! lower-cased host name they apply to; they are not necessarily part of
//! the containment tree.
//!
//! Two things happen per operation: [`resolve::get_site_for_site_names`]
//! establishes which named configuration bundle is in play, and
//! [`traverse::before_traverse`] keeps the per-thread current site
//! pointed at the right node as traversal descends the tree, merging
//! host-specific overrides into whatever site is newly encountered.
//!
//! # Modules
//!
//! - [`node`] - Site tree nodes and the pass-through proxy
//! - [`current`] - Per-thread current-site state
//! - [`resolve`] - Host-policy lookup and site resolution
//! - [`traverse`] - Traversal-time site switching
//! - [`mapping`] - Declarative host-name redirection

pub mod caps;
pub mod current;
pub mod error;
pub mod mapping;
pub mod node;
pub mod resolve;
pub mod traverse;

pub use current::{CurrentSiteGuard, clear_current_site, current_site, enter_site, set_current_site};
pub use error::{SiteError, TraversalError};
pub use mapping::{SiteMapping, SiteMappingDirective, query_site_mapping, register_site_mapping};
pub use node::{HOST_SITES_NAME, ProxiedSite, Site, SiteHandle, SiteId, SiteKind, SiteLike};
pub use resolve::{
	component_hierarchy, component_hierarchy_names, find_site_components, get_site_for_site_names,
	register_host_policy,
};
pub use traverse::before_traverse;
