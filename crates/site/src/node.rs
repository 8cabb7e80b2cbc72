//! Site tree nodes.
//!
//! A [`Site`] is a node in the persisted containment tree; it owns the
//! component bundle expressing its configuration. A [`ProxiedSite`] is a
//! pass-through wrapper the traversal switcher installs to substitute a
//! composed bundle without touching the wrapped node: the delegated
//! surface is enumerated explicitly by the [`SiteLike`] trait, and only
//! the bundle accessors are intercepted.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use manor_component::Components;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::error::SiteError;


/// Name of the well-known container of persisted host sites under the
/// main application site.
pub const HOST_SITES_NAME: &str = "hostsites";

/// Process-unique site identity.
///
/// Proxies mint their own: a proxy is never identical to the site it
/// wraps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SiteId(u64);

impl SiteId {
	fn next() -> Self {
		static NEXT: AtomicU64 = AtomicU64::new(1);
		Self(NEXT.fetch_add(1, Ordering::Relaxed))
	}
}

/// Structural role of a site node in the containment tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SiteKind {
	/// Root container of the resource tree.
	Root,
	/// The main application's top-level folder.
	MainApplication,
	/// The container of persisted host sites.
	HostSites,
	/// A host-policy site filed under the host-sites container.
	HostPolicy,
	/// Any other site.
	Plain,
}

/// Capability surface of a site node.
pub trait SiteLike: Send + Sync {
	/// Process-unique identity.
	fn site_id(&self) -> SiteId;
	fn name(&self) -> &str;
	fn kind(&self) -> SiteKind;
	fn parent(&self) -> Option<SiteHandle>;
	/// Child lookup by name in the containment tree.
	fn child(&self, name: &str) -> Option<SiteHandle>;
	/// The component bundle expressing this site's configuration.
	fn components(&self) -> Arc<Components>;
	/// Replaces the bundle. Proxies reject this.
	fn set_components(&self, components: Arc<Components>) -> Result<(), SiteError>;
	fn is_persisted(&self) -> bool;
}

pub type SiteHandle = Arc<dyn SiteLike>;

/// A concrete site node.
pub struct Site {
	/// Weak self-reference installed at construction, used to wire
	/// children's parent links.
	this: Weak<Site>,
	id: SiteId,
	name: Arc<str>,
	kind: SiteKind,
	persisted: bool,
	parent: RwLock<Option<Weak<dyn SiteLike>>>,
	children: RwLock<FxHashMap<Arc<str>, Arc<Site>>>,
	components: RwLock<Arc<Components>>,
}

impl Site {
	fn build(
		name: Arc<str>,
		kind: SiteKind,
		components: Arc<Components>,
		persisted: bool,
	) -> Arc<Self> {
		Arc::new_cyclic(|this| Self {
			this: this.clone(),
			id: SiteId::next(),
			name,
			kind,
			persisted,
			parent: RwLock::new(None),
			children: RwLock::new(FxHashMap::default()),
			components: RwLock::new(components),
		})
	}

	/// A durably-persisted site node owning `components`.
	pub fn persistent(
		name: impl Into<Arc<str>>,
		kind: SiteKind,
		components: Arc<Components>,
	) -> Arc<Self> {
		Self::build(name.into(), kind, components, true)
	}

	/// A transient site node, typically wrapping a synthesized composite
	/// bundle.
	pub fn transient(
		name: impl Into<Arc<str>>,
		kind: SiteKind,
		components: Arc<Components>,
	) -> Arc<Self> {
		Self::build(name.into(), kind, components, false)
	}

	/// Files `child` under this site and points its parent link back
	/// here.
	pub fn add_child(&self, child: Arc<Site>) -> Arc<Site> {
		let parent: Weak<dyn SiteLike> = self.this.clone();
		*child.parent.write() = Some(parent);
		self.children.write().insert(child.name.clone(), child.clone());
		child
	}

	/// Structural bookkeeping for sites created outside `add_child`,
	/// e.g. transient sites mirroring a fallback's position.
	pub fn set_parent(&self, parent: &SiteHandle) {
		*self.parent.write() = Some(Arc::downgrade(parent));
	}
}

impl SiteLike for Site {
	fn site_id(&self) -> SiteId {
		self.id
	}

	fn name(&self) -> &str {
		&self.name
	}

	fn kind(&self) -> SiteKind {
		self.kind
	}

	fn parent(&self) -> Option<SiteHandle> {
		self.parent.read().as_ref().and_then(Weak::upgrade)
	}

	fn child(&self, name: &str) -> Option<SiteHandle> {
		let child: SiteHandle = self.children.read().get(name).cloned()?;
		Some(child)
	}

	fn components(&self) -> Arc<Components> {
		self.components.read().clone()
	}

	fn set_components(&self, components: Arc<Components>) -> Result<(), SiteError> {
		*self.components.write() = components;
		Ok(())
	}

	fn is_persisted(&self) -> bool {
		self.persisted
	}
}

/// Pass-through wrapper substituting a composed bundle for a traversed
/// site.
///
/// Everything delegates to the wrapped site except the bundle accessors:
/// [`SiteLike::components`] answers from the stored composite and
/// [`SiteLike::set_components`] is rejected.
pub struct ProxiedSite {
	id: SiteId,
	inner: SiteHandle,
	components: Arc<Components>,
}

impl ProxiedSite {
	pub fn new(inner: SiteHandle, components: Arc<Components>) -> Arc<Self> {
		Arc::new(Self {
			id: SiteId::next(),
			inner,
			components,
		})
	}

	/// The wrapped site.
	pub fn inner(&self) -> &SiteHandle {
		&self.inner
	}
}

impl SiteLike for ProxiedSite {
	fn site_id(&self) -> SiteId {
		self.id
	}

	fn name(&self) -> &str {
		self.inner.name()
	}

	fn kind(&self) -> SiteKind {
		self.inner.kind()
	}

	fn parent(&self) -> Option<SiteHandle> {
		self.inner.parent()
	}

	fn child(&self, name: &str) -> Option<SiteHandle> {
		self.inner.child(name)
	}

	fn components(&self) -> Arc<Components> {
		self.components.clone()
	}

	fn set_components(&self, _components: Arc<Components>) -> Result<(), SiteError> {
		Err(SiteError::ProxyImmutable)
	}

	fn is_persisted(&self) -> bool {
		self.inner.is_persisted()
	}
}
