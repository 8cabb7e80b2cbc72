//! Component bundles.
//!
//! A [`Components`] bundle owns two [`AdapterStore`]s (adapters and
//! utilities) plus the registration-bookkeeping maps, and inherits
//! lookups from an ordered list of base bundles. Lookup walks the
//! bundle's resolution order: itself first, then each base's chain in
//! base-tuple order, de-duplicated with the first occurrence keeping its
//! position.

use std::any::Any;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::capability::Capability;
use crate::error::RegistryError;
use crate::map::{AdaptiveMap, MapKey};
use crate::persist::ChangeMark;
use crate::store::{AdapterStore, Provider, Thresholds, promote_logged};


/// Bookkeeping key for one utility registration.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UtilityKey {
	pub provided: Capability,
	pub name: Arc<str>,
}

impl MapKey for UtilityKey {
	fn has_stable_order(&self) -> bool {
		self.provided.has_stable_order()
	}
}

/// Bookkeeping key for one adapter registration.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AdapterKey {
	pub required: Capability,
	pub provided: Capability,
}

impl MapKey for AdapterKey {
	fn has_stable_order(&self) -> bool {
		self.required.has_stable_order() && self.provided.has_stable_order()
	}
}

/// Bookkeeping record for one utility registration.
#[derive(Clone)]
pub struct UtilityRegistration {
	pub provided: Capability,
	pub name: Arc<str>,
	pub provider: Provider,
}

/// Bookkeeping record for one adapter registration.
#[derive(Clone)]
pub struct AdapterRegistration {
	pub required: Capability,
	pub provided: Capability,
	pub provider: Provider,
}

/// A named component bundle with inherited lookup.
///
/// The name may be empty for the global bundle. Persisted bundles are
/// durably stored by the enclosing persistence system; transient ones
/// (composites built during resolution and traversal) are not.
pub struct Components {
	/// Weak self-reference installed at construction; bundles only ever
	/// live behind an `Arc`.
	this: Weak<Components>,
	name: Arc<str>,
	persisted: bool,
	thresholds: Thresholds,
	mark: ChangeMark,
	/// Location parent for bundles arranged in a policy hierarchy.
	parent: RwLock<Option<Arc<Components>>>,
	/// Base bundles consulted after local lookup, in priority order.
	bases: RwLock<Vec<Arc<Components>>>,
	// The two stores are never replaced after construction: other
	// bundles' lookups may reach them through this bundle's position in
	// a resolution order, and a swapped-out store would leave those
	// chains pointing at stale state. Only nested map promotion mutates
	// them, field by field, in place.
	pub(crate) adapters: RwLock<AdapterStore>,
	pub(crate) utilities: RwLock<AdapterStore>,
	utility_registrations: RwLock<AdaptiveMap<UtilityKey, UtilityRegistration>>,
	adapter_registrations: RwLock<AdaptiveMap<AdapterKey, AdapterRegistration>>,
	/// Host-specific bundle recorded on composites built by the site
	/// resolver and the traversal switcher; `None` everywhere else.
	host_components: RwLock<Option<Arc<Components>>>,
}

impl Components {
	fn build(
		name: Arc<str>,
		persisted: bool,
		thresholds: Thresholds,
		bases: Vec<Arc<Components>>,
	) -> Arc<Self> {
		let mark = ChangeMark::new();
		Arc::new_cyclic(|this| Self {
			this: this.clone(),
			name,
			persisted,
			thresholds,
			mark: mark.clone(),
			parent: RwLock::new(None),
			bases: RwLock::new(bases),
			adapters: RwLock::new(AdapterStore::new(thresholds, mark.clone())),
			utilities: RwLock::new(AdapterStore::new(thresholds, mark)),
			utility_registrations: RwLock::new(AdaptiveMap::new()),
			adapter_registrations: RwLock::new(AdaptiveMap::new()),
			host_components: RwLock::new(None),
		})
	}

	#[allow(clippy::too_many_arguments)]
	pub(crate) fn from_parts(
		name: Arc<str>,
		persisted: bool,
		thresholds: Thresholds,
		mark: ChangeMark,
		bases: Vec<Arc<Components>>,
		adapters: AdapterStore,
		utilities: AdapterStore,
		utility_registrations: AdaptiveMap<UtilityKey, UtilityRegistration>,
		adapter_registrations: AdaptiveMap<AdapterKey, AdapterRegistration>,
	) -> Arc<Self> {
		Arc::new_cyclic(|this| Self {
			this: this.clone(),
			name,
			persisted,
			thresholds,
			mark,
			parent: RwLock::new(None),
			bases: RwLock::new(bases),
			adapters: RwLock::new(adapters),
			utilities: RwLock::new(utilities),
			utility_registrations: RwLock::new(utility_registrations),
			adapter_registrations: RwLock::new(adapter_registrations),
			host_components: RwLock::new(None),
		})
	}

	/// A durably-persisted bundle with default thresholds.
	pub fn persistent(name: impl Into<Arc<str>>) -> Arc<Self> {
		Self::build(name.into(), true, Thresholds::default(), Vec::new())
	}

	/// A durably-persisted bundle with explicit thresholds.
	pub fn persistent_with(name: impl Into<Arc<str>>, thresholds: Thresholds) -> Arc<Self> {
		Self::build(name.into(), true, thresholds, Vec::new())
	}

	/// A transient composite inheriting lookups from `bases`, in order.
	pub fn based(name: impl Into<Arc<str>>, bases: Vec<Arc<Components>>) -> Arc<Self> {
		Self::build(name.into(), false, Thresholds::default(), bases)
	}

	/// A transient composite placing host-specific registrations before
	/// the main bundle's, with the host bundle recorded as the override
	/// the traversal switcher carries along.
	pub fn host_composite(
		name: impl Into<Arc<str>>,
		host: Arc<Components>,
		main: Arc<Components>,
	) -> Arc<Self> {
		let composite = Self::based(name, vec![host.clone(), main]);
		*composite.host_components.write() = Some(host);
		composite
	}

	fn strong(&self) -> Arc<Components> {
		self.this
			.upgrade()
			.expect("component bundles are always constructed behind an Arc")
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn is_persisted(&self) -> bool {
		self.persisted
	}

	pub fn mark(&self) -> &ChangeMark {
		&self.mark
	}

	pub fn parent(&self) -> Option<Arc<Components>> {
		self.parent.read().clone()
	}

	pub fn set_parent(&self, parent: Option<Arc<Components>>) {
		*self.parent.write() = parent;
	}

	/// The base tuple, in lookup-priority order.
	pub fn bases(&self) -> Vec<Arc<Components>> {
		self.bases.read().clone()
	}

	pub fn host_components(&self) -> Option<Arc<Components>> {
		self.host_components.read().clone()
	}

	pub fn set_host_components(&self, host: Arc<Components>) {
		*self.host_components.write() = Some(host);
	}

	/// Appends a base bundle, rejecting cycles in the base graph.
	pub fn add_base(&self, base: Arc<Components>) -> Result<(), RegistryError> {
		if base
			.resolution_order()
			.iter()
			.any(|bundle| std::ptr::eq(Arc::as_ptr(bundle), self))
		{
			return Err(RegistryError::BaseCycle {
				name: base.name().to_string(),
			});
		}
		self.bases.write().push(base);
		self.mark.set();
		Ok(())
	}

	/// The linearized lookup chain: this bundle first, then each base's
	/// chain in base-tuple order.
	///
	/// De-duplication is most-derived-first with the first occurrence
	/// winning its position; a bundle appended at the end of a base tuple
	/// that already appears earlier in the chain therefore stays where it
	/// was.
	pub fn resolution_order(&self) -> Vec<Arc<Components>> {
		let mut order = Vec::new();
		self.collect_order(&mut order);
		order
	}

	fn collect_order(&self, order: &mut Vec<Arc<Components>>) {
		if order
			.iter()
			.any(|bundle| std::ptr::eq(Arc::as_ptr(bundle), self))
		{
			return;
		}
		order.push(self.strong());
		let bases = self.bases.read().clone();
		for base in bases {
			base.collect_order(order);
		}
	}

	/// Registers `value` as the utility providing `provided` under
	/// `name`. Re-registration under the same `(provided, name)` replaces
	/// the prior provider.
	pub fn register_utility(&self, provided: Capability, name: impl Into<Arc<str>>, value: Provider) {
		let name = name.into();
		self.utilities
			.write()
			.register_utility(provided.clone(), &name, value.clone());
		let mut registrations = self.utility_registrations.write();
		registrations.insert(
			UtilityKey {
				provided: provided.clone(),
				name: name.clone(),
			},
			UtilityRegistration {
				provided,
				name,
				provider: value,
			},
		);
		self.check_registrations(&mut registrations, "utility_registrations");
		self.mark.set();
	}

	pub fn unregister_utility(&self, provided: &Capability, name: &str) -> Option<Provider> {
		let removed = self.utilities.write().unregister_utility(provided, name);
		if removed.is_some() {
			self.utility_registrations.write().remove(&UtilityKey {
				provided: provided.clone(),
				name: name.into(),
			});
			self.mark.set();
		}
		removed
	}

	/// Registers `value` as the adapter from `required` to `provided`.
	pub fn register_adapter(&self, required: Capability, provided: Capability, value: Provider) {
		self.adapters
			.write()
			.register_adapter(required.clone(), provided.clone(), value.clone());
		let mut registrations = self.adapter_registrations.write();
		registrations.insert(
			AdapterKey {
				required: required.clone(),
				provided: provided.clone(),
			},
			AdapterRegistration {
				required,
				provided,
				provider: value,
			},
		);
		self.check_registrations(&mut registrations, "adapter_registrations");
		self.mark.set();
	}

	pub fn unregister_adapter(
		&self,
		required: &Capability,
		provided: &Capability,
	) -> Option<Provider> {
		let removed = self
			.adapters
			.write()
			.unregister_adapter(required, provided);
		if removed.is_some() {
			self.adapter_registrations.write().remove(&AdapterKey {
				required: required.clone(),
				provided: provided.clone(),
			});
			self.mark.set();
		}
		removed
	}

	/// Bookkeeping maps are promoted independently of the stores they
	/// shadow, at their own threshold, after every registration.
	fn check_registrations<K: MapKey, V>(&self, map: &mut AdaptiveMap<K, V>, label: &str) {
		if map.len() > self.thresholds.registrations {
			promote_logged(map, label, &self.mark);
		}
	}

	/// Local-only utility lookup, ignoring bases.
	pub fn local_utility(&self, provided: &Capability, name: &str) -> Option<Provider> {
		self.utilities.read().lookup_utility(provided, name)
	}

	/// Local-only adapter lookup, ignoring bases.
	pub fn local_adapter(&self, required: &Capability, provided: &Capability) -> Option<Provider> {
		self.adapters.read().lookup_adapter(required, provided)
	}

	/// First utility for `(provided, name)` through the resolution order.
	pub fn query_utility(&self, provided: &Capability, name: &str) -> Option<Provider> {
		self.resolution_order()
			.into_iter()
			.find_map(|bundle| bundle.local_utility(provided, name))
	}

	/// First adapter for `(required, provided)` through the resolution
	/// order.
	pub fn query_adapter(
		&self,
		required: &Capability,
		provided: &Capability,
	) -> Option<Provider> {
		self.resolution_order()
			.into_iter()
			.find_map(|bundle| bundle.local_adapter(required, provided))
	}

	/// Typed convenience over [`Self::query_utility`].
	pub fn utility_of<T: Any + Send + Sync>(
		&self,
		provided: &Capability,
		name: &str,
	) -> Option<Arc<T>> {
		self.query_utility(provided, name)?.downcast::<T>().ok()
	}

	pub fn utility_registration_count(&self) -> usize {
		self.utility_registrations.read().len()
	}

	pub fn adapter_registration_count(&self) -> usize {
		self.adapter_registrations.read().len()
	}
}
