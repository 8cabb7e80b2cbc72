//! The size-adaptive adapter/utility registry store.
//!
//! # Role
//!
//! Holds the actual lookup indexes behind a component bundle: a
//! `provided` index counting registrations per provided capability, and
//! `byorder` specificity levels (order 0 = utilities, order 1 =
//! single-context adapters). Every mutation runs the [`AdapterStore::changed`]
//! pass, which promotes any index that crossed its threshold from a hash
//! map to an ordered tree map.
//!
//! # Invariants
//!
//! - Promotion is monotonic: a tree-backed index never reverts.
//! - A failed promotion (unorderable key) is logged and skipped; sibling
//!   indexes still convert.
//! - Every successful promotion sets the store's change mark so the new
//!   layout is saved at the next checkpoint.

use std::any::Any;
use std::sync::Arc;

use serde::Deserialize;

use crate::capability::Capability;
use crate::map::{AdaptiveMap, MapKey};
use crate::persist::ChangeMark;


/// Type-erased registered provider.
pub type Provider = Arc<dyn Any + Send + Sync>;

/// Wraps a concrete value as a [`Provider`].
pub fn provider<T: Any + Send + Sync>(value: T) -> Provider {
	Arc::new(value)
}

/// Promotion thresholds for adaptive registry storage.
///
/// The map threshold is lower than the provided threshold because there
/// are many level and bucket maps, so the overall effect is amplified.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Thresholds {
	/// Entry count above which the provided-capability index becomes a
	/// tree.
	pub provided: usize,
	/// Entry count above which a specificity-level map or one of its
	/// nested bucket maps becomes a tree.
	pub map: usize,
	/// Entry count above which a container's registration-bookkeeping
	/// maps become trees.
	pub registrations: usize,
}

impl Default for Thresholds {
	fn default() -> Self {
		Self {
			provided: 5000,
			map: 2000,
			registrations: 5000,
		}
	}
}

/// Key within a specificity level's bucket map: the provided capability
/// for adapters, the registration name for utilities.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StoreKey {
	Cap(Capability),
	Name(Arc<str>),
}

impl MapKey for StoreKey {
	fn has_stable_order(&self) -> bool {
		match self {
			StoreKey::Cap(cap) => cap.has_stable_order(),
			StoreKey::Name(_) => true,
		}
	}
}

type Bucket = AdaptiveMap<StoreKey, Provider>;
type Level = AdaptiveMap<Capability, Bucket>;

const UTILITY_ORDER: usize = 0;
const ADAPTER_ORDER: usize = 1;

/// Adapter/utility registry with size-adaptive indexes.
pub struct AdapterStore {
	pub(crate) thresholds: Thresholds,
	pub(crate) mark: ChangeMark,
	/// Registration count per provided capability.
	pub(crate) provided: AdaptiveMap<Capability, u32>,
	/// Indexes by specificity: `byorder[0][provided][name]` for
	/// utilities, `byorder[1][required][provided]` for adapters.
	pub(crate) byorder: Vec<Level>,
}

impl AdapterStore {
	pub fn new(thresholds: Thresholds, mark: ChangeMark) -> Self {
		Self {
			thresholds,
			mark,
			provided: AdaptiveMap::new(),
			byorder: Vec::new(),
		}
	}

	/// Registers a utility provider under `(provided, name)`.
	///
	/// Returns the provider it replaced, if any. Replacement does not
	/// double-count the provided capability.
	pub fn register_utility(
		&mut self,
		provided: Capability,
		name: &str,
		value: Provider,
	) -> Option<Provider> {
		self.register_at(UTILITY_ORDER, provided, StoreKey::Name(name.into()), value)
	}

	pub fn unregister_utility(&mut self, provided: &Capability, name: &str) -> Option<Provider> {
		self.unregister_at(UTILITY_ORDER, provided, &StoreKey::Name(name.into()))
	}

	pub fn lookup_utility(&self, provided: &Capability, name: &str) -> Option<Provider> {
		self.lookup_at(UTILITY_ORDER, provided, &StoreKey::Name(name.into()))
	}

	/// Registers a single-context adapter under `(required, provided)`.
	pub fn register_adapter(
		&mut self,
		required: Capability,
		provided: Capability,
		value: Provider,
	) -> Option<Provider> {
		self.register_at(ADAPTER_ORDER, required, StoreKey::Cap(provided), value)
	}

	pub fn unregister_adapter(
		&mut self,
		required: &Capability,
		provided: &Capability,
	) -> Option<Provider> {
		self.unregister_at(ADAPTER_ORDER, required, &StoreKey::Cap(provided.clone()))
	}

	pub fn lookup_adapter(&self, required: &Capability, provided: &Capability) -> Option<Provider> {
		self.lookup_at(ADAPTER_ORDER, required, &StoreKey::Cap(provided.clone()))
	}

	/// Whether at least one registration provides `cap`.
	pub fn is_provided(&self, cap: &Capability) -> bool {
		self.provided.get(cap).is_some_and(|count| *count > 0)
	}

	fn register_at(
		&mut self,
		order: usize,
		outer: Capability,
		inner: StoreKey,
		value: Provider,
	) -> Option<Provider> {
		while self.byorder.len() <= order {
			self.byorder.push(AdaptiveMap::new());
		}
		let provided_key = self.provided_key(order, &outer, &inner);
		let bucket = self.byorder[order].get_or_insert_with(outer, AdaptiveMap::new);
		let replaced = bucket.insert(inner, value);
		if replaced.is_none() {
			*self.provided.get_or_insert_with(provided_key, || 0) += 1;
		}
		self.mark.set();
		self.changed();
		replaced
	}

	fn unregister_at(
		&mut self,
		order: usize,
		outer: &Capability,
		inner: &StoreKey,
	) -> Option<Provider> {
		let removed = self
			.byorder
			.get_mut(order)
			.and_then(|level| level.get_mut(outer))
			.and_then(|bucket| bucket.remove(inner));
		if removed.is_some() {
			let provided_key = self.provided_key(order, outer, inner);
			if let Some(count) = self.provided.get_mut(&provided_key) {
				*count = count.saturating_sub(1);
				if *count == 0 {
					self.provided.remove(&provided_key);
				}
			}
			self.mark.set();
			self.changed();
		}
		removed
	}

	fn lookup_at(&self, order: usize, outer: &Capability, inner: &StoreKey) -> Option<Provider> {
		self.byorder.get(order)?.get(outer)?.get(inner).cloned()
	}

	/// The capability a registration at `order` provides: the outer key
	/// for utilities, the bucket key for adapters.
	fn provided_key(&self, order: usize, outer: &Capability, inner: &StoreKey) -> Capability {
		match (order, inner) {
			(UTILITY_ORDER, _) => outer.clone(),
			(_, StoreKey::Cap(provided)) => provided.clone(),
			(_, StoreKey::Name(_)) => outer.clone(),
		}
	}

	/// Changed-notification hook.
	///
	/// Checks every index against its threshold and promotes hash-backed
	/// maps to ordered trees. Runs on every mutation and may be invoked
	/// directly by the persistence layer's change propagation.
	pub fn changed(&mut self) {
		if self.provided.len() > self.thresholds.provided {
			promote_logged(&mut self.provided, "provided", &self.mark);
		}
		for (order, level) in self.byorder.iter_mut().enumerate() {
			if level.len() > self.thresholds.map {
				promote_logged(level, &format!("byorder[{order}]"), &self.mark);
			}
			// Buckets at this level are checked even when the level map
			// itself was already (or could not be) converted; only the
			// oversized bucket is replaced, siblings stay untouched.
			for (outer, bucket) in level.iter_mut() {
				if bucket.len() > self.thresholds.map {
					promote_logged(bucket, &format!("byorder[{order}][{outer:?}]"), &self.mark);
				}
			}
		}
	}
}

/// Attempts promotion, marking the store changed on success and logging
/// (without failing) when the map holds unorderable keys.
pub(crate) fn promote_logged<K: MapKey, V>(map: &mut AdaptiveMap<K, V>, label: &str, mark: &ChangeMark) {
	match map.promote() {
		Ok(true) => mark.set(),
		Ok(false) => {}
		Err(err) => {
			tracing::warn!(
				domain = "registry",
				map = label,
				len = map.len(),
				%err,
				"failed to promote map to ordered storage; leaving hash-backed",
			);
		}
	}
}
