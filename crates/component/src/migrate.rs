//! Load-time schema migration for previously-persisted containers.
//!
//! Earlier releases stored bundle registries as plain hash maps. Instead
//! of rewriting every stored container (the layouts are entry-for-entry
//! identical), the persistence adapter hands loaded registries to
//! [`Components::from_image`], which moves legacy maps into adaptive
//! stores. Externally-held references stay valid because sharing happens
//! at the `Arc<Components>` level, and the upgraded registries gain
//! promotion behavior on their next mutation.
//!
//! The upgrade itself never sets the change mark: the stored bytes are
//! unchanged, only behavior differs going forward, and dirtying every
//! container on read would rewrite the whole installed base.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::capability::Capability;
use crate::components::{
	AdapterKey, AdapterRegistration, Components, UtilityKey, UtilityRegistration,
};
use crate::map::AdaptiveMap;
use crate::persist::ChangeMark;
use crate::store::{AdapterStore, Provider, StoreKey, Thresholds};

#[cfg(test)]
mod tests;

/// The hash-backed registry layout written by earlier releases.
#[derive(Default)]
pub struct PlainRegistry {
	pub provided: FxHashMap<Capability, u32>,
	pub byorder: Vec<FxHashMap<Capability, FxHashMap<StoreKey, Provider>>>,
}

/// One registry as handed back by the persistence adapter.
pub enum RegistryImage {
	/// Legacy layout, upgraded on load.
	Plain(PlainRegistry),
	/// Current layout, passed through untouched.
	Adaptive(AdapterStore),
}

impl RegistryImage {
	fn into_store(self, thresholds: Thresholds, mark: &ChangeMark) -> AdapterStore {
		match self {
			RegistryImage::Adaptive(mut store) => {
				store.thresholds = thresholds;
				store.mark = mark.clone();
				store
			}
			RegistryImage::Plain(plain) => AdapterStore {
				thresholds,
				mark: mark.clone(),
				provided: AdaptiveMap::Hash(plain.provided),
				byorder: plain
					.byorder
					.into_iter()
					.map(|level| {
						AdaptiveMap::Hash(
							level
								.into_iter()
								.map(|(outer, bucket)| (outer, AdaptiveMap::Hash(bucket)))
								.collect(),
						)
					})
					.collect(),
			},
		}
	}
}

/// A loaded container image.
pub struct ComponentsImage {
	pub name: Arc<str>,
	pub persisted: bool,
	/// Whether the stored object was already marked changed when loaded.
	pub changed: bool,
	pub bases: Vec<Arc<Components>>,
	pub adapters: RegistryImage,
	pub utilities: RegistryImage,
	pub utility_registrations: AdaptiveMap<UtilityKey, UtilityRegistration>,
	pub adapter_registrations: AdaptiveMap<AdapterKey, AdapterRegistration>,
}

impl Components {
	/// Reconstructs a container from its stored image, upgrading legacy
	/// registries to the adaptive layout.
	///
	/// The change mark afterwards reflects the stored state: the upgrade
	/// alone never dirties the container.
	pub fn from_image(image: ComponentsImage, thresholds: Thresholds) -> Arc<Components> {
		let mark = ChangeMark::new();
		if image.changed {
			mark.set();
		}
		let adapters = image.adapters.into_store(thresholds, &mark);
		let utilities = image.utilities.into_store(thresholds, &mark);
		Components::from_parts(
			image.name,
			image.persisted,
			thresholds,
			mark,
			image.bases,
			adapters,
			utilities,
			image.utility_registrations,
			image.adapter_registrations,
		)
	}
}
