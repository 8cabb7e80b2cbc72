use rustc_hash::FxHashMap;

use super::*;
use crate::store::provider;

fn cap(name: &str) -> Capability {
	Capability::named(name)
}

fn plain_utilities(bucket: &Capability, count: usize) -> PlainRegistry {
	let mut names: FxHashMap<StoreKey, Provider> = FxHashMap::default();
	for i in 0..count {
		names.insert(StoreKey::Name(format!("n{i}").into()), provider(i));
	}
	let mut level = FxHashMap::default();
	level.insert(bucket.clone(), names);
	let mut provided = FxHashMap::default();
	provided.insert(bucket.clone(), count as u32);
	PlainRegistry {
		provided,
		byorder: vec![level],
	}
}

fn image(utilities: RegistryImage, changed: bool) -> ComponentsImage {
	ComponentsImage {
		name: "app".into(),
		persisted: true,
		changed,
		bases: Vec::new(),
		adapters: RegistryImage::Plain(PlainRegistry::default()),
		utilities,
		utility_registrations: AdaptiveMap::new(),
		adapter_registrations: AdaptiveMap::new(),
	}
}

#[test]
fn plain_image_upgrades_without_dirtying() {
	let svc = cap("svc");
	let loaded = Components::from_image(
		image(RegistryImage::Plain(plain_utilities(&svc, 3)), false),
		Thresholds::default(),
	);

	assert!(!loaded.mark().is_set());
	assert!(loaded.is_persisted());
	assert!(loaded.query_utility(&svc, "n0").is_some());
	assert!(loaded.query_utility(&svc, "missing").is_none());
}

#[test]
fn previously_changed_image_stays_marked() {
	let svc = cap("svc");
	let loaded = Components::from_image(
		image(RegistryImage::Plain(plain_utilities(&svc, 1)), true),
		Thresholds::default(),
	);

	assert!(loaded.mark().is_set());
}

#[test]
fn upgraded_store_gains_promotion_on_next_mutation() {
	let busy = cap("busy");
	let mark = ChangeMark::new();
	let mut store = RegistryImage::Plain(plain_utilities(&busy, 2001))
		.into_store(Thresholds::default(), &mark);

	// The upgrade alone converts nothing and dirties nothing.
	assert!(!store.byorder[0].get(&busy).unwrap().is_tree());
	assert!(!mark.is_set());

	store.register_utility(busy.clone(), "extra", provider(0u32));
	assert!(store.byorder[0].get(&busy).unwrap().is_tree());
	assert!(mark.is_set());
	assert!(store.lookup_utility(&busy, "n2000").is_some());
}

#[test]
fn adaptive_image_passes_through() {
	let mark = ChangeMark::new();
	let thresholds = Thresholds {
		map: 2,
		..Thresholds::default()
	};
	let mut store = AdapterStore::new(thresholds, mark);
	let svc = cap("svc");
	for i in 0..3 {
		store.register_utility(svc.clone(), &format!("n{i}"), provider(i));
	}
	assert!(store.byorder[0].get(&svc).unwrap().is_tree());

	let loaded = Components::from_image(
		image(RegistryImage::Adaptive(store), false),
		thresholds,
	);

	assert!(!loaded.mark().is_set());
	assert!(loaded.query_utility(&svc, "n2").is_some());
	assert!(loaded.utilities.read().byorder[0].get(&svc).unwrap().is_tree());
}
