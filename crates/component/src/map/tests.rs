use pretty_assertions::assert_eq;

use super::*;
use crate::capability::Capability;

fn entries(map: &AdaptiveMap<Capability, u32>) -> Vec<(Capability, u32)> {
	let mut out: Vec<_> = map.iter().map(|(key, value)| (key.clone(), *value)).collect();
	out.sort();
	out
}

#[test]
fn promotion_preserves_entries() {
	let mut map = AdaptiveMap::new();
	for i in 0..50u32 {
		map.insert(Capability::named(format!("cap-{i}")), i);
	}
	let before = entries(&map);

	assert!(map.promote().unwrap());
	assert!(map.is_tree());
	assert_eq!(entries(&map), before);
	assert_eq!(map.len(), 50);
}

#[test]
fn promotion_is_idempotent_and_monotonic() {
	let mut map = AdaptiveMap::new();
	map.insert(Capability::named("a"), 1u32);

	assert!(map.promote().unwrap());
	// Re-checking an already-converted map is a no-op.
	assert!(!map.promote().unwrap());
	assert!(map.is_tree());

	// Mutations never revert the backing.
	map.insert(Capability::named("b"), 2);
	map.remove(&Capability::named("a"));
	assert!(map.is_tree());
}

#[test]
fn promotion_fails_on_unorderable_key() {
	let mut map = AdaptiveMap::new();
	map.insert(Capability::named("stable"), 1u32);
	map.insert(Capability::anonymous(), 2);
	let before = entries(&map);

	assert!(map.promote().is_err());
	assert!(!map.is_tree());
	assert_eq!(entries(&map), before);
}

#[test]
fn tree_iteration_is_key_ordered() {
	let mut map = AdaptiveMap::new();
	map.insert(Capability::named("c"), 3u32);
	map.insert(Capability::named("a"), 1);
	map.insert(Capability::named("b"), 2);
	map.promote().unwrap();

	let keys: Vec<_> = map.iter().filter_map(|(key, _)| key.name()).collect();
	assert_eq!(keys, vec!["a", "b", "c"]);
}
