//! Size-adaptive maps.
//!
//! An [`AdaptiveMap`] starts hash-backed and can be promoted to an
//! ordered tree map once its owner decides it has grown too large to be
//! materialized in one piece. The two backings are interchangeable at the
//! value level; only scalability and iteration-order guarantees differ.
//!
//! # Invariants
//!
//! - Promotion is one-directional: a tree map is never demoted.
//! - Promotion preserves the `(key, value)` entry set exactly.
//! - A failed promotion leaves the map untouched.

use std::collections::{BTreeMap, btree_map, hash_map};
use std::fmt;
use std::hash::Hash;

use rustc_hash::FxHashMap as HashMap;

use crate::error::PromotionError;

#[cfg(test)]
mod tests;

/// Key requirements for adaptive maps.
pub trait MapKey: Eq + Hash + Ord + Clone + fmt::Debug {
	/// Whether this key orders the same way in every process that may
	/// load the promoted map. Keys without a stable order block
	/// promotion of the map holding them.
	fn has_stable_order(&self) -> bool {
		true
	}
}

impl MapKey for crate::capability::Capability {
	fn has_stable_order(&self) -> bool {
		crate::capability::Capability::has_stable_order(self)
	}
}

/// A map that is either hash-backed or ordered-tree-backed.
#[derive(Clone, Debug)]
pub enum AdaptiveMap<K: MapKey, V> {
	Hash(HashMap<K, V>),
	Tree(BTreeMap<K, V>),
}

impl<K: MapKey, V> Default for AdaptiveMap<K, V> {
	fn default() -> Self {
		AdaptiveMap::Hash(HashMap::default())
	}
}

impl<K: MapKey, V> AdaptiveMap<K, V> {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		match self {
			AdaptiveMap::Hash(map) => map.len(),
			AdaptiveMap::Tree(map) => map.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Whether this map has been promoted to ordered-tree storage.
	pub fn is_tree(&self) -> bool {
		matches!(self, AdaptiveMap::Tree(_))
	}

	pub fn get(&self, key: &K) -> Option<&V> {
		match self {
			AdaptiveMap::Hash(map) => map.get(key),
			AdaptiveMap::Tree(map) => map.get(key),
		}
	}

	pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
		match self {
			AdaptiveMap::Hash(map) => map.get_mut(key),
			AdaptiveMap::Tree(map) => map.get_mut(key),
		}
	}

	pub fn get_or_insert_with(&mut self, key: K, default: impl FnOnce() -> V) -> &mut V {
		match self {
			AdaptiveMap::Hash(map) => map.entry(key).or_insert_with(default),
			AdaptiveMap::Tree(map) => map.entry(key).or_insert_with(default),
		}
	}

	pub fn insert(&mut self, key: K, value: V) -> Option<V> {
		match self {
			AdaptiveMap::Hash(map) => map.insert(key, value),
			AdaptiveMap::Tree(map) => map.insert(key, value),
		}
	}

	pub fn remove(&mut self, key: &K) -> Option<V> {
		match self {
			AdaptiveMap::Hash(map) => map.remove(key),
			AdaptiveMap::Tree(map) => map.remove(key),
		}
	}

	pub fn contains_key(&self, key: &K) -> bool {
		match self {
			AdaptiveMap::Hash(map) => map.contains_key(key),
			AdaptiveMap::Tree(map) => map.contains_key(key),
		}
	}

	pub fn iter(&self) -> Iter<'_, K, V> {
		match self {
			AdaptiveMap::Hash(map) => Iter::Hash(map.iter()),
			AdaptiveMap::Tree(map) => Iter::Tree(map.iter()),
		}
	}

	pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
		match self {
			AdaptiveMap::Hash(map) => IterMut::Hash(map.iter_mut()),
			AdaptiveMap::Tree(map) => IterMut::Tree(map.iter_mut()),
		}
	}

	/// Replaces hash-backed storage with an ordered tree.
	///
	/// Returns `Ok(true)` if a conversion happened and `Ok(false)` if the
	/// map is already tree-backed (re-checking a converted map is a
	/// no-op). Fails without modifying the map when any key lacks a
	/// stable order.
	pub fn promote(&mut self) -> Result<bool, PromotionError> {
		let entries = match self {
			AdaptiveMap::Tree(_) => return Ok(false),
			AdaptiveMap::Hash(map) => {
				if let Some(key) = map.keys().find(|key| !key.has_stable_order()) {
					return Err(PromotionError {
						key: format!("{key:?}"),
					});
				}
				map.drain().collect::<BTreeMap<K, V>>()
			}
		};
		*self = AdaptiveMap::Tree(entries);
		Ok(true)
	}
}

/// Borrowing iterator over either backing.
pub enum Iter<'a, K, V> {
	Hash(hash_map::Iter<'a, K, V>),
	Tree(btree_map::Iter<'a, K, V>),
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
	type Item = (&'a K, &'a V);

	fn next(&mut self) -> Option<Self::Item> {
		match self {
			Iter::Hash(iter) => iter.next(),
			Iter::Tree(iter) => iter.next(),
		}
	}
}

/// Mutable iterator over either backing.
pub enum IterMut<'a, K, V> {
	Hash(hash_map::IterMut<'a, K, V>),
	Tree(btree_map::IterMut<'a, K, V>),
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
	type Item = (&'a K, &'a mut V);

	fn next(&mut self) -> Option<Self::Item> {
		match self {
			IterMut::Hash(iter) => iter.next(),
			IterMut::Tree(iter) => iter.next(),
		}
	}
}
