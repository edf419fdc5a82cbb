//! Hash containers used by the metadata cache and the registry.
//!
//! Built on *hashbrown* with either a fixed-seed *foldhash* state (string
//! keys) or a pass-through state ([`TypeId`](core::any::TypeId) keys, which
//! are already well distributed).

// -----------------------------------------------------------------------------
// Modules

mod hasher;
mod typeid_map;

// -----------------------------------------------------------------------------
// Exports

pub use hasher::{FixedHashState, NoOpHashState};
pub use typeid_map::TypeIdMap;

/// A [`hashbrown::HashMap`] with a fixed, seed-stable hasher.
pub type HashMap<K, V> = hashbrown::HashMap<K, V, FixedHashState>;

/// A [`hashbrown::HashSet`] with a fixed, seed-stable hasher.
pub type HashSet<K> = hashbrown::HashSet<K, FixedHashState>;
