//! Zero-sized hash builder for the engine's internal name and id maps.
//!
//! Cell names come from the program itself (registration or config), never
//! from an adversary, so HashDoS resistance is not needed and a fixed-seed
//! foldhash keeps maps small and deterministic.

use std::collections::HashMap;
use std::hash::BuildHasher;

use indexmap::{IndexMap, IndexSet};

pub use foldhash::fast::{FixedState, FoldHasher};

/// A zero-sized `BuildHasher` that uses foldhash with a fixed seed.
#[derive(Clone, Copy, Debug, Default)]
pub struct FastHashBuilder;

impl BuildHasher for FastHashBuilder {
    type Hasher = FoldHasher;

    #[inline]
    fn build_hasher(&self) -> Self::Hasher {
        FixedState::with_seed(0x6b6e_6974_6761_7567).build_hasher()
    }
}

/// Hash map keyed with [`FastHashBuilder`]
pub type FastHashMap<K, V> = HashMap<K, V, FastHashBuilder>;

/// Insertion-ordered map keyed with [`FastHashBuilder`]
pub type FastIndexMap<K, V> = IndexMap<K, V, FastHashBuilder>;

/// Insertion-ordered set keyed with [`FastHashBuilder`]
pub type FastIndexSet<T> = IndexSet<T, FastHashBuilder>;
