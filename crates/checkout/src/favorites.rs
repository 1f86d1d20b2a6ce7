//! Favorited products.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cart::LineKey;

/// Ordered set of favorited (product, outlet) pairs, most recent last.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Favorites {
    keys: Vec<LineKey>,
}

impl Favorites {
    #[must_use]
    pub const fn new() -> Self {
        Self { keys: Vec::new() }
    }

    /// Add the key if absent, remove it if present. Returns whether the key
    /// is a favorite afterwards.
    pub fn toggle(&mut self, key: LineKey) -> bool {
        let favorited = if self.remove(key) {
            false
        } else {
            self.keys.push(key);
            true
        };
        debug!(%key, favorited, "Toggled favorite");
        favorited
    }

    /// Returns whether the key was present.
    pub fn remove(&mut self, key: LineKey) -> bool {
        let before = self.keys.len();
        self.keys.retain(|k| *k != key);
        self.keys.len() != before
    }

    #[must_use]
    pub fn contains(&self, key: LineKey) -> bool {
        self.keys.contains(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LineKey> {
        self.keys.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
