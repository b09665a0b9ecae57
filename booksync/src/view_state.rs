use std::collections::BTreeSet;
use std::fmt;

use crate::types::{BookSnapshot, Side};

/// Identity of a price level across snapshots: `"<side>:<price>"`.
///
/// The price is rendered with `f64`'s `Display`, so `100`, `100.0` and
/// `"100"` on the wire all map to the same key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelKey {
    pub side: Side,
    pub price: f64,
}

impl LevelKey {
    pub fn new(side: Side, price: f64) -> Self {
        Self { side, price }
    }
}

impl fmt::Display for LevelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.side, self.price)
    }
}

/// Levels the user has expanded to show their whole resting-order ladder.
///
/// Lives for the whole session. Entries are added and removed only by
/// [`toggle`](Self::toggle) / [`set_expanded`](Self::set_expanded) and
/// dropped by [`retain_live`](Self::retain_live) once their level is gone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandedKeySet {
    keys: BTreeSet<String>,
}

impl ExpandedKeySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, key: &LevelKey) -> bool {
        self.keys.contains(&key.to_string())
    }

    pub fn set_expanded(&mut self, key: &LevelKey, expanded: bool) {
        if expanded {
            self.keys.insert(key.to_string());
        } else {
            self.keys.remove(&key.to_string());
        }
    }

    /// Flip membership, returning the new state.
    pub fn toggle(&mut self, key: &LevelKey) -> bool {
        let expanded = !self.is_expanded(key);
        self.set_expanded(key, expanded);
        expanded
    }

    /// Keep only keys whose level is present in `book`.
    pub fn retain_live(&mut self, book: &BookSnapshot) {
        let live: BTreeSet<String> = Side::BOTH
            .iter()
            .flat_map(|side| {
                book.side(*side)
                    .iter()
                    .map(move |level| LevelKey::new(*side, level.price).to_string())
            })
            .collect();
        self.keys.retain(|k| live.contains(k));
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }
}
