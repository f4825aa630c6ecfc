//! Ordered side tables used by the indexed sequence backend.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// An insertion-ordered list of string values, with duplicates allowed.
///
/// Each row gets a monotonically increasing order key. A reverse index
/// from value to order keys makes removal of the first occurrence a
/// logarithmic operation instead of a scan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SideTable {
    next_order: u64,
    rows: BTreeMap<u64, String>,
    positions: HashMap<String, BTreeSet<u64>>,
}

impl SideTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value at the end.
    pub fn append(&mut self, value: &str) {
        let order = self.next_order;
        self.next_order += 1;
        self.rows.insert(order, value.to_string());
        self.positions
            .entry(value.to_string())
            .or_default()
            .insert(order);
    }

    /// Removes the first occurrence of `value`. Returns false if absent.
    pub fn remove_first(&mut self, value: &str) -> bool {
        let Some(orders) = self.positions.get_mut(value) else {
            return false;
        };
        let Some(order) = orders.pop_first() else {
            return false;
        };
        if orders.is_empty() {
            self.positions.remove(value);
        }
        self.rows.remove(&order);
        true
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns up to `limit` values starting at the zero-based `offset`.
    #[must_use]
    pub fn range(&self, offset: usize, limit: usize) -> Vec<String> {
        self.rows.values().skip(offset).take(limit).cloned().collect()
    }

    /// Returns true if `value` occurs in the table.
    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.positions.contains_key(value)
    }

    /// Order key the next appended row will get.
    pub(crate) fn next_order(&self) -> u64 {
        self.next_order
    }

    /// Order keys of every occurrence of `value`, ascending.
    pub(crate) fn orders_of<'a>(&'a self, value: &str) -> impl Iterator<Item = u64> + 'a {
        self.positions
            .get(value)
            .into_iter()
            .flat_map(|orders| orders.iter().copied())
    }

    /// Rows with their order keys, in table order.
    pub(crate) fn rows(&self) -> impl Iterator<Item = (u64, &str)> + '_ {
        self.rows.iter().map(|(order, value)| (*order, value.as_str()))
    }

    /// Removes all rows and returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.rows.len();
        self.rows.clear();
        self.positions.clear();
        removed
    }
}
