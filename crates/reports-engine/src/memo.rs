//! Per-engine memoization of breakdown results.

use crate::cache_key::{Dimension, MetricName};
use crate::result::RegionResults;
use reports_common::Result;
use std::cell::RefCell;
use std::collections::HashMap;

/// Arguments identifying one memoized call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoKey {
    pub metric: MetricName,
    pub group_by: Option<Dimension>,
}

impl MemoKey {
    pub fn new(metric: MetricName, group_by: Option<Dimension>) -> Self {
        Self { metric, group_by }
    }
}

/// Results computed during one request. Lives and dies with its engine.
#[derive(Debug, Default)]
pub struct Memo {
    entries: RefCell<HashMap<MemoKey, RegionResults>>,
}

impl Memo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored value for `key`, or computes and stores it.
    ///
    /// The borrow is released while `compute` runs, so `compute` may consult
    /// the memo for other keys. Errors are returned without being stored.
    pub fn get_or_try_insert_with<F>(&self, key: MemoKey, compute: F) -> Result<RegionResults>
    where
        F: FnOnce() -> Result<RegionResults>,
    {
        if let Some(hit) = self.entries.borrow().get(&key) {
            return Ok(hit.clone());
        }

        let value = compute()?;
        self.entries.borrow_mut().insert(key, value.clone());
        Ok(value)
    }

    pub fn contains(&self, key: &MemoKey) -> bool {
        self.entries.borrow().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}
