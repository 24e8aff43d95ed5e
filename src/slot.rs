//! Slot storage and the entry view handed to visitors.

use crate::error::{Error, Result};

/// An occupied slot: the stored key and its value.
///
/// Visitors passed to [`ProbeMap::apply`](crate::ProbeMap::apply) receive
/// `&mut Entry`; the key is read-only so the entry can never drift out of
/// its probe window.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Entry<K, V> {
    key: K,
    value: V,
}

impl<K, V> Entry<K, V> {
    pub(crate) fn new(key: K, value: V) -> Self {
        Self { key, value }
    }

    pub(crate) fn into_parts(self) -> (K, V) {
        (self.key, self.value)
    }

    pub(crate) fn parts_mut(&mut self) -> (&K, &mut V) {
        (&self.key, &mut self.value)
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }
}

impl<K: AsRef<[u8]>, V> Entry<K, V> {
    /// The key as the bytes it is hashed and compared by.
    pub fn key_bytes(&self) -> &[u8] {
        self.key.as_ref()
    }

    pub fn key_len(&self) -> usize {
        self.key.as_ref().len()
    }

    #[inline]
    pub(crate) fn matches(&self, key: &[u8]) -> bool {
        self.key.as_ref() == key
    }
}

/// Directive returned by a visitor for the entry it was just shown.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Visit {
    /// Keep the entry and move on.
    Continue,
    /// Clear the slot (dropping key and value) and move on.
    Remove,
    /// Stop the traversal; the current entry is kept.
    Stop,
}

impl Visit {
    /// Maps the integer convention `-1` remove, `0` continue, anything
    /// else stop.
    pub fn from_code(code: i32) -> Self {
        match code {
            -1 => Visit::Remove,
            0 => Visit::Continue,
            _ => Visit::Stop,
        }
    }
}

/// How a traversal ended.
#[must_use]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Applied {
    /// Every slot was visited.
    Completed,
    /// A visitor returned [`Visit::Stop`].
    EarlyExit,
}

impl Applied {
    pub fn is_completed(self) -> bool {
        self == Applied::Completed
    }
}

/// Allocates `len` elements produced by `fill`, reporting allocation
/// failure instead of aborting.
pub(crate) fn try_filled_with<T, F>(len: usize, fill: F) -> Result<Vec<T>>
where
    F: FnMut() -> T,
{
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| Error::AllocationFailure { capacity: len })?;
    v.resize_with(len, fill);
    Ok(v)
}

pub(crate) type Slots<K, V> = Vec<Option<Entry<K, V>>>;

/// A slot array of `capacity` empty slots.
pub(crate) fn empty_slots<K, V>(capacity: usize) -> Result<Slots<K, V>> {
    try_filled_with(capacity, || None)
}
