//! ProbeMap: open-addressed storage with a bounded linear probe window.

use crate::error::{Error, Result};
use crate::hash;
use crate::slot::{empty_slots, Applied, Entry, Slots, Visit};
use core::fmt;

/// Number of consecutive slots, starting at a key's home bucket, that
/// insertion and lookup examine.
pub const MAX_PROBE: usize = 8;

/// Outcome of searching a key's probe window.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Probe {
    /// Occupied slot holding the key.
    Hit(usize),
    /// First empty slot in the window; the key is not present.
    Free(usize),
    /// Neither; the table must grow before the key can be placed.
    Full,
}

/// Slot indices visited from `start`, wrapping around `capacity`.
#[inline]
pub(crate) fn window(start: usize, capacity: usize) -> impl Iterator<Item = usize> {
    (0..MAX_PROBE).map(move |step| (start + step) % capacity)
}

/// A map from byte-string keys to values.
///
/// Keys are compared and hashed by `K::as_ref()`. With `K = &str` or
/// `K = &[u8]` the map borrows its keys and never copies them; the
/// borrow checker keeps the key storage alive and unchanged for as long
/// as the map exists.
///
/// Every entry lives within [`MAX_PROBE`] slots of its home bucket, so
/// lookups never scan further and removal needs no tombstones. When an
/// insert cannot find room in its window the capacity doubles.
pub struct ProbeMap<K, V> {
    slots: Slots<K, V>,
    len: usize,
}

impl<K, V> ProbeMap<K, V> {
    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots; always a power of two.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Visits occupied slots in index order. The callback may take the
    /// entry out of the slot; returning `Visit::Remove` clears it and
    /// decrements the count.
    pub(crate) fn sweep<F>(&mut self, mut f: F) -> Applied
    where
        F: FnMut(usize, &mut Option<Entry<K, V>>) -> Visit,
    {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.is_none() {
                continue;
            }
            match f(i, slot) {
                Visit::Continue => {}
                Visit::Remove => {
                    *slot = None;
                    self.len -= 1;
                }
                Visit::Stop => return Applied::EarlyExit,
            }
        }
        Applied::Completed
    }

    /// Occupied slots with their indices.
    pub(crate) fn iter_slots(&self) -> impl Iterator<Item = (usize, &Entry<K, V>)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|e| (i, e)))
    }

    /// Replaces the slot array wholesale; used once a rehash has moved
    /// every entry into `slots`.
    pub(crate) fn install(&mut self, slots: Slots<K, V>, len: usize) {
        debug_assert!(slots.len().is_power_of_two());
        self.slots = slots;
        self.len = len;
    }

    /// Calls `f` on every entry in slot order, acting on the returned
    /// [`Visit`] directive after each call.
    ///
    /// Order follows hash placement, not insertion order.
    pub fn apply<F>(&mut self, mut f: F) -> Applied
    where
        F: FnMut(&mut Entry<K, V>) -> Visit,
    {
        self.sweep(|_, slot| match slot.as_mut() {
            Some(entry) => f(entry),
            None => Visit::Continue,
        })
    }

    /// Releases the table and everything it holds.
    pub fn destroy(self) {
        tracing::trace!(capacity = self.capacity(), len = self.len, "destroying table");
    }

    /// Runs `f` over every entry (as [`apply`](Self::apply) does) so the
    /// caller can dispose of whatever the values refer to, then destroys
    /// the table.
    ///
    /// If `f` stops early the table is still destroyed; entries it did not
    /// reach are dropped without being shown to `f`, and the early exit is
    /// reported so the caller knows some referents were not released.
    pub fn destroy_with_ownership<F>(mut self, f: F) -> Applied
    where
        F: FnMut(&mut Entry<K, V>) -> Visit,
    {
        let outcome = self.apply(f);
        if !outcome.is_completed() {
            tracing::warn!(
                remaining = self.len,
                "teardown stopped before every entry was released"
            );
        }
        self.destroy();
        outcome
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            it: self.slots.iter(),
            remaining: self.len,
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        let remaining = self.len;
        IterMut {
            it: self.slots.iter_mut(),
            remaining,
        }
    }
}

impl<K, V> ProbeMap<K, V>
where
    K: AsRef<[u8]>,
{
    /// Creates an empty map with `capacity` slots.
    ///
    /// Fails with [`Error::InvalidCapacity`] unless `capacity` is a
    /// non-zero power of two.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        if !capacity.is_power_of_two() {
            return Err(Error::InvalidCapacity(capacity));
        }
        let slots = empty_slots(capacity)?;
        tracing::trace!(capacity, "created table");
        Ok(Self { slots, len: 0 })
    }

    /// Searches the probe window of `key`.
    ///
    /// The whole window is checked for the key before any empty slot is
    /// offered, so an update can never be shadowed by a hole that opened
    /// up earlier in the chain.
    pub(crate) fn locate(&self, key: &[u8]) -> Probe {
        let capacity = self.capacity();
        if self.len >= capacity {
            return Probe::Full;
        }
        let start = hash::bucket(key, capacity);

        let mut occupied = 0;
        for i in window(start, capacity) {
            if let Some(entry) = &self.slots[i] {
                occupied += 1;
                if entry.matches(key) {
                    return Probe::Hit(i);
                }
            }
        }

        if occupied < MAX_PROBE {
            if let Some(i) = window(start, capacity).find(|&i| self.slots[i].is_none()) {
                return Probe::Free(i);
            }
        }
        Probe::Full
    }

    /// Index of the slot holding `key`, if any. Empty slots do not end
    /// the walk; only the window bound does.
    fn find(&self, key: &[u8]) -> Option<usize> {
        let start = hash::bucket(key, self.capacity());
        window(start, self.capacity()).find(|&i| {
            self.slots[i]
                .as_ref()
                .map(|e| e.matches(key))
                .unwrap_or(false)
        })
    }

    /// Inserts or updates `key`.
    ///
    /// On update both the value and the stored key are replaced and the
    /// previous value is returned. Grows the table as often as needed to
    /// place a new key; growth failure leaves the map unchanged.
    ///
    /// Fails with [`Error::CapacityOverflow`] without growing when
    /// `MAX_PROBE` other keys already share the key's full 32-bit hash.
    pub fn put(&mut self, key: K, value: V) -> Result<Option<V>> {
        let index = loop {
            match self.locate(key.as_ref()) {
                Probe::Hit(i) | Probe::Free(i) => break i,
                Probe::Full if self.hash_saturated(key.as_ref()) => {
                    return Err(Error::CapacityOverflow)
                }
                Probe::Full => self.grow()?,
            }
        };

        match self.slots[index].replace(Entry::new(key, value)) {
            Some(old) => Ok(Some(old.into_parts().1)),
            None => {
                self.len += 1;
                Ok(None)
            }
        }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        Q: AsRef<[u8]> + ?Sized,
    {
        let i = self.find(key.as_ref())?;
        self.slots[i].as_ref().map(Entry::value)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        Q: AsRef<[u8]> + ?Sized,
    {
        let i = self.find(key.as_ref())?;
        self.slots[i].as_mut().map(Entry::value_mut)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        Q: AsRef<[u8]> + ?Sized,
    {
        self.find(key.as_ref()).is_some()
    }

    /// Removes `key`, returning the stored key and value.
    ///
    /// The slot is simply cleared; no tombstone is needed because no entry
    /// is ever placed outside its window.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        Q: AsRef<[u8]> + ?Sized,
    {
        let i = self.find(key.as_ref())?;
        let entry = self.slots[i].take()?;
        self.len -= 1;
        Some(entry.into_parts())
    }

    pub(crate) fn slots(&self) -> &[Option<Entry<K, V>>] {
        &self.slots
    }

    /// Checks every structural invariant; panics with a description of the
    /// first violation.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        let capacity = self.capacity();
        assert!(capacity.is_power_of_two(), "capacity {capacity}");
        let occupied = self.slots.iter().filter(|s| s.is_some()).count();
        assert_eq!(occupied, self.len, "len must equal occupied slots");

        let mut seen = std::collections::HashSet::new();
        for (i, slot) in self.slots.iter().enumerate() {
            if let Some(e) = slot {
                let home = hash::bucket(e.key_bytes(), capacity);
                let distance = (i + capacity - home) % capacity;
                assert!(distance < MAX_PROBE, "slot {i} is {distance} from home");
                assert!(seen.insert(e.key_bytes().to_vec()), "duplicate key");
            }
        }
    }
}

impl<K, V> fmt::Debug for ProbeMap<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V> IntoIterator for &'a ProbeMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V> IntoIterator for &'a mut ProbeMap<K, V> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// Iterator over entries in slot order.
pub struct Iter<'a, K, V> {
    it: core::slice::Iter<'a, Option<Entry<K, V>>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.it.by_ref().find_map(Option::as_ref)?;
        self.remaining -= 1;
        Some((entry.key(), entry.value()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// Iterator over entries in slot order with mutable values.
pub struct IterMut<'a, K, V> {
    it: core::slice::IterMut<'a, Option<Entry<K, V>>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.it.by_ref().find_map(Option::as_mut)?;
        self.remaining -= 1;
        Some(entry.parts_mut())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}
