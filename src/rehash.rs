//! Growth: doubling the slot array and migrating every entry.
//!
//! Placement is planned before anything moves. The plan records, for each
//! occupied slot, where its entry lands in the larger table; if some entry
//! finds no room in its window the candidate capacity doubles again, up to
//! the 32-bit hash range. Every way growth can fail (capacity limit,
//! allocation) is hit while planning, so a failed grow leaves the table
//! untouched.

use crate::error::{Error, Result};
use crate::hash;
use crate::probe_map::{window, ProbeMap, MAX_PROBE};
use crate::slot::{empty_slots, try_filled_with, Visit};

/// Largest capacity worth growing to. Buckets come from a 32-bit hash, so
/// beyond this point doubling no longer separates keys.
pub(crate) const MAX_CAPACITY: usize = (u32::MAX as usize).saturating_add(1);

struct RehashPlan {
    capacity: usize,
    /// Target index for each source slot; `None` for empty slots.
    targets: Vec<Option<usize>>,
}

impl<K, V> ProbeMap<K, V>
where
    K: AsRef<[u8]>,
{
    /// Doubles capacity (more than once if needed) and moves every entry
    /// into the new slot array.
    pub(crate) fn grow(&mut self) -> Result<()> {
        let old_capacity = self.capacity();
        let len = self.len();
        let plan = self.plan_rehash()?;
        let mut fresh = empty_slots(plan.capacity)?;

        // Each entry is taken out of its source slot as it moves, so no
        // entry is ever referenced from both arrays.
        let migrated = self.sweep(|i, slot| {
            if let Some(target) = plan.targets[i] {
                fresh[target] = slot.take();
            }
            Visit::Remove
        });
        debug_assert!(migrated.is_completed());
        debug_assert!(self.is_empty());

        self.install(fresh, len);
        tracing::debug!(
            old_capacity,
            new_capacity = plan.capacity,
            len,
            "grew table"
        );
        Ok(())
    }

    fn plan_rehash(&self) -> Result<RehashPlan> {
        let mut capacity = self.capacity();
        loop {
            capacity = capacity
                .checked_mul(2)
                .filter(|&c| c <= MAX_CAPACITY)
                .ok_or(Error::CapacityOverflow)?;
            if let Some(targets) = self.place_all(capacity)? {
                return Ok(RehashPlan { capacity, targets });
            }
            tracing::trace!(capacity, "probe window overflow while planning rehash");
        }
    }

    /// True when `MAX_PROBE` stored keys other than `key` share its full
    /// 32-bit hash. They share a home bucket at every capacity, so no
    /// amount of growth can make room for `key`.
    pub(crate) fn hash_saturated(&self, key: &[u8]) -> bool {
        let capacity = self.capacity();
        let target = hash::hash_key(key);
        let twins = window(hash::bucket(key, capacity), capacity)
            .take(capacity)
            .filter_map(|i| self.slots()[i].as_ref())
            .filter(|e| !e.matches(key) && hash::hash_key(e.key_bytes()) == target)
            .count();
        twins >= MAX_PROBE
    }

    /// Places every entry, in slot order, at the first free index of its
    /// window in a table of `capacity` slots. `None` if some window is
    /// already full.
    fn place_all(&self, capacity: usize) -> Result<Option<Vec<Option<usize>>>> {
        let mut taken = try_filled_with(capacity, || false)?;
        let mut targets = try_filled_with(self.capacity(), || None)?;

        for (i, entry) in self.iter_slots() {
            let start = hash::bucket(entry.key_bytes(), capacity);
            match window(start, capacity).find(|&j| !taken[j]) {
                Some(j) => {
                    taken[j] = true;
                    targets[i] = Some(j);
                }
                None => return Ok(None),
            }
        }
        Ok(Some(targets))
    }
}
