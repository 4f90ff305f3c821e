// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Generational slot arena with free-list reuse.
//!
//! Nodes and object handles of one tree each live in their own arena. Freed
//! slots are reused; reuse bumps the slot generation so old handles go stale
//! instead of aliasing the new occupant.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::marker::PhantomData;

/// A `(slot, generation)` handle into an [`Arena`].
pub(crate) trait ArenaKey: Copy + Debug + Eq {
    fn from_parts(idx: u32, generation: u32) -> Self;
    fn idx(self) -> usize;
    fn generation(self) -> u32;
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

pub(crate) struct Arena<K, T> {
    slots: Vec<Slot<T>>,
    free_list: Vec<usize>,
    live: usize,
    _k: PhantomData<K>,
}

impl<K, T> Default for Arena<K, T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            live: 0,
            _k: PhantomData,
        }
    }
}

impl<K: ArenaKey, T> Arena<K, T> {
    /// Store `value` and return its handle.
    pub(crate) fn alloc(&mut self, value: T) -> K {
        self.live += 1;
        if let Some(idx) = self.free_list.pop() {
            let slot = &mut self.slots[idx];
            slot.generation = slot.generation.saturating_add(1);
            slot.value = Some(value);
            return K::from_parts(Self::slot_idx(idx), slot.generation);
        }
        let generation = 1_u32;
        self.slots.push(Slot {
            generation,
            value: Some(value),
        });
        K::from_parts(Self::slot_idx(self.slots.len() - 1), generation)
    }

    /// Release the slot behind `key`, returning its value. Stale keys yield `None`.
    pub(crate) fn free(&mut self, key: K) -> Option<T> {
        let slot = self.slots.get_mut(key.idx())?;
        if slot.generation != key.generation() {
            return None;
        }
        let value = slot.value.take()?;
        self.free_list.push(key.idx());
        self.live -= 1;
        Some(value)
    }

    pub(crate) fn get(&self, key: K) -> Option<&T> {
        let slot = self.slots.get(key.idx())?;
        if slot.generation != key.generation() {
            return None;
        }
        slot.value.as_ref()
    }

    pub(crate) fn get_mut(&mut self, key: K) -> Option<&mut T> {
        let slot = self.slots.get_mut(key.idx())?;
        if slot.generation != key.generation() {
            return None;
        }
        slot.value.as_mut()
    }

    pub(crate) fn contains(&self, key: K) -> bool {
        self.get(key).is_some()
    }

    /// Number of live values.
    pub(crate) fn len(&self) -> usize {
        self.live
    }

    /// Free every slot except `keep`. Generations persist, so all other handles go stale.
    pub(crate) fn retain_only(&mut self, keep: Option<K>) {
        self.free_list.clear();
        self.live = 0;
        for (idx, slot) in self.slots.iter_mut().enumerate() {
            let kept = keep.is_some_and(|k| k.idx() == idx && k.generation() == slot.generation);
            if kept && slot.value.is_some() {
                self.live += 1;
            } else {
                slot.value = None;
                self.free_list.push(idx);
            }
        }
        // Hand out low slots first, as a fresh arena would.
        self.free_list.reverse();
    }

    /// Iterate live `(key, value)` pairs in slot order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (K, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(idx, slot)| {
            slot.value
                .as_ref()
                .map(|v| (K::from_parts(Self::slot_idx(idx), slot.generation), v))
        })
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "Handles are intentionally 32-bit; arenas never grow past u32::MAX slots."
    )]
    const fn slot_idx(idx: usize) -> u32 {
        idx as u32
    }
}
