//! Concurrent per-frame vertex cache.
//!
//! The patch mesher runs many patches in parallel; two patches on either
//! side of a shared edge or corner look up the same [`VertexId`] and must
//! agree on a single materialized vertex. [`VertexCache`] guarantees that
//! happens: the first caller to see an identity computes the vertex once,
//! every later (or concurrently blocked) caller gets the same stable slot.

use std::sync::RwLock;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use nebula_identity::VertexId;

/// A stable index into a frame's dense vertex array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Slot(pub u32);

/// A fully materialized vertex: world position, normal, texture
/// coordinate, and the set of faces that have referenced it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VertexRecord {
    pub id: VertexId,
    pub world_pos: [f64; 3],
    pub normal: [f64; 3],
    pub tex_uv: [f32; 2],
    pub face_mask: u8,
}

/// The error a failed `get_or_create` call can return.
///
/// `Producer` is the materializing caller's own producer failing (the
/// caller should treat this as fatal for the current frame); `Poisoned`
/// is every other caller that subsequently asks for the same identity
/// while its entry is marked failed — they never re-run the producer.
#[derive(Debug)]
pub enum CacheError<E> {
    Producer(E),
    Poisoned,
}

#[derive(Clone, Copy)]
enum SlotState {
    Ready(Slot),
    Poisoned,
}

/// Concurrent `VertexId -> Slot` map backed by a dense, append-only record
/// array.
///
/// `get_or_create` materializes at most once per identity: dashmap's
/// per-shard entry lock means a second caller racing on the same id within
/// the same shard blocks on `Entry::Vacant` until the first caller's
/// `producer` returns and the record is pushed, then observes the
/// `Entry::Occupied` slot instead of re-running `producer`. Callers on
/// different shards race freely, which is the "fine-grained per-bucket
/// lock" granularity the concurrency model asks for, not a single global
/// mutex.
pub struct VertexCache {
    slots: DashMap<VertexId, SlotState>,
    records: RwLock<Vec<VertexRecord>>,
}

impl VertexCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: DashMap::new(),
            records: RwLock::new(Vec::new()),
        }
    }

    /// Look up or materialize the vertex for `id`.
    ///
    /// `face_bit` is OR-merged into the record's `face_mask` on every
    /// successful call, hit or miss, so a vertex already materialized by
    /// one patch still picks up the bit for every other patch that
    /// subsequently references it. `producer` only ever runs for the
    /// single call that wins the race to create `id`'s entry.
    ///
    /// If `producer` fails, the entry is marked poisoned rather than
    /// removed: the materializing call gets back its own
    /// `CacheError::Producer(e)`, and every other call racing on (or
    /// arriving after) the same identity gets `CacheError::Poisoned`
    /// without re-running `producer`. Poisoning clears only at the next
    /// `clear()`/non-retaining `begin_frame()`.
    pub fn get_or_create<F, E>(
        &self,
        id: VertexId,
        face_bit: u8,
        producer: F,
    ) -> Result<Slot, CacheError<E>>
    where
        F: FnOnce() -> Result<VertexRecord, E>,
    {
        let state = match self.slots.entry(id) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => match producer() {
                Ok(record) => {
                    let mut records = self
                        .records
                        .write()
                        .expect("vertex cache record lock poisoned");
                    let slot = Slot(records.len() as u32);
                    records.push(record);
                    drop(records);
                    *entry.insert(SlotState::Ready(slot))
                }
                Err(e) => {
                    entry.insert(SlotState::Poisoned);
                    return Err(CacheError::Producer(e));
                }
            },
        };

        match state {
            SlotState::Ready(slot) => {
                self.merge_face_mask(slot, face_bit);
                Ok(slot)
            }
            SlotState::Poisoned => Err(CacheError::Poisoned),
        }
    }

    fn merge_face_mask(&self, slot: Slot, face_bit: u8) {
        let mut records = self
            .records
            .write()
            .expect("vertex cache record lock poisoned");
        records[slot.0 as usize].face_mask |= face_bit;
    }

    /// A stable copy of the materialized record at `slot`.
    ///
    /// Returns an owned [`VertexRecord`] rather than a reference: the
    /// backing array lives behind an `RwLock` so it can grow safely from
    /// any worker, and the record itself is small and `Copy`, so handing
    /// out a copy costs nothing a borrow wouldn't and avoids holding the
    /// lock open across the caller's use of it.
    #[must_use]
    pub fn vertex(&self, slot: Slot) -> VertexRecord {
        self.records.read().expect("vertex cache record lock poisoned")[slot.0 as usize]
    }

    /// Number of distinct vertices materialized so far this frame.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().expect("vertex cache record lock poisoned").len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached identity (including poisoned ones) and record.
    pub fn clear(&self) {
        self.slots.clear();
        self.records
            .write()
            .expect("vertex cache record lock poisoned")
            .clear();
    }

    /// Called by the owning frame before meshing starts.
    ///
    /// Only clears when `keep_across_frames` is false; retaining the cache
    /// trades memory for skipping re-materialization of vertices whose
    /// patches didn't change level this frame.
    pub fn begin_frame(&self, keep_across_frames: bool) {
        if !keep_across_frames {
            self.clear();
        }
    }

    /// A snapshot of the dense vertex array in slot order, suitable for
    /// handing to the mesh assembler.
    #[must_use]
    pub fn snapshot(&self) -> Vec<VertexRecord> {
        self.records.read().expect("vertex cache record lock poisoned").clone()
    }
}

impl Default for VertexCache {
    fn default() -> Self {
        Self::new()
    }
}
