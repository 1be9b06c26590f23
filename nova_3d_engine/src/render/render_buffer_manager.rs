/// RenderBufferManager - N-slot mailbox between the game and render threads.
///
/// The producer (game thread) claims a slot, fills a `RenderState` in place
/// and publishes it; the consumer (render thread) claims the most recently
/// published slot, reads it and releases it.
///
/// All index state lives in one packed `AtomicU64`:
///
/// | bits    | field                          |
/// |---------|--------------------------------|
/// | 0..8    | published slot (`0xFF` = none) |
/// | 8..16   | slot held by the reader        |
/// | 16..24  | slot held by the writer        |
/// | 24..64  | publish sequence number        |
///
/// Every transition (write-claim, publish, read-claim, release) is a single
/// compare-and-swap, so the reader never sees a half-updated index pair.
///
/// The writer only claims a slot that is neither the latest published slot
/// nor the one being read. With two slots and the reader holding the older
/// one, no slot qualifies and `acquire_write_slot` returns `None`: the frame
/// is dropped rather than blocking the producer. Three slots always leave
/// one free. With a single slot, writer and reader exclude each other.
///
/// Each slot also sits behind a `Mutex`; the index protocol guarantees the
/// lock is never contended, it only hands out `&mut RenderState` safely.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use super::render_state::RenderState;

const SOURCE: &str = "nova3d::RenderBufferManager";

const NONE: u64 = 0xFF;
const NO_FRAME: u64 = u64::MAX;

/// Supported slot counts.
pub const MIN_SLOTS: usize = 1;
pub const MAX_SLOTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct IndexState {
    published: u64,
    reading: u64,
    writing: u64,
    sequence: u64,
}

impl IndexState {
    fn unpack(bits: u64) -> Self {
        Self {
            published: bits & 0xFF,
            reading: (bits >> 8) & 0xFF,
            writing: (bits >> 16) & 0xFF,
            sequence: bits >> 24,
        }
    }

    fn pack(self) -> u64 {
        self.published | (self.reading << 8) | (self.writing << 16) | (self.sequence << 24)
    }
}

pub struct RenderBufferManager {
    slots: Vec<Mutex<RenderState>>,
    state: AtomicU64,
    published_frame: AtomicU64,
}

impl RenderBufferManager {
    /// Create a manager with `slot_count` slots, clamped to 1..=3.
    pub fn new(slot_count: usize) -> Self {
        let count = slot_count.clamp(MIN_SLOTS, MAX_SLOTS);
        if count != slot_count {
            crate::engine_warn!(SOURCE, "Slot count {} clamped to {}", slot_count, count);
        }
        let initial = IndexState { published: NONE, reading: NONE, writing: NONE, sequence: 0 };
        Self {
            slots: (0..count).map(|_| Mutex::new(RenderState::default())).collect(),
            state: AtomicU64::new(initial.pack()),
            published_frame: AtomicU64::new(NO_FRAME),
        }
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of publishes so far.
    pub fn published_sequence(&self) -> u64 {
        IndexState::unpack(self.state.load(Ordering::Acquire)).sequence
    }

    /// `frame_index` of the latest published state.
    pub fn published_frame(&self) -> Option<u64> {
        match self.published_frame.load(Ordering::Acquire) {
            NO_FRAME => None,
            frame => Some(frame),
        }
    }

    /// Slot the reader may currently claim.
    pub fn published_slot(&self) -> Option<usize> {
        let state = IndexState::unpack(self.state.load(Ordering::Acquire));
        (state.published != NONE).then_some(state.published as usize)
    }

    fn lock_slot(&self, index: usize) -> MutexGuard<'_, RenderState> {
        // A panic while filling a slot leaves plain data behind; keep using it
        self.slots[index].lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `transition` with a CAS loop. `None` from the closure aborts.
    fn update<F>(&self, mut transition: F) -> Option<IndexState>
    where
        F: FnMut(IndexState) -> Option<IndexState>,
    {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            let next = transition(IndexState::unpack(current))?;
            match self.state.compare_exchange_weak(current, next.pack(), Ordering::AcqRel, Ordering::Acquire) {
                Ok(_) => return Some(next),
                Err(actual) => current = actual,
            }
        }
    }

    /// Claim a slot to fill. Returns `None` when another write is in
    /// progress or when every slot is either published or being read.
    pub fn acquire_write_slot(&self) -> Option<WriteSlot<'_>> {
        let count = self.slots.len() as u64;
        let claimed = self.update(|state| {
            if state.writing != NONE {
                return None;
            }
            let free = (0..count).find(|&i| {
                i != state.reading && (count == 1 || i != state.published)
            })?;
            Some(IndexState { writing: free, ..state })
        });

        let Some(claimed) = claimed else {
            crate::engine_trace!(SOURCE, "No free slot, snapshot dropped");
            return None;
        };
        let index = claimed.writing as usize;
        let mut guard = self.lock_slot(index);
        guard.clear();
        Some(WriteSlot {
            guard,
            release: WriteRelease { manager: self, index, published_frame: None },
        })
    }

    /// Claim the latest published slot for reading. Returns `None` when
    /// nothing was published yet or a read is already in progress.
    pub fn acquire_read_slot(&self) -> Option<ReadSlot<'_>> {
        let single = self.slots.len() == 1;
        let claimed = self.update(|state| {
            if state.published == NONE || state.reading != NONE {
                return None;
            }
            if single && state.writing == state.published {
                return None;
            }
            Some(IndexState { reading: state.published, ..state })
        })?;

        let index = claimed.reading as usize;
        Some(ReadSlot {
            guard: self.lock_slot(index),
            release: ReadRelease { manager: self, index },
            sequence: claimed.sequence,
        })
    }
}

impl std::fmt::Debug for RenderBufferManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderBufferManager")
            .field("slots", &self.slots.len())
            .field("state", &IndexState::unpack(self.state.load(Ordering::Acquire)))
            .finish()
    }
}

// ============================================================================
// Write guard
// ============================================================================

/// Index bookkeeping for a write claim; runs after the slot lock is gone.
struct WriteRelease<'a> {
    manager: &'a RenderBufferManager,
    index: usize,
    /// Frame index of the filled state, set by `publish`
    published_frame: Option<u64>,
}

impl Drop for WriteRelease<'_> {
    fn drop(&mut self) {
        let index = self.index as u64;
        let publish = self.published_frame.is_some();
        self.manager.update(|state| {
            Some(IndexState {
                published: if publish { index } else { state.published },
                writing: NONE,
                sequence: if publish { state.sequence + 1 } else { state.sequence },
                ..state
            })
        });
        match self.published_frame {
            // Only after the slot is readable
            Some(frame) => self.manager.published_frame.store(frame, Ordering::Release),
            None => crate::engine_trace!(SOURCE, "Write slot {} abandoned", self.index),
        }
    }
}

/// Exclusive access to a slot being filled. Dropping it without
/// `publish` abandons the write and keeps the previous publication.
pub struct WriteSlot<'a> {
    // Field order matters: the lock is released before the index update
    guard: MutexGuard<'a, RenderState>,
    release: WriteRelease<'a>,
}

impl<'a> WriteSlot<'a> {
    pub fn slot_index(&self) -> usize {
        self.release.index
    }

    /// Make the filled state visible to the reader.
    pub fn publish(self) {
        let WriteSlot { guard, mut release } = self;
        release.published_frame = Some(guard.frame_index);
        drop(guard);
    }
}

impl Deref for WriteSlot<'_> {
    type Target = RenderState;

    fn deref(&self) -> &RenderState {
        &self.guard
    }
}

impl DerefMut for WriteSlot<'_> {
    fn deref_mut(&mut self) -> &mut RenderState {
        &mut self.guard
    }
}

// ============================================================================
// Read guard
// ============================================================================

struct ReadRelease<'a> {
    manager: &'a RenderBufferManager,
    index: usize,
}

impl Drop for ReadRelease<'_> {
    fn drop(&mut self) {
        self.manager.update(|state| Some(IndexState { reading: NONE, ..state }));
    }
}

/// Shared access to the latest published state. Released on drop.
pub struct ReadSlot<'a> {
    guard: MutexGuard<'a, RenderState>,
    release: ReadRelease<'a>,
    sequence: u64,
}

impl<'a> ReadSlot<'a> {
    pub fn slot_index(&self) -> usize {
        self.release.index
    }

    /// Publish sequence number this slot was claimed at.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn release(self) {}
}

impl Deref for ReadSlot<'_> {
    type Target = RenderState;

    fn deref(&self) -> &RenderState {
        &self.guard
    }
}

#[cfg(test)]
#[path = "render_buffer_manager_tests.rs"]
mod tests;
