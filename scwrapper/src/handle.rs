//! Generational handle tables
//!
//! Objects that cross the boundary (blobs, reflection results) live in a
//! table and are referred to by a 64-bit handle: the low 32 bits are the slot
//! index, the next 24 bits are the slot's generation and the top 8 bits name
//! the table that issued it. Releasing an object bumps the generation of its
//! slot, so a stale or forged handle is rejected instead of being
//! reinterpreted as a pointer. A handle from one table never resolves in
//! another.

use std::fmt;

const INDEX_BITS: u32 = 32;
const GENERATION_BITS: u32 = 24;
const GENERATION_MASK: u32 = (1 << GENERATION_BITS) - 1;

/// Table tag of blob handles
pub const BLOB_KIND: u8 = 1;
/// Table tag of reflection handles
pub const REFLECTION_KIND: u8 = 2;

/// Untyped handle value as it crosses the boundary. `0` is the null handle.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct RawHandle(u64);

impl RawHandle {
    /// The null handle; never refers to a live object
    pub const NULL: RawHandle = RawHandle(0);

    const fn new(kind: u8, index: u32, generation: u32) -> Self {
        RawHandle(
            ((kind as u64) << (INDEX_BITS + GENERATION_BITS))
                | (((generation & GENERATION_MASK) as u64) << INDEX_BITS)
                | index as u64,
        )
    }

    /// Rebuilds a handle from its raw bits.
    pub const fn from_bits(bits: u64) -> Self {
        RawHandle(bits)
    }

    /// Returns the raw bits of the handle.
    pub const fn to_bits(self) -> u64 {
        self.0
    }

    /// Returns true for the null handle
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    fn index(self) -> usize {
        (self.0 & 0xFFFF_FFFF) as usize
    }

    fn generation(self) -> u32 {
        (self.0 >> INDEX_BITS) as u32 & GENERATION_MASK
    }

    /// Tag of the table that issued the handle
    pub const fn kind(self) -> u8 {
        (self.0 >> (INDEX_BITS + GENERATION_BITS)) as u8
    }
}

impl fmt::Debug for RawHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("RawHandle(null)")
        } else {
            write!(
                f,
                "RawHandle({}:{}v{})",
                self.kind(),
                self.index(),
                self.generation()
            )
        }
    }
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Slot arena handing out generation-checked handles
pub struct HandleTable<T> {
    kind: u8,
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    live: usize,
}

impl<T> HandleTable<T> {
    /// Creates an empty table whose handles carry `kind`.
    ///
    /// `kind` must be non-zero and unique per table.
    pub const fn new(kind: u8) -> Self {
        HandleTable {
            kind,
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Stores a value and returns the handle that now owns it.
    ///
    /// Returns the null handle, dropping `value`, once every 32-bit index is
    /// in use.
    pub fn insert(&mut self, value: T) -> RawHandle {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            self.live += 1;
            return RawHandle::new(self.kind, index, slot.generation);
        }

        let Ok(index) = u32::try_from(self.slots.len()) else {
            return RawHandle::NULL;
        };
        // Generations start at 1 so that slot 0 never produces the null handle
        self.slots.push(Slot {
            generation: 1,
            value: Some(value),
        });
        self.live += 1;
        RawHandle::new(self.kind, index, 1)
    }

    /// Returns the value behind a live handle.
    pub fn get(&self, handle: RawHandle) -> Option<&T> {
        let slot = self.live_slot(handle)?;
        slot.value.as_ref()
    }

    /// Removes the value behind a live handle, invalidating the handle.
    ///
    /// Returns `None` for null, stale or foreign handles.
    pub fn remove(&mut self, handle: RawHandle) -> Option<T> {
        if self.live_slot(handle).is_none() {
            return None;
        }
        let index = handle.index();
        let slot = &mut self.slots[index];
        let value = slot.value.take()?;

        slot.generation = match slot.generation.wrapping_add(1) & GENERATION_MASK {
            0 => 1,
            next => next,
        };
        self.free.push(index as u32);
        self.live -= 1;
        Some(value)
    }

    /// Returns true if the handle refers to a live value
    pub fn contains(&self, handle: RawHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Number of live values
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns true if the table holds no live values
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    fn live_slot(&self, handle: RawHandle) -> Option<&Slot<T>> {
        if handle.is_null() || handle.kind() != self.kind {
            return None;
        }
        self.slots
            .get(handle.index())
            .filter(|slot| slot.generation == handle.generation() && slot.value.is_some())
    }
}
