//! Blobs: opaque byte buffers handed across the boundary
//!
//! Engine outputs and caller-created buffers share one table and one
//! destruction entry point. An unregistered [`Blob`] is an ordinary owned
//! buffer and frees itself when dropped.

use crate::handle::{BLOB_KIND, HandleTable, RawHandle};
use scwrapper_proc::boundary;
use std::ffi::c_void;
use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Handle to a blob owned by the caller. `0` is the null handle.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct BlobHandle(RawHandle);

impl BlobHandle {
    pub const NULL: BlobHandle = BlobHandle(RawHandle::NULL);

    /// Returns true for the null handle
    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }

    /// Rebuilds a handle from the value a foreign caller passed around.
    pub const fn from_bits(bits: u64) -> Self {
        BlobHandle(RawHandle::from_bits(bits))
    }

    /// Returns the raw handle value.
    pub const fn to_bits(self) -> u64 {
        self.0.to_bits()
    }
}

impl fmt::Debug for BlobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlobHandle({:?})", self.0)
    }
}

/// Owned byte buffer
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Blob {
    data: Vec<u8>,
}

impl Blob {
    /// Wraps an existing buffer without copying it.
    pub fn new(data: Vec<u8>) -> Self {
        Blob { data }
    }

    /// Returns the blob contents.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns the size of the blob in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the blob is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Consumes the blob, returning the buffer.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Moves the blob into the handle table; the caller now owns the handle
    /// and must release it with `DestroyShaderConductorBlob`.
    pub fn into_handle(self) -> BlobHandle {
        BlobHandle(table_mut().insert(self))
    }

    /// Takes a blob back out of the table, invalidating the handle.
    ///
    /// Returns `None` for null, stale or foreign handles.
    pub fn from_handle(handle: BlobHandle) -> Option<Blob> {
        let blob = table_mut().remove(handle.0);
        if blob.is_none() && !handle.is_null() {
            debug_log!("[BLOB] ignoring release of stale handle {:?}", handle);
        }
        blob
    }
}

impl From<Vec<u8>> for Blob {
    fn from(data: Vec<u8>) -> Self {
        Blob::new(data)
    }
}

impl From<&[u8]> for Blob {
    fn from(data: &[u8]) -> Self {
        Blob::new(data.to_vec())
    }
}

impl From<String> for Blob {
    fn from(text: String) -> Self {
        Blob::new(text.into_bytes())
    }
}

impl From<&str> for Blob {
    fn from(text: &str) -> Self {
        Blob::new(text.as_bytes().to_vec())
    }
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blob").field("len", &self.len()).finish()
    }
}

static BLOBS: RwLock<HandleTable<Blob>> = RwLock::new(HandleTable::new(BLOB_KIND));

fn table() -> RwLockReadGuard<'static, HandleTable<Blob>> {
    BLOBS.read().unwrap_or_else(PoisonError::into_inner)
}

fn table_mut() -> RwLockWriteGuard<'static, HandleTable<Blob>> {
    BLOBS.write().unwrap_or_else(PoisonError::into_inner)
}

/// Runs `f` against a live blob.
pub fn with_blob<R>(handle: BlobHandle, f: impl FnOnce(&Blob) -> R) -> Option<R> {
    table().get(handle.0).map(f)
}

/// Number of blobs currently owned by callers
pub fn live_blob_count() -> usize {
    table().len()
}

// ============================================================================
// Exports
// ============================================================================

/// Copies `size` bytes from `data` into a new blob.
///
/// Returns the null handle if `size` is negative, or if `data` is null while
/// `size` is non-zero.
#[boundary]
pub unsafe extern "C" fn CreateShaderConductorBlob(data: *const c_void, size: i32) -> BlobHandle {
    let Ok(len) = usize::try_from(size) else {
        return BlobHandle::NULL;
    };
    if len == 0 {
        return Blob::default().into_handle();
    }
    if data.is_null() {
        return BlobHandle::NULL;
    }
    let bytes = std::slice::from_raw_parts(data as *const u8, len);
    Blob::from(bytes).into_handle()
}

/// Releases a blob. Null, stale and foreign handles are ignored.
#[boundary]
pub unsafe extern "C" fn DestroyShaderConductorBlob(blob: BlobHandle) {
    drop(Blob::from_handle(blob));
}

/// Returns a pointer to the blob contents, valid until the blob is destroyed.
///
/// Returns null for invalid handles.
#[boundary]
pub unsafe extern "C" fn GetShaderConductorBlobData(blob: BlobHandle) -> *const c_void {
    with_blob(blob, |b| b.as_bytes().as_ptr() as *const c_void).unwrap_or(std::ptr::null())
}

/// Returns the blob size in bytes, or 0 for invalid handles.
#[boundary]
pub unsafe extern "C" fn GetShaderConductorBlobSize(blob: BlobHandle) -> i32 {
    with_blob(blob, |b| i32::try_from(b.len()).unwrap_or(i32::MAX)).unwrap_or(0)
}
