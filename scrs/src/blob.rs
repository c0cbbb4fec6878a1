//! RAII wrapper for wrapper-owned blobs

use crate::{Error, Result};
use scwrapper::{
    BlobHandle, CreateShaderConductorBlob, DestroyShaderConductorBlob, GetShaderConductorBlobData,
    GetShaderConductorBlobSize,
};
use std::ops::Deref;
use std::slice;

/// RAII wrapper for a blob handle
///
/// Provides safe access to blob data and automatic cleanup via Drop.
/// When dropped, the blob is released with `DestroyShaderConductorBlob`.
pub struct Blob {
    handle: BlobHandle,
}

impl Blob {
    /// Takes ownership of a blob handle.
    ///
    /// Returns `None` for the null handle.
    pub(crate) fn from_handle(handle: BlobHandle) -> Option<Self> {
        if handle.is_null() {
            None
        } else {
            Some(Blob { handle })
        }
    }

    /// Creates a new blob holding a copy of `data`.
    pub fn new(data: &[u8]) -> Result<Self> {
        let size = i32::try_from(data.len()).map_err(|_| {
            Error::InvalidParameter(format!("blob of {} bytes is too large", data.len()))
        })?;
        let handle = unsafe { CreateShaderConductorBlob(data.as_ptr() as *const _, size) };
        Self::from_handle(handle)
            .ok_or_else(|| Error::InvalidParameter("blob creation failed".to_string()))
    }

    /// Returns the blob data as a byte slice.
    pub fn as_bytes(&self) -> &[u8] {
        unsafe {
            let size = GetShaderConductorBlobSize(self.handle);
            let ptr = GetShaderConductorBlobData(self.handle) as *const u8;
            if ptr.is_null() || size <= 0 {
                return &[];
            }
            // The data stays put until this blob is released in Drop
            slice::from_raw_parts(ptr, size as usize)
        }
    }

    /// Returns the size of the blob in bytes.
    pub fn len(&self) -> usize {
        unsafe { GetShaderConductorBlobSize(self.handle) as usize }
    }

    /// Returns true if the blob is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Interprets the blob as a UTF-8 string.
    ///
    /// Useful for diagnostics and text targets.
    /// Trailing null bytes are trimmed.
    pub fn as_str(&self) -> Result<&str> {
        std::str::from_utf8(trim_nulls(self.as_bytes())).map_err(Into::into)
    }

    /// Converts the blob to a String, trimming trailing nulls and replacing
    /// invalid UTF-8 sequences.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(trim_nulls(self.as_bytes())).into_owned()
    }

    /// Returns the raw handle.
    pub fn handle(&self) -> BlobHandle {
        self.handle
    }
}

fn trim_nulls(bytes: &[u8]) -> &[u8] {
    bytes
        .iter()
        .rposition(|&b| b != 0)
        .map(|i| &bytes[..=i])
        .unwrap_or(&[])
}

impl Drop for Blob {
    fn drop(&mut self) {
        unsafe { DestroyShaderConductorBlob(self.handle) }
    }
}

impl Deref for Blob {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.as_bytes()
    }
}

impl AsRef<[u8]> for Blob {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl std::fmt::Debug for Blob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Blob")
            .field("len", &self.len())
            .field("handle", &self.handle)
            .finish()
    }
}
