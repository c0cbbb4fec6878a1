//! Reflection flattener
//!
//! Exposes a [`ReflectionDesc`] through count + index accessors that only
//! trade in integers and caller-supplied name buffers.
//!
//! Every detail accessor returns an `i32`:
//! * `>= 0`: success; the buffer length (longest name plus terminator) needed
//!   to receive every name of the entry untruncated. A value larger than the
//!   `maxNameLength` the caller passed means at least one name was truncated.
//! * `< 0`: a [`Status`]. All supplied out-parameters are zeroed and all
//!   supplied name buffers receive an empty string.
//!
//! Null out-pointers are skipped. A null name buffer (or `maxNameLength <= 0`)
//! receives nothing, which turns the call into a length query.

use crate::ResultDescription;
use crate::engine::{ReflectionDesc, StageInput, StorageBuffer, UniformBuffer};
use crate::handle::{HandleTable, REFLECTION_KIND, RawHandle};
use scwrapper_proc::boundary;
use std::ffi::c_char;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Handle to the reflection data of a compile result. `0` is the null handle.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct ReflectionHandle(RawHandle);

impl ReflectionHandle {
    pub const NULL: ReflectionHandle = ReflectionHandle(RawHandle::NULL);

    /// Returns true for the null handle
    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }

    /// Rebuilds a handle from the value a foreign caller passed around.
    pub const fn from_bits(bits: u64) -> Self {
        ReflectionHandle(RawHandle::from_bits(bits))
    }

    /// Returns the raw handle value.
    pub const fn to_bits(self) -> u64 {
        self.0.to_bits()
    }
}

impl fmt::Debug for ReflectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReflectionHandle({:?})", self.0)
    }
}

/// Failure codes returned by the detail accessors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Status {
    /// Null result, or a reflection handle that is null or already released
    NoReflection = -1,
    /// An index or dimension outside `0..count`
    IndexOutOfRange = -2,
    /// The accessor panicked; outputs are unspecified
    Internal = -3,
}

impl Status {
    /// Returns the raw code handed to the caller
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Decodes a negative accessor return value.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(Status::NoReflection),
            -2 => Some(Status::IndexOutOfRange),
            -3 => Some(Status::Internal),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::NoReflection => f.write_str("no reflection data"),
            Status::IndexOutOfRange => f.write_str("index out of range"),
            Status::Internal => f.write_str("internal error"),
        }
    }
}

static REFLECTIONS: RwLock<HandleTable<Arc<ReflectionDesc>>> =
    RwLock::new(HandleTable::new(REFLECTION_KIND));

/// Moves reflection data into the table; the returned handle is owned by the
/// `ResultDescription` it gets stored in.
pub fn register(reflection: ReflectionDesc) -> ReflectionHandle {
    let mut table = REFLECTIONS.write().unwrap_or_else(PoisonError::into_inner);
    ReflectionHandle(table.insert(Arc::new(reflection)))
}

/// Releases reflection data. Returns false for null, stale or foreign handles.
pub fn release(handle: ReflectionHandle) -> bool {
    let removed = REFLECTIONS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(handle.0);
    if removed.is_none() && !handle.is_null() {
        debug_log!("[REFLECTION] ignoring release of stale handle {:?}", handle);
    }
    removed.is_some()
}

/// Returns the reflection data behind a live handle.
///
/// Readers keep their own reference, so a concurrent release never frees data
/// that is still being read.
pub fn get(handle: ReflectionHandle) -> Option<Arc<ReflectionDesc>> {
    REFLECTIONS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(handle.0)
        .cloned()
}

/// Number of reflection results currently owned by callers
pub fn live_reflection_count() -> usize {
    REFLECTIONS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .len()
}

unsafe fn lookup(result: *const ResultDescription) -> Option<Arc<ReflectionDesc>> {
    if result.is_null() {
        return None;
    }
    get((*result).reflection)
}

fn nth<T>(items: &[T], index: i32) -> Result<&T, Status> {
    usize::try_from(index)
        .ok()
        .and_then(|i| items.get(i))
        .ok_or(Status::IndexOutOfRange)
}

/// Clamps a native count or size into the boundary's `int`
fn c_int<T: TryInto<i32>>(value: T) -> i32 {
    value.try_into().unwrap_or(i32::MAX)
}

unsafe fn store<T>(out: *mut T, value: T) {
    if !out.is_null() {
        out.write(value);
    }
}

/// Copies `src` into `dst` (capacity `max_len` bytes including the
/// terminator), truncating on a character boundary.
///
/// Returns the capacity needed to hold `src` untruncated.
pub(crate) unsafe fn copy_name(dst: *mut c_char, max_len: i32, src: &str) -> usize {
    let required = src.len() + 1;
    let capacity = match usize::try_from(max_len) {
        Ok(capacity) if capacity > 0 && !dst.is_null() => capacity,
        _ => return required,
    };

    let mut len = src.len().min(capacity - 1);
    while !src.is_char_boundary(len) {
        len -= 1;
    }
    std::ptr::copy_nonoverlapping(src.as_ptr(), dst as *mut u8, len);
    *dst.add(len) = 0;
    required
}

/// Copies several names sharing one `max_len` and returns the largest
/// required capacity.
unsafe fn copy_names(max_len: i32, names: &[(*mut c_char, &str)]) -> usize {
    names
        .iter()
        .map(|&(dst, src)| copy_name(dst, max_len, src))
        .max()
        .unwrap_or(0)
}

/// Turns the outcome of a detail accessor into its return value
fn finish<T>(selected: &Result<T, Status>, required: usize) -> i32 {
    match selected {
        Ok(_) => c_int(required),
        Err(status) => status.code(),
    }
}

// ============================================================================
// Counts
// ============================================================================

/// Number of stage inputs; 0 without reflection data.
#[boundary]
pub unsafe extern "C" fn GetStageInputCount(result: *const ResultDescription) -> i32 {
    lookup(result).map_or(0, |r| c_int(r.stage_inputs.len()))
}

/// Number of uniform buffers; 0 without reflection data.
#[boundary]
pub unsafe extern "C" fn GetUniformBufferCount(result: *const ResultDescription) -> i32 {
    lookup(result).map_or(0, |r| c_int(r.uniform_buffers.len()))
}

/// Number of samplers; 0 without reflection data.
#[boundary]
pub unsafe extern "C" fn GetSamplerCount(result: *const ResultDescription) -> i32 {
    lookup(result).map_or(0, |r| c_int(r.samplers.len()))
}

/// Number of storage buffers; 0 without reflection data.
#[boundary]
pub unsafe extern "C" fn GetStorageBufferCount(result: *const ResultDescription) -> i32 {
    lookup(result).map_or(0, |r| c_int(r.storage_buffers.len()))
}

// ============================================================================
// Details
// ============================================================================

#[boundary(fallback = Status::Internal.code())]
pub unsafe extern "C" fn GetStageInput(
    result: *const ResultDescription,
    stageInputIndex: i32,
    name: *mut c_char,
    maxNameLength: i32,
    location: *mut i32,
    rows: *mut i32,
    columns: *mut i32,
) -> i32 {
    let reflection = lookup(result);
    let selected: Result<&StageInput, Status> = reflection
        .as_deref()
        .ok_or(Status::NoReflection)
        .and_then(|r| nth(&r.stage_inputs, stageInputIndex));
    let entry = selected.as_ref().ok();

    store(location, entry.map_or(0, |e| c_int(e.location)));
    store(rows, entry.map_or(0, |e| c_int(e.rows)));
    store(columns, entry.map_or(0, |e| c_int(e.columns)));
    let required = copy_names(maxNameLength, &[(name, entry.map_or("", |e| e.name.as_str()))]);
    finish(&selected, required)
}

#[boundary(fallback = Status::Internal.code())]
pub unsafe extern "C" fn GetUniformBuffer(
    result: *const ResultDescription,
    bufferIndex: i32,
    blockName: *mut c_char,
    instanceName: *mut c_char,
    maxNameLength: i32,
    byteSize: *mut i32,
    slot: *mut i32,
    parameterCount: *mut i32,
) -> i32 {
    let reflection = lookup(result);
    let selected: Result<&UniformBuffer, Status> = reflection
        .as_deref()
        .ok_or(Status::NoReflection)
        .and_then(|r| nth(&r.uniform_buffers, bufferIndex));
    let entry = selected.as_ref().ok();

    store(byteSize, entry.map_or(0, |e| c_int(e.byte_size)));
    store(slot, entry.map_or(0, |e| c_int(e.slot)));
    store(parameterCount, entry.map_or(0, |e| c_int(e.parameters.len())));
    let required = copy_names(
        maxNameLength,
        &[
            (blockName, entry.map_or("", |e| e.block_name.as_str())),
            (instanceName, entry.map_or("", |e| e.instance_name.as_str())),
        ],
    );
    finish(&selected, required)
}

#[boundary(fallback = Status::Internal.code())]
pub unsafe extern "C" fn GetParameter(
    result: *const ResultDescription,
    bufferIndex: i32,
    parameterIndex: i32,
    name: *mut c_char,
    maxNameLength: i32,
    r#type: *mut i32,
    rows: *mut i32,
    columns: *mut i32,
    byteOffset: *mut i32,
    arrayDimensions: *mut i32,
) -> i32 {
    let reflection = lookup(result);
    let selected = reflection
        .as_deref()
        .ok_or(Status::NoReflection)
        .and_then(|r| nth(&r.uniform_buffers, bufferIndex))
        .and_then(|b| nth(&b.parameters, parameterIndex));
    let entry = selected.as_ref().ok();

    store(r#type, entry.map_or(0, |e| e.ty as i32));
    store(rows, entry.map_or(0, |e| c_int(e.rows)));
    store(columns, entry.map_or(0, |e| c_int(e.columns)));
    store(byteOffset, entry.map_or(0, |e| c_int(e.byte_offset)));
    store(arrayDimensions, entry.map_or(0, |e| c_int(e.array_dimensions())));
    let required = copy_names(maxNameLength, &[(name, entry.map_or("", |e| e.name.as_str()))]);
    finish(&selected, required)
}

/// Size of one array dimension of a parameter. Returns 0 on success.
#[boundary(fallback = Status::Internal.code())]
pub unsafe extern "C" fn GetParameterArraySize(
    result: *const ResultDescription,
    bufferIndex: i32,
    parameterIndex: i32,
    dimension: i32,
    arraySize: *mut i32,
) -> i32 {
    let reflection = lookup(result);
    let selected = reflection
        .as_deref()
        .ok_or(Status::NoReflection)
        .and_then(|r| nth(&r.uniform_buffers, bufferIndex))
        .and_then(|b| nth(&b.parameters, parameterIndex))
        .and_then(|p| nth(&p.array_sizes, dimension));

    store(arraySize, selected.as_ref().map_or(0, |&&size| c_int(size)));
    finish(&selected, 0)
}

#[boundary(fallback = Status::Internal.code())]
pub unsafe extern "C" fn GetSampler(
    result: *const ResultDescription,
    samplerIndex: i32,
    name: *mut c_char,
    originalName: *mut c_char,
    textureName: *mut c_char,
    maxNameLength: i32,
    r#type: *mut i32,
    slot: *mut i32,
    textureSlot: *mut i32,
) -> i32 {
    let reflection = lookup(result);
    let selected = reflection
        .as_deref()
        .ok_or(Status::NoReflection)
        .and_then(|r| nth(&r.samplers, samplerIndex));
    let entry = selected.as_ref().ok();

    store(r#type, entry.map_or(0, |e| e.ty as i32));
    store(slot, entry.map_or(0, |e| c_int(e.slot)));
    store(textureSlot, entry.map_or(0, |e| c_int(e.texture_slot)));
    let required = copy_names(
        maxNameLength,
        &[
            (name, entry.map_or("", |e| e.name.as_str())),
            (originalName, entry.map_or("", |e| e.original_name.as_str())),
            (textureName, entry.map_or("", |e| e.texture_name.as_str())),
        ],
    );
    finish(&selected, required)
}

#[boundary(fallback = Status::Internal.code())]
pub unsafe extern "C" fn GetStorageBuffer(
    result: *const ResultDescription,
    bufferIndex: i32,
    blockName: *mut c_char,
    instanceName: *mut c_char,
    maxNameLength: i32,
    byteSize: *mut i32,
    slot: *mut i32,
    readOnly: *mut bool,
) -> i32 {
    let reflection = lookup(result);
    let selected: Result<&StorageBuffer, Status> = reflection
        .as_deref()
        .ok_or(Status::NoReflection)
        .and_then(|r| nth(&r.storage_buffers, bufferIndex));
    let entry = selected.as_ref().ok();

    store(byteSize, entry.map_or(0, |e| c_int(e.byte_size)));
    store(slot, entry.map_or(0, |e| c_int(e.slot)));
    store(readOnly, entry.is_some_and(|e| e.read_only));
    let required = copy_names(
        maxNameLength,
        &[
            (blockName, entry.map_or("", |e| e.block_name.as_str())),
            (instanceName, entry.map_or("", |e| e.instance_name.as_str())),
        ],
    );
    finish(&selected, required)
}

/// Releases reflection data returned by `Compile`.
///
/// Prefer `DestroyShaderConductorResult`, which also clears the handle stored
/// in the result. Null, stale and foreign handles are ignored.
#[boundary]
pub unsafe extern "C" fn DestroyShaderConductorReflection(reflection: ReflectionHandle) {
    release(reflection);
}
