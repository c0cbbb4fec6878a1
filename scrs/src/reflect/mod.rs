//! Shader reflection API
//!
//! Safe access to the resource interface of a compiled shader: stage inputs,
//! uniform buffers (with their parameters), samplers and storage buffers.
//! Every record is read through the wrapper's flattened accessors and copied
//! into owned Rust values.
//!
//! # Example
//! ```no_run
//! use scrs::{CompileBuilder, ShaderStage, Target};
//!
//! let output = CompileBuilder::new(
//!     r#"
//!     cbuffer Constants : register(b0) {
//!         float4x4 worldViewProj;
//!     };
//!     float4 main(float4 pos : POSITION) : SV_Position {
//!         return mul(pos, worldViewProj);
//!     }
//!     "#,
//!     "main",
//!     ShaderStage::Vertex,
//! )
//! .target(Target::GLSL_450)
//! .compile()
//! .unwrap();
//!
//! let reflection = output.reflection.unwrap();
//! for cb in reflection.uniform_buffers() {
//!     println!("UB: {} ({} bytes) at slot {}", cb.block_name, cb.byte_size, cb.slot);
//!     for parameter in &cb.parameters {
//!         println!("  {} @ {}", parameter.name, parameter.byte_offset);
//!     }
//! }
//! ```

mod sampler;
mod stage_input;
mod storage_buffer;
mod uniform_buffer;

pub use scwrapper::{
    Parameter, ReflectionDesc, Sampler, ScalarType, StageInput, StorageBuffer, TextureDimension,
    UniformBuffer,
};

use crate::{Error, Result, StatusCode};
use scwrapper::{
    DestroyShaderConductorReflection, GetSamplerCount, GetStageInputCount, GetStorageBufferCount,
    GetUniformBufferCount, ReflectionHandle, ResultDescription,
};
use std::ffi::{CStr, c_char};
use std::fmt;

/// Name buffer size used for the first attempt of every accessor
const INITIAL_NAME_CAPACITY: usize = 32;

/// RAII owner of the reflection data of a compile result
///
/// When dropped, the data is released with `DestroyShaderConductorReflection`.
pub struct Reflection {
    raw: ResultDescription,
}

impl Reflection {
    /// Takes ownership of a reflection handle.
    ///
    /// Returns `None` for the null handle.
    pub(crate) fn from_handle(handle: ReflectionHandle) -> Option<Self> {
        if handle.is_null() {
            return None;
        }
        Some(Reflection {
            raw: ResultDescription {
                reflection: handle,
                ..ResultDescription::null()
            },
        })
    }

    /// Returns the raw handle.
    pub fn handle(&self) -> ReflectionHandle {
        self.raw.reflection
    }

    /// The result the accessors are called with; it owns nothing but the
    /// reflection handle.
    pub(crate) fn raw(&self) -> *const ResultDescription {
        &self.raw
    }

    /// Gets the number of stage inputs.
    pub fn stage_input_count(&self) -> u32 {
        unsigned(unsafe { GetStageInputCount(self.raw()) })
    }

    /// Gets a stage input by index.
    pub fn stage_input(&self, index: u32) -> Result<StageInput> {
        stage_input::get_stage_input(self, index)
    }

    /// Returns an iterator over stage inputs.
    pub fn stage_inputs(&self) -> ReflectionIter<'_, StageInput> {
        ReflectionIter::new(self, self.stage_input_count(), Reflection::stage_input)
    }

    /// Gets the number of uniform buffers.
    pub fn uniform_buffer_count(&self) -> u32 {
        unsigned(unsafe { GetUniformBufferCount(self.raw()) })
    }

    /// Gets a uniform buffer, including all of its parameters, by index.
    pub fn uniform_buffer(&self, index: u32) -> Result<UniformBuffer> {
        uniform_buffer::get_uniform_buffer(self, index)
    }

    /// Gets a single parameter of a uniform buffer.
    pub fn parameter(&self, buffer_index: u32, parameter_index: u32) -> Result<Parameter> {
        uniform_buffer::get_parameter(self, buffer_index, parameter_index)
    }

    /// Returns an iterator over uniform buffers.
    pub fn uniform_buffers(&self) -> ReflectionIter<'_, UniformBuffer> {
        ReflectionIter::new(self, self.uniform_buffer_count(), Reflection::uniform_buffer)
    }

    /// Gets the number of samplers.
    pub fn sampler_count(&self) -> u32 {
        unsigned(unsafe { GetSamplerCount(self.raw()) })
    }

    /// Gets a sampler by index.
    pub fn sampler(&self, index: u32) -> Result<Sampler> {
        sampler::get_sampler(self, index)
    }

    /// Returns an iterator over samplers.
    pub fn samplers(&self) -> ReflectionIter<'_, Sampler> {
        ReflectionIter::new(self, self.sampler_count(), Reflection::sampler)
    }

    /// Gets the number of storage buffers.
    pub fn storage_buffer_count(&self) -> u32 {
        unsigned(unsafe { GetStorageBufferCount(self.raw()) })
    }

    /// Gets a storage buffer by index.
    pub fn storage_buffer(&self, index: u32) -> Result<StorageBuffer> {
        storage_buffer::get_storage_buffer(self, index)
    }

    /// Returns an iterator over storage buffers.
    pub fn storage_buffers(&self) -> ReflectionIter<'_, StorageBuffer> {
        ReflectionIter::new(self, self.storage_buffer_count(), Reflection::storage_buffer)
    }

    /// Reads the complete resource interface.
    ///
    /// Unlike the iterators, which stop at the first failing entry, this
    /// reports the failure.
    pub fn to_desc(&self) -> Result<ReflectionDesc> {
        Ok(ReflectionDesc {
            stage_inputs: (0..self.stage_input_count())
                .map(|i| self.stage_input(i))
                .collect::<Result<_>>()?,
            uniform_buffers: (0..self.uniform_buffer_count())
                .map(|i| self.uniform_buffer(i))
                .collect::<Result<_>>()?,
            samplers: (0..self.sampler_count())
                .map(|i| self.sampler(i))
                .collect::<Result<_>>()?,
            storage_buffers: (0..self.storage_buffer_count())
                .map(|i| self.storage_buffer(i))
                .collect::<Result<_>>()?,
        })
    }
}

impl Drop for Reflection {
    fn drop(&mut self) {
        unsafe { DestroyShaderConductorReflection(self.raw.reflection) }
    }
}

impl fmt::Debug for Reflection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reflection")
            .field("handle", &self.raw.reflection)
            .field("stage_inputs", &self.stage_input_count())
            .field("uniform_buffers", &self.uniform_buffer_count())
            .field("samplers", &self.sampler_count())
            .field("storage_buffers", &self.storage_buffer_count())
            .finish()
    }
}

/// Iterator over one kind of reflection record
pub struct ReflectionIter<'a, T> {
    reflection: &'a Reflection,
    index: u32,
    count: u32,
    fetch: fn(&Reflection, u32) -> Result<T>,
}

impl<'a, T> ReflectionIter<'a, T> {
    fn new(reflection: &'a Reflection, count: u32, fetch: fn(&Reflection, u32) -> Result<T>) -> Self {
        ReflectionIter {
            reflection,
            index: 0,
            count,
            fetch,
        }
    }
}

impl<T> Iterator for ReflectionIter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.count {
            return None;
        }
        match (self.fetch)(self.reflection, self.index) {
            Ok(item) => {
                self.index += 1;
                Some(item)
            }
            Err(_) => {
                // A failed fetch ends the iteration
                self.index = self.count;
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.count - self.index) as usize;
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for ReflectionIter<'_, T> {}

/// Turns an accessor's `int` output into an unsigned value
pub(crate) fn unsigned(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

/// Converts an index for the accessors; indices past `i32::MAX` are reported
/// as out of range by the accessor itself.
pub(crate) fn c_index(index: u32) -> i32 {
    i32::try_from(index).unwrap_or(i32::MAX)
}

/// Turns a negative accessor return value into an error.
pub(crate) fn check(code: i32) -> Result<usize> {
    usize::try_from(code).map_err(|_| Error::Reflection {
        status: StatusCode(code),
    })
}

/// Calls an accessor with `N` name buffers of a shared capacity, growing the
/// buffers and calling again until every name fits.
pub(crate) fn fetch_names<const N: usize, F>(mut call: F) -> Result<[String; N]>
where
    F: FnMut([*mut c_char; N], i32) -> i32,
{
    let mut capacity = INITIAL_NAME_CAPACITY;
    loop {
        let mut buffers: [Vec<c_char>; N] = std::array::from_fn(|_| vec![0; capacity]);
        let pointers = buffers.each_mut().map(|buffer| buffer.as_mut_ptr());
        let max_len = i32::try_from(capacity).unwrap_or(i32::MAX);

        let required = check(call(pointers, max_len))?;
        if required <= capacity {
            return Ok(buffers.map(|buffer| name_from_buffer(&buffer)));
        }
        capacity = required;
    }
}

fn name_from_buffer(buffer: &[c_char]) -> String {
    let bytes: Vec<u8> = buffer.iter().map(|&c| c as u8).collect();
    CStr::from_bytes_until_nul(&bytes)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
