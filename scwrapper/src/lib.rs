//! Flat C ABI over a ShaderConductor-style shader compilation engine
//!
//! This crate exposes shader compilation, disassembly and reflection through
//! fixed-layout structs, generation-checked opaque handles and caller-supplied
//! name buffers, so that another language runtime (or a dynamically loaded
//! module) can drive the engine without sharing any of its container types.
//!
//! The engine itself is supplied by the host through [`register_engine`].
//! Every export converts engine failures, including panics, into an in-band
//! error flag plus a diagnostic blob; nothing unwinds across the boundary.

#![allow(non_snake_case)]
#![allow(clippy::missing_safety_doc)]
#![allow(clippy::too_many_arguments)]
#![allow(unsafe_op_in_unsafe_fn)]

macro_rules! debug_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "debug-logs")]
        eprintln!($($arg)*)
    };
}

macro_rules! debug_log_return {
    ($tag:literal, $fmt:literal, $expr:expr) => {{
        #[cfg(feature = "debug-logs")]
        {
            let result = $expr;
            eprintln!(concat!($tag, " -> ", $fmt), result);
            result
        }
        #[cfg(not(feature = "debug-logs"))]
        {
            $expr
        }
    }};
}

mod blob;
pub mod bridge;
pub mod engine;
pub mod handle;
pub mod reflection;

pub use blob::{
    Blob, BlobHandle, CreateShaderConductorBlob, DestroyShaderConductorBlob,
    GetShaderConductorBlobData, GetShaderConductorBlobSize, live_blob_count, with_blob,
};
pub use engine::{
    DisassembleDesc, Engine, MacroDefine, Options, Parameter, ReflectionDesc, Sampler,
    ScalarType, ShaderModel, ShaderStage, ShadingLanguage, SourceDesc, StageInput,
    StorageBuffer, TargetDesc, TextureDimension, Translation, UniformBuffer,
};
pub use reflection::{
    DestroyShaderConductorReflection, GetParameter, GetParameterArraySize, GetSampler,
    GetSamplerCount, GetStageInput, GetStageInputCount, GetStorageBuffer, GetStorageBufferCount,
    GetUniformBuffer, GetUniformBufferCount, ReflectionHandle, Status, live_reflection_count,
};

use scwrapper_proc::boundary;
use std::any::Any;
use std::ffi::c_char;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Failure reported by the engine; the message is passed through verbatim
    #[error("{0}")]
    Engine(String),
    #[error("No compilation engine registered")]
    EngineNotRegistered,
    #[error("A compilation engine is already registered")]
    EngineAlreadyRegistered,
    #[error("Null pointer: {0}")]
    NullPointer(&'static str),
    #[error("Invalid {kind}: {value}")]
    InvalidEnum { kind: &'static str, value: i32 },
    #[error("{what} out of range: {value}")]
    OutOfRange { what: &'static str, value: i64 },
    #[error("UTF-8 encoding error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("Engine panicked: {0}")]
    Panic(String),
}

impl Error {
    /// Builds an engine failure from any message.
    pub fn engine(message: impl Into<String>) -> Self {
        Error::Engine(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Extracts the text of a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

// ============================================================================
// Boundary structs
// ============================================================================

/// Shader source to compile. Strings are NUL-terminated.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct SourceDescription {
    pub source: *const c_char,
    pub entryPoint: *const c_char,
    /// A [`ShaderStage`] value
    pub stage: i32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderModelDescription {
    pub major: i32,
    pub minor: i32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionsDescription {
    pub packMatricesInRowMajor: bool,
    pub enable16bitTypes: bool,
    pub enableDebugInfo: bool,
    pub disableOptimizations: bool,
    pub optimizationLevel: i32,
    pub shaderModel: ShaderModelDescription,
    pub shiftAllTexturesBindings: i32,
    pub shiftAllSamplersBindings: i32,
    pub shiftAllCBuffersBindings: i32,
    pub shiftAllUABuffersBindings: i32,
}

impl Default for OptionsDescription {
    fn default() -> Self {
        let options = Options::default();
        OptionsDescription {
            packMatricesInRowMajor: options.pack_matrices_in_row_major,
            enable16bitTypes: options.enable_16bit_types,
            enableDebugInfo: options.enable_debug_info,
            disableOptimizations: options.disable_optimizations,
            optimizationLevel: options.optimization_level,
            shaderModel: ShaderModelDescription {
                major: options.shader_model.major as i32,
                minor: options.shader_model.minor as i32,
            },
            shiftAllTexturesBindings: options.shift_all_textures_bindings,
            shiftAllSamplersBindings: options.shift_all_samplers_bindings,
            shiftAllCBuffersBindings: options.shift_all_cbuffers_bindings,
            shiftAllUABuffersBindings: options.shift_all_uabuffers_bindings,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TargetDescription {
    /// A [`ShadingLanguage`] value
    pub language: i32,
    /// Optional NUL-terminated version string
    pub version: *const c_char,
    pub asModule: bool,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct DisassembleDescription {
    /// A [`ShadingLanguage`] value
    pub language: i32,
    /// Caller-owned; must stay valid for the duration of the call
    pub binary: *const u8,
    pub binarySize: i32,
}

/// Output of `Compile` and `Disassemble`.
///
/// The caller owns both blob handles and the reflection handle and releases
/// them with `DestroyShaderConductorResult`. When `hasError` is set,
/// `errorWarningMsg` is always non-null and `target` / `reflection` are null.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResultDescription {
    pub target: BlobHandle,
    pub isText: bool,
    pub errorWarningMsg: BlobHandle,
    pub hasError: bool,
    pub reflection: ReflectionHandle,
}

impl ResultDescription {
    /// A result that owns nothing
    pub const fn null() -> Self {
        ResultDescription {
            target: BlobHandle::NULL,
            isText: false,
            errorWarningMsg: BlobHandle::NULL,
            hasError: false,
            reflection: ReflectionHandle::NULL,
        }
    }

    /// An error result whose message blob holds the error text.
    pub fn from_error(err: &Error) -> Self {
        ResultDescription {
            errorWarningMsg: Blob::from(err.to_string()).into_handle(),
            hasError: true,
            ..Self::null()
        }
    }
}

// ============================================================================
// Engine registration
// ============================================================================

static ENGINE: OnceLock<Box<dyn Engine>> = OnceLock::new();

/// Installs the engine used by the `Compile` and `Disassemble` exports.
///
/// Only one engine can be registered per process.
pub fn register_engine<E: Engine + 'static>(engine: E) -> Result<()> {
    ENGINE
        .set(Box::new(engine))
        .map_err(|_| Error::EngineAlreadyRegistered)
}

/// Returns the registered engine.
pub fn registered_engine() -> Result<&'static dyn Engine> {
    ENGINE
        .get()
        .map(|engine| engine.as_ref())
        .ok_or(Error::EngineNotRegistered)
}

// ============================================================================
// Exports
// ============================================================================

/// Compiles a shader with the registered engine.
///
/// `*result` is overwritten; any handles it held before are not released.
#[boundary]
pub unsafe extern "C" fn Compile(
    source: *const SourceDescription,
    options: *const OptionsDescription,
    target: *const TargetDescription,
    result: *mut ResultDescription,
) {
    let Some(result) = result.as_mut() else {
        return;
    };
    *result = ResultDescription::null();
    *result = match registered_engine() {
        Ok(engine) => bridge::compile_with(engine, source, options, target),
        Err(err) => ResultDescription::from_error(&err),
    };
}

/// Disassembles a binary shader with the registered engine.
///
/// `*result` is overwritten; any handles it held before are not released.
#[boundary]
pub unsafe extern "C" fn Disassemble(
    source: *const DisassembleDescription,
    result: *mut ResultDescription,
) {
    let Some(result) = result.as_mut() else {
        return;
    };
    *result = ResultDescription::null();
    *result = match registered_engine() {
        Ok(engine) => bridge::disassemble_with(engine, source),
        Err(err) => ResultDescription::from_error(&err),
    };
}

/// Releases every handle owned by a result and resets it to the null result.
#[boundary]
pub unsafe extern "C" fn DestroyShaderConductorResult(result: *mut ResultDescription) {
    let Some(result) = result.as_mut() else {
        return;
    };
    drop(Blob::from_handle(result.target));
    drop(Blob::from_handle(result.errorWarningMsg));
    reflection::release(result.reflection);
    *result = ResultDescription::null();
}
