//! Native request/response model of the compilation engine
//!
//! The engine itself lives outside this crate. Hosts implement [`Engine`] and
//! hand it to [`register_engine`](crate::register_engine); the exported
//! `Compile` and `Disassemble` entry points translate the boundary structs
//! into the types below, call the engine, and translate its [`Translation`]
//! back.

use crate::{Blob, Error, Result};
use std::fmt;

/// Pipeline stage of the shader being compiled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ShaderStage {
    /// Vertex shader
    Vertex = 0,
    /// Pixel (fragment) shader
    Pixel = 1,
    /// Geometry shader
    Geometry = 2,
    /// Hull (tessellation control) shader
    Hull = 3,
    /// Domain (tessellation evaluation) shader
    Domain = 4,
    /// Compute shader
    Compute = 5,
}

impl TryFrom<i32> for ShaderStage {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            0 => Ok(ShaderStage::Vertex),
            1 => Ok(ShaderStage::Pixel),
            2 => Ok(ShaderStage::Geometry),
            3 => Ok(ShaderStage::Hull),
            4 => Ok(ShaderStage::Domain),
            5 => Ok(ShaderStage::Compute),
            _ => Err(Error::InvalidEnum {
                kind: "shader stage",
                value,
            }),
        }
    }
}

/// Language of the compiled or cross-compiled output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ShadingLanguage {
    /// DXIL binary
    Dxil = 0,
    /// SPIR-V binary
    SpirV = 1,
    /// HLSL source
    Hlsl = 2,
    /// GLSL source
    Glsl = 3,
    /// GLSL ES source
    Essl = 4,
    /// Metal Shading Language for macOS
    MslMacOs = 5,
    /// Metal Shading Language for iOS
    MslIos = 6,
}

impl ShadingLanguage {
    /// Returns true if output in this language is human-readable source text
    pub fn is_text(&self) -> bool {
        !matches!(self, ShadingLanguage::Dxil | ShadingLanguage::SpirV)
    }
}

impl TryFrom<i32> for ShadingLanguage {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            0 => Ok(ShadingLanguage::Dxil),
            1 => Ok(ShadingLanguage::SpirV),
            2 => Ok(ShadingLanguage::Hlsl),
            3 => Ok(ShadingLanguage::Glsl),
            4 => Ok(ShadingLanguage::Essl),
            5 => Ok(ShadingLanguage::MslMacOs),
            6 => Ok(ShadingLanguage::MslIos),
            _ => Err(Error::InvalidEnum {
                kind: "shading language",
                value,
            }),
        }
    }
}

/// A preprocessor macro definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacroDefine<'a> {
    pub name: &'a str,
    pub value: Option<&'a str>,
}

/// Shader source handed to the engine
#[derive(Debug, Clone, Copy)]
pub struct SourceDesc<'a> {
    pub source: &'a str,
    pub entry_point: &'a str,
    pub stage: ShaderStage,
    /// Used in diagnostics only; the wrapper never sets it
    pub file_name: Option<&'a str>,
    pub defines: &'a [MacroDefine<'a>],
}

/// Target instruction-set version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderModel {
    pub major: u8,
    pub minor: u8,
}

impl ShaderModel {
    pub const fn new(major: u8, minor: u8) -> Self {
        ShaderModel { major, minor }
    }
}

impl Default for ShaderModel {
    fn default() -> Self {
        ShaderModel::new(6, 0)
    }
}

impl fmt::Display for ShaderModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.major, self.minor)
    }
}

/// Compilation options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Matrix storage order in generated code
    pub pack_matrices_in_row_major: bool,
    /// Permit half-width scalar types. Requires shader model 6.2+
    pub enable_16bit_types: bool,
    /// Embed source-level debug data
    pub enable_debug_info: bool,
    /// Bypass optimization passes; `optimization_level` is ignored
    pub disable_optimizations: bool,
    /// 0 to 3, no optimization to most optimization
    pub optimization_level: i32,
    pub shader_model: ShaderModel,
    pub shift_all_textures_bindings: i32,
    pub shift_all_samplers_bindings: i32,
    pub shift_all_cbuffers_bindings: i32,
    pub shift_all_uabuffers_bindings: i32,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            pack_matrices_in_row_major: true,
            enable_16bit_types: false,
            enable_debug_info: false,
            disable_optimizations: false,
            optimization_level: 3,
            shader_model: ShaderModel::default(),
            shift_all_textures_bindings: 0,
            shift_all_samplers_bindings: 0,
            shift_all_cbuffers_bindings: 0,
            shift_all_uabuffers_bindings: 0,
        }
    }
}

/// Output language selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetDesc<'a> {
    pub language: ShadingLanguage,
    /// Language version, e.g. "450" for GLSL; engine default when `None`
    pub version: Option<&'a str>,
    /// Emit a library module instead of a single entry point
    pub as_module: bool,
}

/// Binary to be disassembled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisassembleDesc<'a> {
    pub language: ShadingLanguage,
    pub binary: &'a [u8],
}

/// Scalar type of a uniform buffer parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum ScalarType {
    #[default]
    Unknown = 0,
    Bool = 1,
    Int = 2,
    UInt = 3,
    Float = 4,
    Half = 5,
    Double = 6,
    Int16 = 7,
    UInt16 = 8,
}

impl From<i32> for ScalarType {
    fn from(value: i32) -> Self {
        match value {
            1 => ScalarType::Bool,
            2 => ScalarType::Int,
            3 => ScalarType::UInt,
            4 => ScalarType::Float,
            5 => ScalarType::Half,
            6 => ScalarType::Double,
            7 => ScalarType::Int16,
            8 => ScalarType::UInt16,
            _ => ScalarType::Unknown,
        }
    }
}

/// Dimension of the texture a sampler is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum TextureDimension {
    #[default]
    Unknown = 0,
    Texture1D = 1,
    Texture2D = 2,
    Texture3D = 3,
    TextureCube = 4,
}

impl From<i32> for TextureDimension {
    fn from(value: i32) -> Self {
        match value {
            1 => TextureDimension::Texture1D,
            2 => TextureDimension::Texture2D,
            3 => TextureDimension::Texture3D,
            4 => TextureDimension::TextureCube,
            _ => TextureDimension::Unknown,
        }
    }
}

/// Input variable consumed by the pipeline stage
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StageInput {
    pub name: String,
    pub location: u32,
    pub rows: u32,
    pub columns: u32,
}

/// Member of a uniform buffer
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Parameter {
    pub name: String,
    pub ty: ScalarType,
    pub rows: u32,
    pub columns: u32,
    pub byte_offset: u32,
    /// One entry per array dimension; empty for non-arrays
    pub array_sizes: Vec<u32>,
}

impl Parameter {
    /// Number of array dimensions (0 = not an array)
    pub fn array_dimensions(&self) -> usize {
        self.array_sizes.len()
    }
}

/// Block of constant data visible to the shader
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UniformBuffer {
    pub block_name: String,
    pub instance_name: String,
    pub byte_size: u32,
    /// Register binding
    pub slot: u32,
    pub parameters: Vec<Parameter>,
}

/// Combined texture/sampler pair
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sampler {
    pub name: String,
    pub original_name: String,
    pub texture_name: String,
    pub ty: TextureDimension,
    /// Sampler register binding
    pub slot: u32,
    /// Texture register binding
    pub texture_slot: u32,
}

/// Read-only or read-write structured buffer
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StorageBuffer {
    pub block_name: String,
    pub instance_name: String,
    pub byte_size: u32,
    /// Register binding
    pub slot: u32,
    pub read_only: bool,
}

/// Resource interface of a compiled shader
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReflectionDesc {
    pub stage_inputs: Vec<StageInput>,
    pub uniform_buffers: Vec<UniformBuffer>,
    pub samplers: Vec<Sampler>,
    pub storage_buffers: Vec<StorageBuffer>,
}

/// Everything the engine produces for one request
#[derive(Debug, Default)]
pub struct Translation {
    pub target: Option<Blob>,
    pub is_text: bool,
    /// Diagnostics; may be present on success (warnings)
    pub error_warning_msg: Option<Blob>,
    pub has_error: bool,
    pub reflection: Option<ReflectionDesc>,
}

impl Translation {
    /// A failed translation carrying only diagnostics.
    pub fn failed(message: impl Into<Blob>) -> Self {
        Translation {
            error_warning_msg: Some(message.into()),
            has_error: true,
            ..Default::default()
        }
    }
}

/// The compilation engine consumed by the bridges
///
/// Implementations report unrecoverable failures with `Err`; ordinary
/// compile errors are reported in-band through [`Translation::has_error`].
/// Panics are caught by the bridges as well.
pub trait Engine: Send + Sync {
    /// Compiles (and optionally cross-compiles) a shader.
    fn compile(
        &self,
        source: &SourceDesc<'_>,
        options: &Options,
        target: &TargetDesc<'_>,
    ) -> Result<Translation>;

    /// Turns a binary shader back into text.
    fn disassemble(&self, source: &DisassembleDesc<'_>) -> Result<Translation>;
}
