//! Shader compilation API

use crate::{Blob, CompileFlags, Error, Reflection, Result, ShaderModel, ShaderStage, Target};
use scwrapper::{
    Compile, OptionsDescription, ResultDescription, ShaderModelDescription, ShadingLanguage,
    SourceDescription, TargetDescription,
};
use std::borrow::Cow;
use std::ffi::CString;
use std::ptr;

/// Result of a successful shader compilation
#[derive(Debug)]
pub struct CompileOutput {
    /// The compiled (or cross-compiled) shader
    pub target: Blob,
    /// True when `target` holds source text
    pub is_text: bool,
    /// Any warning messages from the engine (if present)
    pub warnings: Option<String>,
    /// Resource interface of the shader, when the engine reports one
    pub reflection: Option<Reflection>,
}

/// Builder for shader compilation with fluent API
///
/// # Example
/// ```no_run
/// use scrs::{CompileBuilder, CompileFlags, ShaderModel, ShaderStage, Target};
///
/// let source = "float4 main() : SV_Target { return float4(1,0,0,1); }";
///
/// let output = CompileBuilder::new(source, "main", ShaderStage::Pixel)
///     .target(Target::ESSL_310)
///     .shader_model(ShaderModel::new(6, 2))
///     .flags(CompileFlags::ENABLE_16BIT_TYPES | CompileFlags::ENABLE_DEBUG_INFO)
///     .optimization_level(1)
///     .compile()
///     .unwrap();
/// ```
pub struct CompileBuilder<'a> {
    source: &'a str,
    entry_point: &'a str,
    stage: ShaderStage,
    target: Target,
    flags: CompileFlags,
    optimization_level: u32,
    shader_model: ShaderModel,
    texture_shift: i32,
    sampler_shift: i32,
    cbuffer_shift: i32,
    uabuffer_shift: i32,
}

impl<'a> CompileBuilder<'a> {
    /// Creates a new compile builder with the required parameters.
    ///
    /// The target defaults to DXIL, shader model 6.0, row-major matrices and
    /// optimization level 3.
    ///
    /// # Arguments
    /// * `source` - The HLSL source code
    /// * `entry_point` - The name of the entry point function (e.g., "main")
    /// * `stage` - The pipeline stage the entry point is compiled for
    pub fn new(source: &'a str, entry_point: &'a str, stage: ShaderStage) -> Self {
        CompileBuilder {
            source,
            entry_point,
            stage,
            target: Target::DXIL,
            flags: CompileFlags::default(),
            optimization_level: 3,
            shader_model: ShaderModel::default(),
            texture_shift: 0,
            sampler_shift: 0,
            cbuffer_shift: 0,
            uabuffer_shift: 0,
        }
    }

    /// Sets the complete output target.
    pub fn target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    /// Sets the output language, keeping the version and module settings.
    pub fn language(mut self, language: ShadingLanguage) -> Self {
        self.target.language = language;
        self
    }

    /// Sets the output language version (e.g., "450" for GLSL).
    pub fn version(mut self, version: impl Into<Cow<'static, str>>) -> Self {
        self.target.version = Some(version.into());
        self
    }

    /// Emits a library module instead of a single entry point.
    pub fn as_module(mut self, as_module: bool) -> Self {
        self.target.as_module = as_module;
        self
    }

    /// Sets compile flags (replaces any existing flags).
    pub fn flags(mut self, flags: CompileFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Adds compile flags (bitwise OR with existing).
    pub fn with_flags(mut self, flags: CompileFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Embeds debug information.
    pub fn debug(self) -> Self {
        self.with_flags(CompileFlags::ENABLE_DEBUG_INFO)
    }

    /// Skips optimization passes.
    pub fn disable_optimizations(self) -> Self {
        self.with_flags(CompileFlags::DISABLE_OPTIMIZATIONS)
    }

    /// Sets the matrix packing order to column-major.
    pub fn column_major_matrices(mut self) -> Self {
        self.flags.remove(CompileFlags::PACK_MATRICES_IN_ROW_MAJOR);
        self
    }

    /// Sets the optimization level (0-3).
    ///
    /// * Level 0: No optimization
    /// * Level 3: Full optimization (default)
    ///
    /// Levels above 3 are clamped.
    pub fn optimization_level(mut self, level: u32) -> Self {
        self.optimization_level = level.min(3);
        self
    }

    /// Sets the shader model (default 6.0).
    pub fn shader_model(mut self, model: ShaderModel) -> Self {
        self.shader_model = model;
        self
    }

    /// Offsets every texture binding by `shift`.
    pub fn shift_textures_bindings(mut self, shift: i32) -> Self {
        self.texture_shift = shift;
        self
    }

    /// Offsets every sampler binding by `shift`.
    pub fn shift_samplers_bindings(mut self, shift: i32) -> Self {
        self.sampler_shift = shift;
        self
    }

    /// Offsets every constant buffer binding by `shift`.
    pub fn shift_cbuffers_bindings(mut self, shift: i32) -> Self {
        self.cbuffer_shift = shift;
        self
    }

    /// Offsets every unordered-access buffer binding by `shift`.
    pub fn shift_uabuffers_bindings(mut self, shift: i32) -> Self {
        self.uabuffer_shift = shift;
        self
    }

    fn options(&self) -> OptionsDescription {
        OptionsDescription {
            packMatricesInRowMajor: self.flags.contains(CompileFlags::PACK_MATRICES_IN_ROW_MAJOR),
            enable16bitTypes: self.flags.contains(CompileFlags::ENABLE_16BIT_TYPES),
            enableDebugInfo: self.flags.contains(CompileFlags::ENABLE_DEBUG_INFO),
            disableOptimizations: self.flags.contains(CompileFlags::DISABLE_OPTIMIZATIONS),
            optimizationLevel: self.optimization_level as i32,
            shaderModel: ShaderModelDescription {
                major: self.shader_model.major.into(),
                minor: self.shader_model.minor.into(),
            },
            shiftAllTexturesBindings: self.texture_shift,
            shiftAllSamplersBindings: self.sampler_shift,
            shiftAllCBuffersBindings: self.cbuffer_shift,
            shiftAllUABuffersBindings: self.uabuffer_shift,
        }
    }

    /// Compiles the shader.
    ///
    /// Returns the target, any warning messages and the reflection data.
    pub fn compile(self) -> Result<CompileOutput> {
        let source = c_string(self.source, "source")?;
        let entry_point = c_string(self.entry_point, "entry point")?;
        let version = self.target.version_cstring()?;

        let source_desc = SourceDescription {
            source: source.as_ptr(),
            entryPoint: entry_point.as_ptr(),
            stage: self.stage as i32,
        };
        let options = self.options();
        let target_desc = TargetDescription {
            language: self.target.language as i32,
            version: version.as_ref().map(|v| v.as_ptr()).unwrap_or(ptr::null()),
            asModule: self.target.as_module,
        };

        let mut result = ResultDescription::null();
        unsafe { Compile(&source_desc, &options, &target_desc, &mut result) };

        // Take ownership of every handle before looking at the flags
        let target = Blob::from_handle(result.target);
        let messages = Blob::from_handle(result.errorWarningMsg)
            .map(|b| b.to_string_lossy())
            .filter(|s| !s.is_empty());
        let reflection = Reflection::from_handle(result.reflection);

        if result.hasError {
            return Err(Error::Compilation {
                message: messages.unwrap_or_else(|| "Unknown error".to_string()),
            });
        }

        let target = target.ok_or_else(|| Error::Compilation {
            message: "No target returned from engine".to_string(),
        })?;

        Ok(CompileOutput {
            target,
            is_text: result.isText,
            warnings: messages,
            reflection,
        })
    }
}

fn c_string(text: &str, what: &str) -> Result<CString> {
    CString::new(text).map_err(|_| Error::InvalidParameter(format!("{} contains a null byte", what)))
}

/// Convenience function for simple shader compilation.
///
/// # Example
/// ```no_run
/// use scrs::{compile, ShaderStage, ShadingLanguage};
///
/// let source = "float4 main() : SV_Target { return float4(1,0,0,1); }";
/// let spirv = compile(source, "main", ShaderStage::Pixel, ShadingLanguage::SpirV).unwrap();
/// ```
pub fn compile(
    source: &str,
    entry_point: &str,
    stage: ShaderStage,
    language: ShadingLanguage,
) -> Result<Blob> {
    CompileBuilder::new(source, entry_point, stage)
        .language(language)
        .compile()
        .map(|r| r.target)
}
