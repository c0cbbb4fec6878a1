//! Shader disassembly API

use crate::{Blob, Error, Result, ShadingLanguage};
use scwrapper::{Disassemble, DisassembleDescription, ResultDescription};

/// Builder for shader disassembly
///
/// # Example
/// ```no_run
/// use scrs::{compile, DisassembleBuilder, ShaderStage, ShadingLanguage};
///
/// let spirv = compile(
///     "float4 main() : SV_Target { return float4(1,0,0,1); }",
///     "main",
///     ShaderStage::Pixel,
///     ShadingLanguage::SpirV,
/// ).unwrap();
///
/// let text = DisassembleBuilder::from_blob(&spirv, ShadingLanguage::SpirV)
///     .disassemble()
///     .unwrap();
///
/// println!("{}", text.to_string_lossy());
/// ```
pub struct DisassembleBuilder<'a> {
    binary: &'a [u8],
    language: ShadingLanguage,
}

impl<'a> DisassembleBuilder<'a> {
    /// Creates a new disassemble builder from a compiled binary.
    pub fn new(binary: &'a [u8], language: ShadingLanguage) -> Self {
        DisassembleBuilder { binary, language }
    }

    /// Creates a new disassemble builder from a Blob.
    pub fn from_blob(blob: &'a Blob, language: ShadingLanguage) -> Self {
        Self::new(blob.as_bytes(), language)
    }

    /// Sets the language of the binary.
    pub fn language(mut self, language: ShadingLanguage) -> Self {
        self.language = language;
        self
    }

    /// Disassembles the binary.
    pub fn disassemble(self) -> Result<Blob> {
        let size = i32::try_from(self.binary.len()).map_err(|_| {
            Error::InvalidParameter(format!("binary of {} bytes is too large", self.binary.len()))
        })?;
        let source = DisassembleDescription {
            language: self.language as i32,
            binary: self.binary.as_ptr(),
            binarySize: size,
        };

        let mut result = ResultDescription::null();
        unsafe { Disassemble(&source, &mut result) };

        let text = Blob::from_handle(result.target);
        let messages = Blob::from_handle(result.errorWarningMsg).map(|b| b.to_string_lossy());

        if result.hasError {
            return Err(Error::Disassembly {
                message: messages.unwrap_or_else(|| "Unknown error".to_string()),
            });
        }

        text.ok_or_else(|| Error::Disassembly {
            message: "No text returned from engine".to_string(),
        })
    }
}

/// Convenience function for simple disassembly.
///
/// # Example
/// ```no_run
/// use scrs::{disassemble, ShadingLanguage};
///
/// let spirv = std::fs::read("shader.spv").unwrap();
/// let text = disassemble(&spirv, ShadingLanguage::SpirV).unwrap();
/// println!("{}", text.to_string_lossy());
/// ```
pub fn disassemble(binary: &[u8], language: ShadingLanguage) -> Result<Blob> {
    DisassembleBuilder::new(binary, language).disassemble()
}
