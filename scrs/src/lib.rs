//! Safe, ergonomic Rust API over the ShaderConductor wrapper ABI
//!
//! This crate drives the exported `scwrapper` entry points the same way a
//! foreign consumer would, and wraps them in Rust idioms: Result types, RAII
//! owners for blobs and reflection data, iterators and builders.
//!
//! An engine must be registered with [`scwrapper::register_engine`] before
//! anything can be compiled.
//!
//! # Example
//!
//! ```no_run
//! use scrs::{CompileBuilder, ShaderStage, ShadingLanguage};
//!
//! let source = r#"
//!     float4 main(float4 pos : POSITION) : SV_Target {
//!         return pos;
//!     }
//! "#;
//!
//! // Cross-compile a pixel shader to GLSL
//! let output = CompileBuilder::new(source, "main", ShaderStage::Pixel)
//!     .language(ShadingLanguage::Glsl)
//!     .version("450")
//!     .compile()
//!     .unwrap();
//!
//! println!("{}", output.target.to_string_lossy());
//! if let Some(reflection) = &output.reflection {
//!     for input in reflection.stage_inputs() {
//!         println!("input {} at location {}", input.name, input.location);
//!     }
//! }
//! ```

mod blob;
mod compile;
mod disassemble;
mod error;
mod flags;
pub mod reflect;
mod target;

pub use blob::Blob;
pub use compile::{CompileBuilder, CompileOutput, compile};
pub use disassemble::{DisassembleBuilder, disassemble};
pub use error::{Error, Result, StatusCode};
pub use flags::CompileFlags;
pub use reflect::Reflection;
pub use target::{ShaderModel, ShaderStage, ShadingLanguage, Target};

#[cfg(test)]
pub(crate) mod testing;
