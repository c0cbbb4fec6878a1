//! Compile and disassemble bridges
//!
//! Translate boundary structs into the engine's native request shape, invoke
//! the engine, and publish its [`Translation`] as a [`ResultDescription`].
//! Every failure on the way (bad input, engine error, engine panic) ends up
//! in-band: `hasError` plus a message blob.

use crate::engine::{
    DisassembleDesc, Engine, Options, ShaderModel, ShaderStage, ShadingLanguage, SourceDesc,
    TargetDesc, Translation,
};
use crate::{
    Blob, DisassembleDescription, Error, OptionsDescription, ResultDescription, Result,
    SourceDescription, TargetDescription, panic_message, reflection,
};
use std::ffi::{CStr, c_char};
use std::panic::{self, AssertUnwindSafe};

/// Message used when the engine flags an error without saying why
const MISSING_DIAGNOSTIC: &str = "shader translation failed without a diagnostic message";

unsafe fn deref<'a, T>(ptr: *const T, what: &'static str) -> Result<&'a T> {
    ptr.as_ref().ok_or(Error::NullPointer(what))
}

unsafe fn borrow_str<'a>(ptr: *const c_char, what: &'static str) -> Result<&'a str> {
    if ptr.is_null() {
        return Err(Error::NullPointer(what));
    }
    Ok(CStr::from_ptr(ptr).to_str()?)
}

unsafe fn borrow_opt_str<'a>(ptr: *const c_char) -> Result<Option<&'a str>> {
    if ptr.is_null() {
        return Ok(None);
    }
    Ok(Some(CStr::from_ptr(ptr).to_str()?))
}

fn narrow(value: i32, what: &'static str) -> Result<u8> {
    u8::try_from(value).map_err(|_| Error::OutOfRange {
        what,
        value: value.into(),
    })
}

impl TryFrom<&OptionsDescription> for Options {
    type Error = Error;

    fn try_from(desc: &OptionsDescription) -> Result<Self> {
        Ok(Options {
            pack_matrices_in_row_major: desc.packMatricesInRowMajor,
            enable_16bit_types: desc.enable16bitTypes,
            enable_debug_info: desc.enableDebugInfo,
            disable_optimizations: desc.disableOptimizations,
            optimization_level: desc.optimizationLevel,
            shader_model: ShaderModel::new(
                narrow(desc.shaderModel.major, "shader model major version")?,
                narrow(desc.shaderModel.minor, "shader model minor version")?,
            ),
            shift_all_textures_bindings: desc.shiftAllTexturesBindings,
            shift_all_samplers_bindings: desc.shiftAllSamplersBindings,
            shift_all_cbuffers_bindings: desc.shiftAllCBuffersBindings,
            shift_all_uabuffers_bindings: desc.shiftAllUABuffersBindings,
        })
    }
}

unsafe fn source_desc<'a>(desc: &SourceDescription) -> Result<SourceDesc<'a>> {
    Ok(SourceDesc {
        source: borrow_str(desc.source, "source")?,
        entry_point: borrow_str(desc.entryPoint, "entryPoint")?,
        stage: ShaderStage::try_from(desc.stage)?,
        file_name: None,
        defines: &[],
    })
}

unsafe fn target_desc<'a>(desc: &TargetDescription) -> Result<TargetDesc<'a>> {
    Ok(TargetDesc {
        language: ShadingLanguage::try_from(desc.language)?,
        version: borrow_opt_str(desc.version)?,
        as_module: desc.asModule,
    })
}

unsafe fn disassemble_desc<'a>(desc: &DisassembleDescription) -> Result<DisassembleDesc<'a>> {
    let language = ShadingLanguage::try_from(desc.language)?;
    let len = usize::try_from(desc.binarySize).map_err(|_| Error::OutOfRange {
        what: "binary size",
        value: desc.binarySize.into(),
    })?;
    let binary: &[u8] = match len {
        0 => &[],
        _ if desc.binary.is_null() => return Err(Error::NullPointer("binary")),
        _ => std::slice::from_raw_parts(desc.binary, len),
    };
    Ok(DisassembleDesc { language, binary })
}

/// Runs an engine entry point, turning a panic into an error.
fn guarded(op: &'static str, call: impl FnOnce() -> Result<Translation>) -> Result<Translation> {
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(outcome) => outcome,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            debug_log!("[BRIDGE] {} panicked: {}", op, message);
            Err(Error::Panic(message))
        }
    }
}

/// Hands the engine's output over to the caller.
///
/// Blobs move into the blob table without copying their bytes. When the
/// engine flagged an error, anything it produced besides diagnostics is
/// released here rather than handed out.
pub fn publish(outcome: Result<Translation>) -> ResultDescription {
    let translation = match outcome {
        Ok(translation) => translation,
        Err(err) => {
            debug_log!("[BRIDGE] engine failure: {}", err);
            return ResultDescription::from_error(&err);
        }
    };

    let Translation {
        target,
        is_text,
        error_warning_msg,
        has_error,
        reflection,
    } = translation;

    if has_error {
        let message = error_warning_msg.unwrap_or_else(|| Blob::from(MISSING_DIAGNOSTIC));
        return ResultDescription {
            errorWarningMsg: message.into_handle(),
            hasError: true,
            ..ResultDescription::null()
        };
    }

    ResultDescription {
        target: target.map(Blob::into_handle).unwrap_or_default(),
        isText: is_text,
        errorWarningMsg: error_warning_msg.map(Blob::into_handle).unwrap_or_default(),
        hasError: false,
        reflection: reflection.map(reflection::register).unwrap_or_default(),
    }
}

unsafe fn compile_request(
    engine: &dyn Engine,
    source: *const SourceDescription,
    options: *const OptionsDescription,
    target: *const TargetDescription,
) -> Result<Translation> {
    let source = source_desc(deref(source, "source")?)?;
    let options = Options::try_from(deref(options, "options")?)?;
    let target = target_desc(deref(target, "target")?)?;
    guarded("compile", || engine.compile(&source, &options, &target))
}

unsafe fn disassemble_request(
    engine: &dyn Engine,
    source: *const DisassembleDescription,
) -> Result<Translation> {
    let source = disassemble_desc(deref(source, "source")?)?;
    let translation = guarded("disassemble", || engine.disassemble(&source))?;
    // Disassembly results never own reflection data
    Ok(Translation {
        reflection: None,
        ..translation
    })
}

/// Compiles through `engine`. Never panics or unwinds on engine failure.
///
/// # Safety
/// Non-null pointers must point to valid descriptions whose strings are
/// NUL-terminated and outlive the call.
pub unsafe fn compile_with(
    engine: &dyn Engine,
    source: *const SourceDescription,
    options: *const OptionsDescription,
    target: *const TargetDescription,
) -> ResultDescription {
    let outcome = compile_request(engine, source, options, target);
    debug_log_return!("[BRIDGE] compile", "{:?}", publish(outcome))
}

/// Disassembles through `engine`. Never panics or unwinds on engine failure.
///
/// # Safety
/// A non-null `source` must point to a valid description whose binary
/// buffer holds at least `binarySize` bytes for the duration of the call.
pub unsafe fn disassemble_with(
    engine: &dyn Engine,
    source: *const DisassembleDescription,
) -> ResultDescription {
    let outcome = disassemble_request(engine, source);
    debug_log_return!("[BRIDGE] disassemble", "{:?}", publish(outcome))
}
