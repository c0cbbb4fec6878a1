//! Integration tests for the scwrapper C ABI
//!
//! A fixture engine stands in for the real compiler. It recognises a handful
//! of marker words in the shader source and answers with canned output and
//! reflection data, so the tests exercise the exported entry points exactly
//! as a foreign caller would.

#![allow(unsafe_op_in_unsafe_fn)]

use scwrapper::*;
use std::ffi::{CStr, c_char, c_void};
use std::ptr;
use std::sync::Once;

struct FixtureEngine;

const LONG_NAME: &str = "in_var_TEXCOORD_with_a_rather_long_semantic_name";

impl FixtureEngine {
    fn reflection(source: &str, options: &Options) -> ReflectionDesc {
        let shift = |base: u32, by: i32| base.saturating_add_signed(by);

        let mut parameters = vec![Parameter {
            name: "scale".into(),
            ty: ScalarType::Float,
            rows: 1,
            columns: 1,
            byte_offset: 0,
            array_sizes: Vec::new(),
        }];
        if source.contains("ARRAYS") {
            parameters.push(Parameter {
                name: "weights".into(),
                ty: ScalarType::Float,
                rows: 1,
                columns: 4,
                byte_offset: 16,
                array_sizes: vec![4, 2],
            });
        }

        let mut storage_buffers = Vec::new();
        if source.contains("STORAGE") {
            storage_buffers.push(StorageBuffer {
                block_name: "type_StructuredBuffer_float".into(),
                instance_name: "particles".into(),
                byte_size: 4,
                slot: shift(1, options.shift_all_uabuffers_bindings),
                read_only: true,
            });
        }

        let input_name = if source.contains("LONG_NAMES") {
            LONG_NAME
        } else {
            "in_var_POSITION"
        };

        ReflectionDesc {
            stage_inputs: vec![StageInput {
                name: input_name.into(),
                location: 0,
                rows: 1,
                columns: 4,
            }],
            uniform_buffers: vec![UniformBuffer {
                block_name: "type_Globals".into(),
                instance_name: "Globals".into(),
                byte_size: if source.contains("ARRAYS") { 144 } else { 16 },
                slot: shift(0, options.shift_all_cbuffers_bindings),
                parameters,
            }],
            samplers: vec![Sampler {
                name: "tex_samp".into(),
                original_name: "samp".into(),
                texture_name: "tex".into(),
                ty: TextureDimension::Texture2D,
                slot: shift(0, options.shift_all_samplers_bindings),
                texture_slot: shift(0, options.shift_all_textures_bindings),
            }],
            storage_buffers,
        }
    }
}

impl Engine for FixtureEngine {
    fn compile(
        &self,
        source: &SourceDesc<'_>,
        options: &Options,
        target: &TargetDesc<'_>,
    ) -> Result<Translation> {
        let text = source.source;
        if text.contains("THROW") {
            return Err(Error::engine("fixture: unsupported intrinsic 'THROW'"));
        }
        if text.contains("PANIC") {
            panic!("fixture engine crashed");
        }
        if text.contains("SYNTAX_ERROR") || !text.contains(source.entry_point) {
            return Ok(Translation::failed(format!(
                "shader.hlsl(1,1): error: cannot compile entry point '{}'",
                source.entry_point
            )));
        }

        let output = if text.contains("ECHO_OPTIONS") {
            format!("{:?}\n{:?}\n{:?}", source.stage, options, target)
        } else {
            format!("// {:?} for {}\n", target.language, source.entry_point)
        };
        let warnings = text
            .contains("WARN")
            .then(|| Blob::from("shader.hlsl(3,5): warning: implicit truncation of vector type"));

        Ok(Translation {
            target: Some(Blob::from(output)),
            is_text: target.language.is_text(),
            error_warning_msg: warnings,
            has_error: false,
            reflection: Some(Self::reflection(text, options)),
        })
    }

    fn disassemble(&self, source: &DisassembleDesc<'_>) -> Result<Translation> {
        match source.binary {
            [] => Ok(Translation::failed("nothing to disassemble")),
            [b'B', b'A', b'D', b'!', ..] => Err(Error::engine("fixture: unknown container format")),
            [b'B', b'O', b'O', b'M', ..] => panic!("fixture disassembler crashed"),
            bytes => Ok(Translation {
                target: Some(Blob::from(format!(
                    "; {:?} disassembly, {} bytes",
                    source.language,
                    bytes.len()
                ))),
                is_text: true,
                ..Default::default()
            }),
        }
    }
}

fn setup() {
    static REGISTER: Once = Once::new();
    REGISTER.call_once(|| {
        register_engine(FixtureEngine).expect("first registration succeeds");
    });
}

// Minimal pass-through pixel shader: one scalar uniform, one texture/sampler pair
const PASS_THROUGH: &CStr = c"
Texture2D tex : register(t0);
SamplerState samp : register(s0);
cbuffer Globals { float scale; };

float4 main(float4 pos : POSITION) : SV_Target {
    return tex.Sample(samp, pos.xy) * scale;
}
";

/// Helper to get blob contents
unsafe fn blob_bytes(blob: BlobHandle) -> Vec<u8> {
    let size = GetShaderConductorBlobSize(blob);
    let data = GetShaderConductorBlobData(blob);
    if data.is_null() || size <= 0 {
        return Vec::new();
    }
    std::slice::from_raw_parts(data as *const u8, size as usize).to_vec()
}

/// Helper to get blob contents as text
unsafe fn blob_text(blob: BlobHandle) -> String {
    String::from_utf8_lossy(&blob_bytes(blob)).into_owned()
}

fn c_str(buffer: &[c_char]) -> String {
    unsafe { CStr::from_ptr(buffer.as_ptr()) }
        .to_string_lossy()
        .into_owned()
}

fn source(text: &'static CStr, stage: ShaderStage) -> SourceDescription {
    SourceDescription {
        source: text.as_ptr(),
        entryPoint: c"main".as_ptr(),
        stage: stage as i32,
    }
}

fn glsl_target() -> TargetDescription {
    TargetDescription {
        language: ShadingLanguage::Glsl as i32,
        version: c"450".as_ptr(),
        asModule: false,
    }
}

unsafe fn compile(source: &SourceDescription, options: &OptionsDescription) -> ResultDescription {
    setup();
    let mut result = ResultDescription::null();
    Compile(source, options, &glsl_target(), &mut result);
    result
}

unsafe fn compile_source(text: &'static CStr) -> ResultDescription {
    compile(
        &source(text, ShaderStage::Pixel),
        &OptionsDescription::default(),
    )
}

#[test]
fn test_compile_pass_through_shader() {
    unsafe {
        let mut result = compile_source(PASS_THROUGH);

        assert!(!result.hasError, "Compile failed: {}", blob_text(result.errorWarningMsg));
        assert!(!result.target.is_null(), "Target blob should not be null");
        assert!(result.isText, "GLSL output is text");
        assert!(result.errorWarningMsg.is_null(), "No diagnostics expected");
        assert_eq!(blob_text(result.target), "// Glsl for main\n");

        assert_eq!(GetStageInputCount(&result), 1);
        assert_eq!(GetUniformBufferCount(&result), 1);
        assert_eq!(GetSamplerCount(&result), 1);
        assert_eq!(GetStorageBufferCount(&result), 0);

        DestroyShaderConductorResult(&mut result);
    }
}

#[test]
fn test_binary_target_is_not_text() {
    setup();
    unsafe {
        let target = TargetDescription {
            language: ShadingLanguage::SpirV as i32,
            version: ptr::null(),
            asModule: false,
        };
        let mut result = ResultDescription::null();
        Compile(
            &source(PASS_THROUGH, ShaderStage::Pixel),
            &OptionsDescription::default(),
            &target,
            &mut result,
        );

        assert!(!result.hasError);
        assert!(!result.isText, "SPIR-V output is binary");
        DestroyShaderConductorResult(&mut result);
    }
}

#[test]
fn test_uniform_parameter_and_sampler_reflection() {
    unsafe {
        let mut result = compile_source(PASS_THROUGH);
        assert!(!result.hasError);

        let mut block = [0 as c_char; 64];
        let mut instance = [0 as c_char; 64];
        let (mut byte_size, mut slot, mut parameter_count) = (0, -1, 0);
        let status = GetUniformBuffer(
            &result,
            0,
            block.as_mut_ptr(),
            instance.as_mut_ptr(),
            64,
            &mut byte_size,
            &mut slot,
            &mut parameter_count,
        );
        assert_eq!(status, "type_Globals".len() as i32 + 1);
        assert_eq!(c_str(&block), "type_Globals");
        assert_eq!(c_str(&instance), "Globals");
        assert_eq!((byte_size, slot, parameter_count), (16, 0, 1));

        let mut name = [0 as c_char; 64];
        let (mut ty, mut rows, mut columns, mut offset, mut dimensions) = (-1, 0, 0, -1, -1);
        let status = GetParameter(
            &result,
            0,
            0,
            name.as_mut_ptr(),
            64,
            &mut ty,
            &mut rows,
            &mut columns,
            &mut offset,
            &mut dimensions,
        );
        assert!(status >= 0, "GetParameter failed: {}", status);
        assert_eq!(c_str(&name), "scale");
        assert_eq!(ScalarType::from(ty), ScalarType::Float);
        assert_eq!((rows, columns, offset, dimensions), (1, 1, 0, 0));

        let mut sampler = [0 as c_char; 64];
        let mut original = [0 as c_char; 64];
        let mut texture = [0 as c_char; 64];
        let (mut ty, mut slot, mut texture_slot) = (-1, -1, -1);
        let status = GetSampler(
            &result,
            0,
            sampler.as_mut_ptr(),
            original.as_mut_ptr(),
            texture.as_mut_ptr(),
            64,
            &mut ty,
            &mut slot,
            &mut texture_slot,
        );
        // Longest of the three names plus terminator
        assert_eq!(status, "tex_samp".len() as i32 + 1);
        assert_eq!(c_str(&sampler), "tex_samp");
        assert_eq!(c_str(&original), "samp");
        assert_eq!(c_str(&texture), "tex");
        assert_eq!(TextureDimension::from(ty), TextureDimension::Texture2D);
        assert_eq!((slot, texture_slot), (0, 0));

        let mut input = [0 as c_char; 64];
        let (mut location, mut rows, mut columns) = (-1, 0, 0);
        let status = GetStageInput(
            &result,
            0,
            input.as_mut_ptr(),
            64,
            &mut location,
            &mut rows,
            &mut columns,
        );
        assert!(status >= 0);
        assert_eq!(c_str(&input), "in_var_POSITION");
        assert_eq!((location, rows, columns), (0, 1, 4));

        DestroyShaderConductorResult(&mut result);
    }
}

#[test]
fn test_binding_shifts_reach_the_engine() {
    unsafe {
        let options = OptionsDescription {
            shiftAllTexturesBindings: 8,
            shiftAllSamplersBindings: 4,
            shiftAllCBuffersBindings: 2,
            shiftAllUABuffersBindings: 16,
            ..Default::default()
        };
        let mut result = compile(&source(c"STORAGE main", ShaderStage::Compute), &options);
        assert!(!result.hasError);

        let (mut slot, mut texture_slot) = (0, 0);
        GetSampler(
            &result,
            0,
            ptr::null_mut(),
            ptr::null_mut(),
            ptr::null_mut(),
            0,
            ptr::null_mut(),
            &mut slot,
            &mut texture_slot,
        );
        assert_eq!((slot, texture_slot), (4, 8));

        let mut cbuffer_slot = 0;
        GetUniformBuffer(
            &result,
            0,
            ptr::null_mut(),
            ptr::null_mut(),
            0,
            ptr::null_mut(),
            &mut cbuffer_slot,
            ptr::null_mut(),
        );
        assert_eq!(cbuffer_slot, 2);

        let mut block = [0 as c_char; 64];
        let mut instance = [0 as c_char; 64];
        let (mut byte_size, mut uav_slot, mut read_only) = (0, 0, false);
        let status = GetStorageBuffer(
            &result,
            0,
            block.as_mut_ptr(),
            instance.as_mut_ptr(),
            64,
            &mut byte_size,
            &mut uav_slot,
            &mut read_only,
        );
        assert!(status >= 0);
        assert_eq!(c_str(&block), "type_StructuredBuffer_float");
        assert_eq!(c_str(&instance), "particles");
        assert_eq!((byte_size, uav_slot, read_only), (4, 17, true));

        DestroyShaderConductorResult(&mut result);
    }
}

#[test]
fn test_options_are_passed_through() {
    unsafe {
        let options = OptionsDescription {
            packMatricesInRowMajor: false,
            enable16bitTypes: true,
            enableDebugInfo: true,
            optimizationLevel: 1,
            shaderModel: ShaderModelDescription { major: 6, minor: 2 },
            ..Default::default()
        };
        let mut result = compile(&source(c"ECHO_OPTIONS main", ShaderStage::Vertex), &options);
        assert!(!result.hasError);

        let echoed = blob_text(result.target);
        println!("Engine saw:\n{}", echoed);
        assert!(echoed.starts_with("Vertex\n"));
        assert!(echoed.contains("pack_matrices_in_row_major: false"));
        assert!(echoed.contains("enable_16bit_types: true"));
        assert!(echoed.contains("enable_debug_info: true"));
        assert!(echoed.contains("optimization_level: 1"));
        assert!(echoed.contains("ShaderModel { major: 6, minor: 2 }"));
        assert!(echoed.contains("version: Some(\"450\")"));

        DestroyShaderConductorResult(&mut result);
    }
}

#[test]
fn test_default_options() {
    let options = OptionsDescription::default();
    assert!(options.packMatricesInRowMajor);
    assert!(!options.enable16bitTypes);
    assert!(!options.enableDebugInfo);
    assert!(!options.disableOptimizations);
    assert_eq!(options.optimizationLevel, 3);
    assert_eq!(options.shaderModel, ShaderModelDescription { major: 6, minor: 0 });
}

#[test]
fn test_engine_error_is_reported_in_band() {
    unsafe {
        let mut result = compile_source(c"THROW main");

        assert!(result.hasError, "Engine failure should set hasError");
        assert!(!result.errorWarningMsg.is_null(), "Should have error blob");
        let message = blob_text(result.errorWarningMsg);
        assert_eq!(message, "fixture: unsupported intrinsic 'THROW'");
        assert!(result.target.is_null());
        assert!(result.reflection.is_null());
        assert_eq!(GetStageInputCount(&result), 0);

        DestroyShaderConductorResult(&mut result);
    }
}

#[test]
fn test_engine_panic_is_reported_in_band() {
    unsafe {
        let mut result = compile_source(c"PANIC main");

        assert!(result.hasError);
        let message = blob_text(result.errorWarningMsg);
        assert!(message.contains("fixture engine crashed"), "Got: {}", message);

        DestroyShaderConductorResult(&mut result);
    }
}

#[test]
fn test_compile_error_diagnostics() {
    unsafe {
        let mut result = compile(
            &SourceDescription {
                entryPoint: c"vs_main".as_ptr(),
                ..source(PASS_THROUGH, ShaderStage::Vertex)
            },
            &OptionsDescription::default(),
        );

        assert!(result.hasError);
        let message = blob_text(result.errorWarningMsg);
        assert!(message.contains("vs_main"), "Error should name the entry point: {}", message);
        println!("Got expected error: {}", message.trim());

        DestroyShaderConductorResult(&mut result);
    }
}

#[test]
fn test_warnings_on_success() {
    unsafe {
        let mut result = compile_source(c"WARN main");

        assert!(!result.hasError);
        assert!(!result.target.is_null());
        assert!(blob_text(result.errorWarningMsg).contains("warning: implicit truncation"));

        DestroyShaderConductorResult(&mut result);
    }
}

#[test]
fn test_invalid_descriptions_are_reported_in_band() {
    unsafe {
        let mut result = compile(
            &SourceDescription {
                stage: 17,
                ..source(PASS_THROUGH, ShaderStage::Pixel)
            },
            &OptionsDescription::default(),
        );
        assert!(result.hasError);
        assert_eq!(blob_text(result.errorWarningMsg), "Invalid shader stage: 17");
        DestroyShaderConductorResult(&mut result);

        let options = OptionsDescription {
            shaderModel: ShaderModelDescription { major: 6, minor: -1 },
            ..Default::default()
        };
        let mut result = compile(&source(PASS_THROUGH, ShaderStage::Pixel), &options);
        assert!(result.hasError);
        assert_eq!(
            blob_text(result.errorWarningMsg),
            "shader model minor version out of range: -1"
        );
        DestroyShaderConductorResult(&mut result);

        let target = TargetDescription {
            language: 99,
            ..glsl_target()
        };
        let mut result = ResultDescription::null();
        Compile(
            &source(PASS_THROUGH, ShaderStage::Pixel),
            &OptionsDescription::default(),
            &target,
            &mut result,
        );
        assert!(result.hasError);
        assert_eq!(blob_text(result.errorWarningMsg), "Invalid shading language: 99");
        DestroyShaderConductorResult(&mut result);

        let mut result = ResultDescription::null();
        Compile(
            &source(PASS_THROUGH, ShaderStage::Pixel),
            ptr::null(),
            &glsl_target(),
            &mut result,
        );
        assert!(result.hasError);
        assert_eq!(blob_text(result.errorWarningMsg), "Null pointer: options");
        DestroyShaderConductorResult(&mut result);
    }
}

#[test]
fn test_null_result_pointer_is_ignored() {
    setup();
    unsafe {
        Compile(
            &source(PASS_THROUGH, ShaderStage::Pixel),
            &OptionsDescription::default(),
            &glsl_target(),
            ptr::null_mut(),
        );
        Disassemble(ptr::null(), ptr::null_mut());
        DestroyShaderConductorResult(ptr::null_mut());
    }
}

#[test]
fn test_blob_round_trip() {
    unsafe {
        let data: Vec<u8> = (0..=255).collect();
        let blob = CreateShaderConductorBlob(data.as_ptr() as *const c_void, 200);

        assert!(!blob.is_null());
        assert_eq!(GetShaderConductorBlobSize(blob), 200);
        assert_eq!(blob_bytes(blob), &data[..200]);

        DestroyShaderConductorBlob(blob);
    }
}

#[test]
fn test_stale_blob_handle_is_rejected() {
    unsafe {
        let blob = CreateShaderConductorBlob(b"abcd".as_ptr() as *const c_void, 4);
        DestroyShaderConductorBlob(blob);

        // The slot may already hold another blob; the old handle must not reach it
        let other = CreateShaderConductorBlob(b"efgh".as_ptr() as *const c_void, 4);
        assert_ne!(blob, other);
        assert_eq!(GetShaderConductorBlobSize(blob), 0);
        assert!(GetShaderConductorBlobData(blob).is_null());
        DestroyShaderConductorBlob(blob);
        assert_eq!(blob_bytes(other), b"efgh");

        DestroyShaderConductorBlob(other);
    }
}

#[test]
fn test_handles_do_not_cross_tables() {
    unsafe {
        let mut result = compile_source(PASS_THROUGH);
        let reflection = result.reflection;
        let blob = CreateShaderConductorBlob(b"abcd".as_ptr() as *const c_void, 4);
        assert_ne!(blob.to_bits(), reflection.to_bits());

        // Reflection handle used as a blob
        let foreign = BlobHandle::from_bits(reflection.to_bits());
        assert_eq!(GetShaderConductorBlobSize(foreign), 0);
        assert!(GetShaderConductorBlobData(foreign).is_null());
        DestroyShaderConductorBlob(foreign);
        assert_eq!(GetUniformBufferCount(&result), 1);

        // Blob handle used as a reflection
        let foreign = ReflectionHandle::from_bits(blob.to_bits());
        let borrowed = ResultDescription {
            reflection: foreign,
            ..ResultDescription::null()
        };
        assert_eq!(GetUniformBufferCount(&borrowed), 0);
        DestroyShaderConductorReflection(foreign);
        assert_eq!(blob_bytes(blob), b"abcd");

        DestroyShaderConductorBlob(blob);
        DestroyShaderConductorResult(&mut result);
    }
}

#[test]
fn test_accessors_are_idempotent() {
    unsafe {
        let mut result = compile_source(c"ARRAYS main");

        let read = |index| {
            let mut name = [0 as c_char; 32];
            let mut fields = [0i32; 5];
            let [ty, rows, columns, offset, dims] = &mut fields;
            let status = GetParameter(
                &result, 0, index, name.as_mut_ptr(), 32, ty, rows, columns, offset, dims,
            );
            (status, c_str(&name), fields)
        };

        for index in 0..2 {
            assert_eq!(read(index), read(index));
        }
        assert_eq!(GetUniformBufferCount(&result), GetUniformBufferCount(&result));

        DestroyShaderConductorResult(&mut result);
    }
}

#[test]
fn test_parameter_array_sizes() {
    unsafe {
        let mut result = compile_source(c"ARRAYS main");

        let mut dimensions = 0;
        GetParameter(
            &result,
            0,
            1,
            ptr::null_mut(),
            0,
            ptr::null_mut(),
            ptr::null_mut(),
            ptr::null_mut(),
            ptr::null_mut(),
            &mut dimensions,
        );
        assert_eq!(dimensions, 2);

        let sizes: Vec<i32> = (0..dimensions)
            .map(|dimension| {
                let mut size = 0;
                assert_eq!(GetParameterArraySize(&result, 0, 1, dimension, &mut size), 0);
                size
            })
            .collect();
        assert_eq!(sizes, [4, 2]);

        let mut size = 7;
        assert_eq!(
            GetParameterArraySize(&result, 0, 1, 2, &mut size),
            Status::IndexOutOfRange.code()
        );
        assert_eq!(size, 0);

        // Scalars have no dimensions at all
        assert_eq!(
            GetParameterArraySize(&result, 0, 0, 0, &mut size),
            Status::IndexOutOfRange.code()
        );

        DestroyShaderConductorResult(&mut result);
    }
}

#[test]
fn test_name_truncation_never_overflows() {
    unsafe {
        let mut result = compile_source(c"LONG_NAMES main");

        // Buffer is larger than declared; bytes past the declared length are sentinels
        let mut buffer = [0x5a as c_char; 32];
        let mut location = -1;
        let required = GetStageInput(
            &result,
            0,
            buffer.as_mut_ptr(),
            8,
            &mut location,
            ptr::null_mut(),
            ptr::null_mut(),
        );

        assert_eq!(required, LONG_NAME.len() as i32 + 1);
        assert!(required > 8, "Return value should signal truncation");
        assert_eq!(c_str(&buffer), &LONG_NAME[..7]);
        assert!(buffer[8..].iter().all(|&b| b == 0x5a), "Wrote past maxNameLength");
        assert_eq!(location, 0);

        // Retry with the reported length
        let mut buffer = vec![0 as c_char; required as usize];
        let again = GetStageInput(
            &result,
            0,
            buffer.as_mut_ptr(),
            required,
            ptr::null_mut(),
            ptr::null_mut(),
            ptr::null_mut(),
        );
        assert_eq!(again, required);
        assert_eq!(c_str(&buffer), LONG_NAME);

        DestroyShaderConductorResult(&mut result);
    }
}

#[test]
fn test_length_query() {
    unsafe {
        let mut result = compile_source(PASS_THROUGH);

        let required = GetUniformBuffer(
            &result,
            0,
            ptr::null_mut(),
            ptr::null_mut(),
            0,
            ptr::null_mut(),
            ptr::null_mut(),
            ptr::null_mut(),
        );
        assert_eq!(required, "type_Globals".len() as i32 + 1);

        DestroyShaderConductorResult(&mut result);
    }
}

#[test]
fn test_out_of_range_index_zero_fills() {
    unsafe {
        let mut result = compile_source(PASS_THROUGH);

        for index in [1, -1, i32::MAX] {
            let mut name = [0x41 as c_char; 16];
            let (mut location, mut rows, mut columns) = (9, 9, 9);
            let status = GetStageInput(
                &result,
                index,
                name.as_mut_ptr(),
                16,
                &mut location,
                &mut rows,
                &mut columns,
            );
            assert_eq!(Status::from_code(status), Some(Status::IndexOutOfRange));
            assert_eq!(c_str(&name), "");
            assert_eq!((location, rows, columns), (0, 0, 0));
        }

        let mut slot = 5;
        let status = GetParameter(
            &result,
            0,
            3,
            ptr::null_mut(),
            0,
            ptr::null_mut(),
            ptr::null_mut(),
            ptr::null_mut(),
            ptr::null_mut(),
            &mut slot,
        );
        assert_eq!(status, Status::IndexOutOfRange.code());
        assert_eq!(slot, 0);

        DestroyShaderConductorResult(&mut result);
    }
}

#[test]
fn test_destroy_result_releases_everything() {
    unsafe {
        let mut result = compile_source(c"WARN main");
        let copy = result;
        assert!(!copy.target.is_null());
        assert!(!copy.reflection.is_null());

        DestroyShaderConductorResult(&mut result);
        assert_eq!(result, ResultDescription::null());

        // The stale copy no longer reaches any data
        assert_eq!(GetShaderConductorBlobSize(copy.target), 0);
        assert_eq!(GetShaderConductorBlobSize(copy.errorWarningMsg), 0);
        assert_eq!(GetSamplerCount(&copy), 0);
        let status = GetSampler(
            &copy,
            0,
            ptr::null_mut(),
            ptr::null_mut(),
            ptr::null_mut(),
            0,
            ptr::null_mut(),
            ptr::null_mut(),
            ptr::null_mut(),
        );
        assert_eq!(status, Status::NoReflection.code());

        // Releasing twice is harmless
        let mut copy = copy;
        DestroyShaderConductorResult(&mut copy);
    }
}

#[test]
fn test_reflection_released_on_its_own() {
    unsafe {
        let mut result = compile_source(PASS_THROUGH);
        let target = result.target;

        DestroyShaderConductorReflection(result.reflection);
        assert_eq!(GetUniformBufferCount(&result), 0);
        assert_eq!(GetStorageBufferCount(&result), 0);
        // The blobs are unaffected
        assert_eq!(blob_text(target), "// Glsl for main\n");

        DestroyShaderConductorResult(&mut result);
    }
}

#[test]
fn test_null_result_counts_are_zero() {
    unsafe {
        assert_eq!(GetStageInputCount(ptr::null()), 0);
        assert_eq!(GetUniformBufferCount(ptr::null()), 0);
        assert_eq!(GetSamplerCount(ptr::null()), 0);
        assert_eq!(GetStorageBufferCount(ptr::null()), 0);

        let mut read_only = true;
        let status = GetStorageBuffer(
            ptr::null(),
            0,
            ptr::null_mut(),
            ptr::null_mut(),
            0,
            ptr::null_mut(),
            ptr::null_mut(),
            &mut read_only,
        );
        assert_eq!(status, Status::NoReflection.code());
        assert!(!read_only);
    }
}

unsafe fn disassemble(bytes: &[u8]) -> ResultDescription {
    setup();
    let source = DisassembleDescription {
        language: ShadingLanguage::SpirV as i32,
        binary: bytes.as_ptr(),
        binarySize: bytes.len() as i32,
    };
    let mut result = ResultDescription::null();
    Disassemble(&source, &mut result);
    result
}

#[test]
fn test_disassemble() {
    unsafe {
        let mut result = disassemble(&[0x03, 0x02, 0x23, 0x07, 0, 0, 1, 0]);

        assert!(!result.hasError);
        assert!(result.isText);
        assert!(result.reflection.is_null(), "Disassembly has no reflection");
        assert_eq!(blob_text(result.target), "; SpirV disassembly, 8 bytes");

        DestroyShaderConductorResult(&mut result);
    }
}

#[test]
fn test_disassemble_failures_are_in_band() {
    unsafe {
        let mut result = disassemble(b"BAD!....");
        assert!(result.hasError);
        assert_eq!(
            blob_text(result.errorWarningMsg),
            "fixture: unknown container format"
        );
        DestroyShaderConductorResult(&mut result);

        let mut result = disassemble(b"BOOM");
        assert!(result.hasError);
        assert!(blob_text(result.errorWarningMsg).contains("fixture disassembler crashed"));
        DestroyShaderConductorResult(&mut result);

        let mut result = disassemble(&[]);
        assert!(result.hasError);
        assert_eq!(blob_text(result.errorWarningMsg), "nothing to disassemble");
        assert!(result.target.is_null());
        DestroyShaderConductorResult(&mut result);
    }
}

#[test]
fn test_disassemble_rejects_null_binary() {
    setup();
    unsafe {
        let source = DisassembleDescription {
            language: ShadingLanguage::Dxil as i32,
            binary: ptr::null(),
            binarySize: 16,
        };
        let mut result = ResultDescription::null();
        Disassemble(&source, &mut result);

        assert!(result.hasError);
        assert_eq!(blob_text(result.errorWarningMsg), "Null pointer: binary");
        DestroyShaderConductorResult(&mut result);
    }
}
