//! In-process engine used by the unit tests
//!
//! Recognises marker words in the shader source and answers with canned
//! output and reflection data.

use scwrapper::{
    Blob, DisassembleDesc, Engine, Error, Options, Parameter, ReflectionDesc, Result, Sampler,
    ScalarType, ShadingLanguage, SourceDesc, StageInput, StorageBuffer, TargetDesc,
    TextureDimension, Translation, UniformBuffer, register_engine,
};
use std::sync::Once;

pub const SPIRV_MAGIC: [u8; 4] = [0x03, 0x02, 0x23, 0x07];

pub const LONG_INPUT_NAME: &str = "in_var_TEXCOORD1_interpolated_world_space_normal";

pub const PIXEL_SHADER: &str = r#"
Texture2D tex : register(t0);
SamplerState samp : register(s0);
cbuffer Globals { float scale; };

float4 main(float4 pos : POSITION, float2 uv : TEXCOORD1) : SV_Target {
    return tex.Sample(samp, uv) * scale;
}
"#;

pub const ARRAY_SHADER: &str = r#"
// ARRAYS
StructuredBuffer<float> particles : register(t1);
cbuffer Globals { float scale; float4 weights[4][2]; };

float4 main(float4 pos : POSITION) : SV_Target {
    return weights[0][0] * scale * particles[0];
}
"#;

pub const BAD_SHADER: &str = "float4 main() : SV_Target { return undefined_variable; }";

pub const WARNING_SHADER: &str = "// WARNING\nfloat3 main(float4 pos : POSITION) : SV_Position { return pos; }";

pub const CRASH_SHADER: &str = "// CRASH\nfloat4 main() : SV_Target { return 0; }";

pub const ECHO_SHADER: &str = "// ECHO\n[numthreads(1, 1, 1)] void main() {}";

struct TestEngine;

/// Reflection data the engine reports for `source` compiled with `options`
pub fn reflection_for(source: &str, options: &Options) -> ReflectionDesc {
    let shift = |base: u32, by: i32| base.saturating_add_signed(by);
    let arrays = source.contains("ARRAYS");

    let mut parameters = vec![Parameter {
        name: "scale".into(),
        ty: ScalarType::Float,
        rows: 1,
        columns: 1,
        byte_offset: 0,
        array_sizes: Vec::new(),
    }];
    let mut storage_buffers = Vec::new();
    if arrays {
        parameters.push(Parameter {
            name: "weights".into(),
            ty: ScalarType::Float,
            rows: 1,
            columns: 4,
            byte_offset: 16,
            array_sizes: vec![4, 2],
        });
        storage_buffers.push(StorageBuffer {
            block_name: "type_StructuredBuffer_float".into(),
            instance_name: "particles".into(),
            byte_size: 4,
            slot: shift(1, options.shift_all_textures_bindings),
            read_only: true,
        });
    }

    ReflectionDesc {
        stage_inputs: vec![
            StageInput {
                name: "in_var_POSITION".into(),
                location: 0,
                rows: 1,
                columns: 4,
            },
            StageInput {
                name: LONG_INPUT_NAME.into(),
                location: 1,
                rows: 1,
                columns: 2,
            },
        ],
        uniform_buffers: vec![UniformBuffer {
            block_name: "type_Globals".into(),
            instance_name: "Globals".into(),
            byte_size: if arrays { 144 } else { 16 },
            slot: shift(0, options.shift_all_cbuffers_bindings),
            parameters,
        }],
        samplers: vec![Sampler {
            name: "tex".into(),
            original_name: "samp".into(),
            texture_name: "tex".into(),
            ty: TextureDimension::Texture2D,
            slot: shift(0, options.shift_all_samplers_bindings),
            texture_slot: shift(0, options.shift_all_textures_bindings),
        }],
        storage_buffers,
    }
}

impl Engine for TestEngine {
    fn compile(
        &self,
        source: &SourceDesc<'_>,
        options: &Options,
        target: &TargetDesc<'_>,
    ) -> Result<Translation> {
        let text = source.source;
        if text.contains("CRASH") {
            panic!("engine crashed");
        }
        if text.contains("undefined_variable") {
            return Ok(Translation::failed(
                "shader.hlsl(1,36): error: use of undeclared identifier 'undefined_variable'",
            ));
        }

        let output: Blob = if text.contains("ECHO") {
            format!("{:?}\nas_module: {}", options, target.as_module).into()
        } else {
            match target.language {
                ShadingLanguage::SpirV => [&SPIRV_MAGIC[..], text.as_bytes()].concat().into(),
                ShadingLanguage::Dxil => [&b"DXIL"[..], text.as_bytes()].concat().into(),
                ShadingLanguage::Glsl | ShadingLanguage::Essl => format!(
                    "#version {}\n// {} ({:?})\n",
                    target.version.unwrap_or("450"),
                    source.entry_point,
                    source.stage
                )
                .into(),
                _ => format!("// {} ({:?})\n", source.entry_point, source.stage).into(),
            }
        };

        Ok(Translation {
            target: Some(output),
            is_text: target.language.is_text(),
            error_warning_msg: text
                .contains("WARNING")
                .then(|| Blob::from("shader.hlsl(2,50): warning: implicit truncation of vector type")),
            has_error: false,
            reflection: Some(reflection_for(text, options)),
        })
    }

    fn disassemble(&self, source: &DisassembleDesc<'_>) -> Result<Translation> {
        if source.binary.is_empty() {
            return Ok(Translation::failed("empty binary"));
        }
        if !source.binary.starts_with(&SPIRV_MAGIC) {
            return Err(Error::engine("not a SPIR-V module"));
        }
        Ok(Translation {
            target: Some(Blob::from(format!(
                "; SPIR-V\n; Version: 1.0\n; Bound: {}\n",
                source.binary.len()
            ))),
            is_text: true,
            ..Default::default()
        })
    }
}

/// Registers the test engine once per test binary
pub fn setup() {
    static REGISTER: Once = Once::new();
    REGISTER.call_once(|| {
        register_engine(TestEngine).expect("first registration succeeds");
    });
}
