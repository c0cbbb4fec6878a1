//! Uniform buffer and parameter reflection

use super::{
    Parameter, Reflection, ScalarType, UniformBuffer, c_index, check, fetch_names, unsigned,
};
use crate::Result;
use scwrapper::{GetParameter, GetParameterArraySize, GetUniformBuffer};

pub(super) fn get_uniform_buffer(reflection: &Reflection, index: u32) -> Result<UniformBuffer> {
    let (mut byte_size, mut slot, mut parameter_count) = (0, 0, 0);
    let [block_name, instance_name] = fetch_names::<2, _>(|[block, instance], max_len| unsafe {
        GetUniformBuffer(
            reflection.raw(),
            c_index(index),
            block,
            instance,
            max_len,
            &mut byte_size,
            &mut slot,
            &mut parameter_count,
        )
    })?;

    let parameters = (0..unsigned(parameter_count))
        .map(|parameter| get_parameter(reflection, index, parameter))
        .collect::<Result<Vec<_>>>()?;

    Ok(UniformBuffer {
        block_name,
        instance_name,
        byte_size: unsigned(byte_size),
        slot: unsigned(slot),
        parameters,
    })
}

pub(super) fn get_parameter(
    reflection: &Reflection,
    buffer_index: u32,
    parameter_index: u32,
) -> Result<Parameter> {
    let (mut ty, mut rows, mut columns, mut byte_offset, mut dimensions) = (0, 0, 0, 0, 0);
    let [name] = fetch_names::<1, _>(|[name], max_len| unsafe {
        GetParameter(
            reflection.raw(),
            c_index(buffer_index),
            c_index(parameter_index),
            name,
            max_len,
            &mut ty,
            &mut rows,
            &mut columns,
            &mut byte_offset,
            &mut dimensions,
        )
    })?;

    let array_sizes = (0..dimensions)
        .map(|dimension| -> Result<u32> {
            let mut size = 0;
            check(unsafe {
                GetParameterArraySize(
                    reflection.raw(),
                    c_index(buffer_index),
                    c_index(parameter_index),
                    dimension,
                    &mut size,
                )
            })?;
            Ok(unsigned(size))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Parameter {
        name,
        ty: ScalarType::from(ty),
        rows: unsigned(rows),
        columns: unsigned(columns),
        byte_offset: unsigned(byte_offset),
        array_sizes,
    })
}
