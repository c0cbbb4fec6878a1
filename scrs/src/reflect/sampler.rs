//! Sampler reflection

use super::{Reflection, Sampler, TextureDimension, c_index, fetch_names, unsigned};
use crate::Result;
use scwrapper::GetSampler;

pub(super) fn get_sampler(reflection: &Reflection, index: u32) -> Result<Sampler> {
    let (mut ty, mut slot, mut texture_slot) = (0, 0, 0);
    let [name, original_name, texture_name] =
        fetch_names::<3, _>(|[name, original, texture], max_len| unsafe {
            GetSampler(
                reflection.raw(),
                c_index(index),
                name,
                original,
                texture,
                max_len,
                &mut ty,
                &mut slot,
                &mut texture_slot,
            )
        })?;

    Ok(Sampler {
        name,
        original_name,
        texture_name,
        ty: TextureDimension::from(ty),
        slot: unsigned(slot),
        texture_slot: unsigned(texture_slot),
    })
}
