//! Storage buffer reflection

use super::{Reflection, StorageBuffer, c_index, fetch_names, unsigned};
use crate::Result;
use scwrapper::GetStorageBuffer;

pub(super) fn get_storage_buffer(reflection: &Reflection, index: u32) -> Result<StorageBuffer> {
    let (mut byte_size, mut slot, mut read_only) = (0, 0, false);
    let [block_name, instance_name] = fetch_names::<2, _>(|[block, instance], max_len| unsafe {
        GetStorageBuffer(
            reflection.raw(),
            c_index(index),
            block,
            instance,
            max_len,
            &mut byte_size,
            &mut slot,
            &mut read_only,
        )
    })?;

    Ok(StorageBuffer {
        block_name,
        instance_name,
        byte_size: unsigned(byte_size),
        slot: unsigned(slot),
        read_only,
    })
}
