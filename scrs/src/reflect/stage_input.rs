//! Stage input reflection

use super::{Reflection, StageInput, c_index, fetch_names, unsigned};
use crate::Result;
use scwrapper::GetStageInput;

pub(super) fn get_stage_input(reflection: &Reflection, index: u32) -> Result<StageInput> {
    let (mut location, mut rows, mut columns) = (0, 0, 0);
    let [name] = fetch_names::<1, _>(|[name], max_len| unsafe {
        GetStageInput(
            reflection.raw(),
            c_index(index),
            name,
            max_len,
            &mut location,
            &mut rows,
            &mut columns,
        )
    })?;

    Ok(StageInput {
        name,
        location: unsigned(location),
        rows: unsigned(rows),
        columns: unsigned(columns),
    })
}
