//! Compile flags

use bitflags::bitflags;

bitflags! {
    /// Boolean compile options
    ///
    /// Each flag maps onto one boolean field of the wrapper's
    /// `OptionsDescription`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CompileFlags: u32 {
        /// Pack matrices in row-major order (default)
        const PACK_MATRICES_IN_ROW_MAJOR = 1 << 0;

        /// Allow 16-bit scalar types. Requires shader model 6.2 or newer
        const ENABLE_16BIT_TYPES = 1 << 1;

        /// Embed source-level debug information
        const ENABLE_DEBUG_INFO = 1 << 2;

        /// Skip optimization passes; the optimization level is ignored
        const DISABLE_OPTIMIZATIONS = 1 << 3;
    }
}

impl Default for CompileFlags {
    fn default() -> Self {
        CompileFlags::PACK_MATRICES_IN_ROW_MAJOR
    }
}
