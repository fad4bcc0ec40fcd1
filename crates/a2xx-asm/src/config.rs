use crate::limits::DEFAULT_HEAP_SIZE;

/// Per-shader construction options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderConfig {
    /// Size in bytes of the arena backing every entity and string of the shader.
    ///
    /// The arena is allocated up front and never grows; running out of it fails the builder call
    /// with [`crate::AsmError::ArenaExhausted`].
    pub heap_size: usize,
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self {
            heap_size: DEFAULT_HEAP_SIZE,
        }
    }
}
