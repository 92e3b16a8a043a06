/// Configuration for a row-to-JSON serializer.
#[derive(Clone, Debug)]
pub struct SerializerConfig {
    /// Maximum number of nested JSON containers (objects and arrays) a
    /// single call may open. Row types nested deeper than this are rejected
    /// before any recursive walk starts. Default: 256.
    pub max_depth: usize,
    /// Initial capacity in bytes of the output buffer. Default: 40.
    pub initial_capacity: usize,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            max_depth: 256,
            initial_capacity: 40,
        }
    }
}
