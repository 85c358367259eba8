use cqlframe_decode::DEFAULT_MAX_DEPTH;

/// Name given to every frame built by [`build_frame`](crate::build_frame).
pub const DEFAULT_FRAME_NAME: &str = "response";

/// Field preferred as the sort key when reshaping time series.
pub const DEFAULT_TIME_FIELD: &str = "time";

/// Knobs for frame assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameOptions {
    pub frame_name: String,
    /// Nesting limit handed to the composite-value decoder.
    pub max_depth: usize,
    pub time_field: String,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self {
            frame_name: DEFAULT_FRAME_NAME.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            time_field: DEFAULT_TIME_FIELD.to_string(),
        }
    }
}

impl FrameOptions {
    pub fn with_frame_name(mut self, name: impl Into<String>) -> Self {
        self.frame_name = name.into();
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_time_field(mut self, name: impl Into<String>) -> Self {
        self.time_field = name.into();
        self
    }
}
