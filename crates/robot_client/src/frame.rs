use serde_json::error::Category;

use crate::{FrameError, StreamFrame};

/// Decode one text frame of the log stream.
pub fn decode_frame(text: &str) -> Result<StreamFrame, FrameError> {
    serde_json::from_str(text).map_err(|err| match err.classify() {
        Category::Data => FrameError::Shape(err.to_string()),
        Category::Syntax | Category::Eof | Category::Io => FrameError::Syntax(err.to_string()),
    })
}
