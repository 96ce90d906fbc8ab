use crate::common::RawFrame;
use crate::error::DecodeError;

/// Turns an encoded image buffer into raw interleaved RGB samples.
pub trait FrameDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<RawFrame, DecodeError>;
    fn name(&self) -> &'static str;
}

/// Decoder backed by the `image` crate; output is always 3-channel RGB8.
#[derive(Debug, Clone, Default)]
pub struct ImageFrameDecoder;

impl ImageFrameDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl FrameDecoder for ImageFrameDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<RawFrame, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::Empty);
        }

        let rgb = image::load_from_memory(bytes)?.to_rgb8();
        let (width, height) = rgb.dimensions();
        Ok(RawFrame::new(width, height, 3, rgb.into_raw()))
    }

    fn name(&self) -> &'static str {
        "image"
    }
}
