pub mod frame_decoder;
pub mod geometry;
pub mod pattern_matcher;
pub mod pixel_sampler;

pub use frame_decoder::{FrameDecoder, ImageFrameDecoder};
pub use geometry::to_absolute;
pub use pattern_matcher::{MatchThresholds, PatternMatcher};
pub use pixel_sampler::PixelSampler;
