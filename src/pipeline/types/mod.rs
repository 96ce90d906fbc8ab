mod analyzed_pixel;
mod check_point;
mod cycle_result;
mod fleet;
mod match_result;
mod stream_record;

pub use analyzed_pixel::AnalyzedPixel;
pub use check_point::{CheckPoint, Pattern, PatternCategory};
pub use cycle_result::{CycleResult, MachineResult};
pub use fleet::{Fleet, MachineConfig, StreamConfig};
pub use match_result::{ErrorType, MatchResult, PointDetail, Verdict};
pub use stream_record::StreamCheckRecord;
