pub mod services;
pub mod types;

pub use services::{PatternCatalog, StreamChecker};
pub use types::{CycleResult, Fleet, MatchResult, StreamCheckRecord, Verdict};
