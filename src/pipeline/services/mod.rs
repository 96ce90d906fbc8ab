pub mod image;
pub mod patterns;
pub mod stream_checker;

pub use patterns::PatternCatalog;
pub use stream_checker::{CheckerOptions, StreamChecker};
