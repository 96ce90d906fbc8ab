pub mod color;
pub mod frame;

pub use color::{AbsolutePosition, Color, RelativePosition};
pub use frame::{CapturedFrame, RawFrame, Viewport};
