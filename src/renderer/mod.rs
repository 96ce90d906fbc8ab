pub mod page_renderer;
pub mod snapshot_renderer;

#[cfg(test)]
pub(crate) mod fake;

pub use page_renderer::{PageRenderer, Probe, RenderSession};
pub use snapshot_renderer::SnapshotRenderer;
