use async_trait::async_trait;
use std::time::Duration;
use uuid::Uuid;

use crate::common::{CapturedFrame, Viewport};
use crate::error::RenderError;

/// Outcome of a best-effort wait for the video surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    Found,
    NotFound,
}

/// Hands out render sessions, one per stream check.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn open(&self) -> Result<Box<dyn RenderSession>, RenderError>;
    fn name(&self) -> &'static str;
}

/// A page loaded in a renderer. Must be closed by whoever opened it.
#[async_trait]
pub trait RenderSession: Send {
    fn id(&self) -> Uuid;

    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), RenderError>;

    /// Waits up to `timeout` for a video surface. Players embedded in iframes
    /// or custom widgets never show one, so `NotFound` is not an error.
    async fn probe_video(&mut self, _timeout: Duration) -> Probe {
        Probe::NotFound
    }

    async fn capture_frame(&mut self) -> Result<CapturedFrame, RenderError>;

    fn viewport_size(&self) -> Viewport;

    async fn close(&mut self) -> Result<(), RenderError>;
}
