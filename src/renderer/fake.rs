use async_trait::async_trait;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

use super::page_renderer::{PageRenderer, Probe, RenderSession};
use crate::common::{CapturedFrame, Color, Viewport};
use crate::error::RenderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Open,
    Navigate,
    Capture,
}

/// Scriptable renderer that serves PNG frames per URL and records every call.
#[derive(Clone, Default)]
pub struct FakeRenderer {
    frames: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    failures: Arc<Mutex<HashMap<String, FailAt>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(self, url: &str, image: DynamicImage) -> Self {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        self.frames.lock().unwrap().insert(url.to_string(), bytes);
        self
    }

    pub fn serve_bytes(self, url: &str, bytes: Vec<u8>) -> Self {
        self.frames.lock().unwrap().insert(url.to_string(), bytes);
        self
    }

    pub fn fail(self, url: &str, at: FailAt) -> Self {
        self.failures.lock().unwrap().insert(url.to_string(), at);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

/// Solid-colour frame.
pub fn solid(width: u32, height: u32, color: Color) -> DynamicImage {
    DynamicImage::ImageRgb8(ImageBuffer::from_pixel(
        width,
        height,
        Rgb([color.r, color.g, color.b]),
    ))
}

/// Frame split into `colors.len()` equal vertical bars.
pub fn bars(width: u32, height: u32, colors: &[Color]) -> DynamicImage {
    DynamicImage::ImageRgb8(ImageBuffer::from_fn(width, height, |x, _| {
        let idx = (x as usize * colors.len()) / width as usize;
        let c = colors[idx];
        Rgb([c.r, c.g, c.b])
    }))
}

#[async_trait]
impl PageRenderer for FakeRenderer {
    async fn open(&self) -> Result<Box<dyn RenderSession>, RenderError> {
        self.record("open".to_string());
        // Any URL scripted to fail at open makes every open fail.
        if self
            .failures
            .lock()
            .unwrap()
            .values()
            .any(|f| *f == FailAt::Open)
        {
            return Err(RenderError::Open("renderer binary missing".to_string()));
        }
        Ok(Box::new(FakeSession {
            id: Uuid::new_v4(),
            renderer: self.clone(),
            url: None,
        }))
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

struct FakeSession {
    id: Uuid,
    renderer: FakeRenderer,
    url: Option<String>,
}

impl FakeSession {
    fn failure(&self, url: &str) -> Option<FailAt> {
        self.renderer.failures.lock().unwrap().get(url).copied()
    }
}

#[async_trait]
impl RenderSession for FakeSession {
    fn id(&self) -> Uuid {
        self.id
    }

    async fn navigate(&mut self, url: &str, _timeout: Duration) -> Result<(), RenderError> {
        self.renderer.record(format!("navigate {url}"));
        if self.failure(url) == Some(FailAt::Navigate) {
            return Err(RenderError::Navigation {
                url: url.to_string(),
                reason: "connection refused".to_string(),
            });
        }
        self.url = Some(url.to_string());
        Ok(())
    }

    async fn probe_video(&mut self, _timeout: Duration) -> Probe {
        self.renderer.record("probe".to_string());
        Probe::Found
    }

    async fn capture_frame(&mut self) -> Result<CapturedFrame, RenderError> {
        self.renderer.record("capture".to_string());
        let url = self.url.clone().unwrap_or_default();
        if self.failure(&url) == Some(FailAt::Capture) {
            return Err(RenderError::Capture("page crashed".to_string()));
        }
        let bytes = self
            .renderer
            .frames
            .lock()
            .unwrap()
            .get(&url)
            .cloned()
            .unwrap_or_default();
        Ok(CapturedFrame::new(self.id, bytes, "png"))
    }

    fn viewport_size(&self) -> Viewport {
        let frames = self.renderer.frames.lock().unwrap();
        self.url
            .as_ref()
            .and_then(|url| frames.get(url))
            .and_then(|bytes| image::load_from_memory(bytes).ok())
            .map(|img| Viewport::new(img.width(), img.height()))
            .unwrap_or(Viewport::new(1920, 1080))
    }

    async fn close(&mut self) -> Result<(), RenderError> {
        self.renderer.record("close".to_string());
        Ok(())
    }
}
