use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Encoded frame as handed back by a render session.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    session_id: Uuid,
    bytes: Arc<Vec<u8>>,
    format: String,
    captured_at: DateTime<Utc>,
}

impl CapturedFrame {
    pub fn new(session_id: Uuid, bytes: Vec<u8>, format: impl Into<String>) -> Self {
        Self {
            session_id,
            bytes: Arc::new(bytes),
            format: format.into(),
            captured_at: Utc::now(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// File extension style format name, e.g. `png` or `jpeg`.
    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }
}

/// Decoded raster with interleaved channels, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    pub channel_count: u8,
    pub pixel_data: Vec<u8>,
}

impl RawFrame {
    pub fn new(width: u32, height: u32, channel_count: u8, pixel_data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            channel_count,
            pixel_data,
        }
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl std::fmt::Display for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
