use thiserror::Error;
use uuid::Uuid;

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(#[from] ConfigError),
    #[error("Render Error: {0}")]
    Render(#[from] RenderError),
    #[error("Decode Error: {0}")]
    Decode(#[from] DecodeError),
    #[error("Sample Error: {0}")]
    Sample(#[from] SampleError),
    #[error("Notification Error: {0}")]
    Notify(#[from] NotifyError),
    #[error("Machine not found: {0}")]
    MachineNotFound(String),
    #[error("Stream {stream} not found on machine {machine}")]
    StreamNotFound { machine: String, stream: String },
    #[error("No pattern configured for category '{0}'")]
    MissingPattern(String),
}

// Configuration Error Type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load settings: {0}")]
    Settings(#[from] config::ConfigError),
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to open render session: {0}")]
    Open(String),
    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },
    #[error("Navigation to {0} timed out")]
    Timeout(String),
    #[error("Failed to capture frame: {0}")]
    Capture(String),
    #[error("Render session {0} is already closed")]
    Closed(Uuid),
}

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Failed to decode frame: {0}")]
    Image(#[from] image::ImageError),
    #[error("Frame buffer is empty")]
    Empty,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SampleError {
    #[error("Check point '{point}' maps to ({x}, {y}) outside the {width}x{height} frame")]
    OutOfBounds {
        point: String,
        x: i64,
        y: i64,
        width: u32,
        height: u32,
    },
    #[error("Frame has {0} channels, at least 3 are required")]
    UnsupportedChannels(u8),
    #[error("Frame buffer holds {actual} bytes, {expected} expected")]
    Truncated { expected: usize, actual: usize },
}

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Failed to deliver notification: {0}")]
    Delivery(String),
}
