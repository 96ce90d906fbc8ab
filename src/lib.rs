pub mod common;
pub mod config;
pub mod error;
pub mod notify;
pub mod pipeline;
pub mod renderer;
pub mod scheduler;

pub use config::Configuration;
pub use error::{AppError, ConfigError, DecodeError, NotifyError, RenderError, SampleError};

pub use scheduler::{Monitor, MonitorState, SchedulerBuilder};
