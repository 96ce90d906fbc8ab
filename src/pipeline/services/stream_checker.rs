use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, instrument, warn};

use super::image::{FrameDecoder, PatternMatcher, PixelSampler};
use super::patterns::PatternCatalog;
use crate::common::{CapturedFrame, Viewport};
use crate::error::{AppError, RenderError};
use crate::pipeline::types::{MachineConfig, MatchResult, StreamCheckRecord, StreamConfig};
use crate::renderer::{PageRenderer, Probe, RenderSession};

/// Timing and capture knobs for a single stream check.
#[derive(Debug, Clone)]
pub struct CheckerOptions {
    pub navigation_timeout: Duration,
    pub probe_timeout: Duration,
    /// Pause after the page loads so the player can start drawing frames.
    pub settle_delay: Duration,
    pub debug_capture_dir: Option<PathBuf>,
}

impl Default for CheckerOptions {
    fn default() -> Self {
        Self {
            navigation_timeout: Duration::from_secs(30),
            probe_timeout: Duration::from_secs(5),
            settle_delay: Duration::from_secs(5),
            debug_capture_dir: None,
        }
    }
}

/// Runs one capture-decode-sample-match cycle for a stream.
pub struct StreamChecker {
    renderer: Arc<dyn PageRenderer>,
    decoder: Arc<dyn FrameDecoder>,
    sampler: PixelSampler,
    matcher: PatternMatcher,
    patterns: Arc<PatternCatalog>,
    options: CheckerOptions,
}

impl StreamChecker {
    pub fn new(
        renderer: Arc<dyn PageRenderer>,
        decoder: Arc<dyn FrameDecoder>,
        patterns: Arc<PatternCatalog>,
        matcher: PatternMatcher,
    ) -> Self {
        Self {
            renderer,
            decoder,
            sampler: PixelSampler::new(),
            matcher,
            patterns,
            options: CheckerOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CheckerOptions) -> Self {
        self.options = options;
        self
    }

    /// Handle for tuning thresholds at runtime.
    pub fn matcher(&self) -> &PatternMatcher {
        &self.matcher
    }

    /// Checks one stream. Never fails: infrastructure errors come back as a
    /// `SYSTEM_ERROR` record so the caller can move on to the next stream.
    #[instrument(skip_all, fields(machine = %machine.id, stream = %stream.id))]
    pub async fn check_stream(
        &self,
        stream: &StreamConfig,
        machine: &MachineConfig,
    ) -> StreamCheckRecord {
        if !stream.enabled {
            warn!("{} - stream {} is disabled", machine.name, stream.id);
            return StreamCheckRecord::disabled(stream, machine);
        }

        info!("Checking {} - {} ({})", machine.name, stream.name, stream.url);
        match self.run_check(stream, machine).await {
            Ok(result) => StreamCheckRecord::from_match(stream, machine, result),
            Err(e) => {
                error!("Stream check failed: {}", e);
                StreamCheckRecord::system_error(stream, machine, e)
            }
        }
    }

    async fn run_check(
        &self,
        stream: &StreamConfig,
        machine: &MachineConfig,
    ) -> Result<MatchResult, AppError> {
        let pattern = self
            .patterns
            .get(stream.category)
            .ok_or_else(|| AppError::MissingPattern(stream.category.to_string()))?;
        debug!("Using pattern '{}'", pattern.name);

        let (frame, viewport) = self.capture(stream, machine).await?;
        let raw = self.decoder.decode(frame.bytes())?;
        let pixels = self
            .sampler
            .sample_in_viewport(&raw, viewport, &pattern.check_points)?;
        Ok(self.matcher.evaluate(&pixels))
    }

    async fn capture(
        &self,
        stream: &StreamConfig,
        machine: &MachineConfig,
    ) -> Result<(CapturedFrame, Viewport), RenderError> {
        let mut session = self.renderer.open().await?;
        let outcome = self
            .capture_in_session(session.as_mut(), stream, machine)
            .await;

        // Close on every path, a leaked session is a leaked renderer process.
        if let Err(e) = session.close().await {
            warn!("Failed to close render session {}: {}", session.id(), e);
        }
        outcome
    }

    async fn capture_in_session(
        &self,
        session: &mut dyn RenderSession,
        stream: &StreamConfig,
        machine: &MachineConfig,
    ) -> Result<(CapturedFrame, Viewport), RenderError> {
        session
            .navigate(&stream.url, self.options.navigation_timeout)
            .await?;

        match session.probe_video(self.options.probe_timeout).await {
            Probe::Found => debug!("Video surface found"),
            Probe::NotFound => debug!("No video surface found, capturing anyway"),
        }

        if !self.options.settle_delay.is_zero() {
            tokio::time::sleep(self.options.settle_delay).await;
        }

        let frame = session.capture_frame().await?;
        let viewport = session.viewport_size();
        debug!(
            "Captured {} bytes of {} at {}",
            frame.bytes().len(),
            frame.format(),
            viewport
        );

        if let Some(dir) = &self.options.debug_capture_dir {
            save_debug_capture(dir, &frame, stream, machine).await;
        }
        Ok((frame, viewport))
    }
}

// Best effort, failures are only logged.
async fn save_debug_capture(
    dir: &Path,
    frame: &CapturedFrame,
    stream: &StreamConfig,
    machine: &MachineConfig,
) {
    let filename = format!(
        "{}-{}-{}.{}",
        machine.id,
        stream.id,
        frame.captured_at().timestamp_millis(),
        frame.format()
    );
    let path = dir.join(filename);

    let result = async {
        tokio::fs::create_dir_all(dir).await?;
        tokio::fs::write(&path, frame.bytes()).await
    }
    .await;

    match result {
        Ok(()) => debug!("Saved debug capture to {}", path.display()),
        Err(e) => warn!("Could not save debug capture {}: {}", path.display(), e),
    }
}
