use tracing::debug;

use super::geometry::to_absolute;
use crate::common::{AbsolutePosition, Color, RawFrame, Viewport};
use crate::error::SampleError;
use crate::pipeline::types::{AnalyzedPixel, CheckPoint};

/// Reads check-point colours out of decoded frames.
#[derive(Debug, Clone, Default)]
pub struct PixelSampler;

impl PixelSampler {
    pub fn new() -> Self {
        Self
    }

    /// Samples every check point, mapping positions against the frame's own size.
    pub fn sample(
        &self,
        frame: &RawFrame,
        check_points: &[CheckPoint],
    ) -> Result<Vec<AnalyzedPixel>, SampleError> {
        self.sample_in_viewport(frame, frame.viewport(), check_points)
    }

    /// Samples every check point, mapping positions against `viewport`.
    ///
    /// The viewport is the geometry the page was rendered at; it must match the
    /// decoded frame or points will land on the wrong pixels.
    pub fn sample_in_viewport(
        &self,
        frame: &RawFrame,
        viewport: Viewport,
        check_points: &[CheckPoint],
    ) -> Result<Vec<AnalyzedPixel>, SampleError> {
        Self::validate_frame(frame)?;
        debug!(
            "Sampling {} check points on {} frame (viewport {})",
            check_points.len(),
            frame.viewport(),
            viewport
        );

        let mut pixels = Vec::with_capacity(check_points.len());
        for point in check_points {
            let position = to_absolute(point.relative_position, viewport.width, viewport.height);
            if !frame.contains(position.x, position.y) {
                return Err(SampleError::OutOfBounds {
                    point: point.name.clone(),
                    x: position.x,
                    y: position.y,
                    width: frame.width,
                    height: frame.height,
                });
            }

            let actual = Self::read_pixel(frame, position.x as u32, position.y as u32);
            debug!("  {} at ({}, {}): {}", point.name, position.x, position.y, actual);

            pixels.push(
                AnalyzedPixel::new(point.name.clone(), position, actual, point.expected_color)
                    .with_description(point.description.clone()),
            );
        }

        Ok(pixels)
    }

    /// Averages the colour over the square of side `2 * radius + 1` around
    /// `center`, ignoring the parts that fall outside the frame.
    pub fn average_color(
        &self,
        frame: &RawFrame,
        center: AbsolutePosition,
        radius: u32,
    ) -> Result<Color, SampleError> {
        Self::validate_frame(frame)?;

        let radius = radius as i64;
        let (mut total_r, mut total_g, mut total_b) = (0u64, 0u64, 0u64);
        let mut count = 0u64;

        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let (x, y) = (center.x + dx, center.y + dy);
                if !frame.contains(x, y) {
                    continue;
                }
                let px = Self::read_pixel(frame, x as u32, y as u32);
                total_r += px.r as u64;
                total_g += px.g as u64;
                total_b += px.b as u64;
                count += 1;
            }
        }

        if count == 0 {
            return Err(SampleError::OutOfBounds {
                point: "area average".to_string(),
                x: center.x,
                y: center.y,
                width: frame.width,
                height: frame.height,
            });
        }

        let mean = |total: u64| ((total as f64) / (count as f64)).round() as u8;
        Ok(Color::new(mean(total_r), mean(total_g), mean(total_b)))
    }

    fn validate_frame(frame: &RawFrame) -> Result<(), SampleError> {
        if frame.channel_count < 3 {
            return Err(SampleError::UnsupportedChannels(frame.channel_count));
        }
        let expected =
            frame.width as usize * frame.height as usize * frame.channel_count as usize;
        if frame.pixel_data.len() < expected {
            return Err(SampleError::Truncated {
                expected,
                actual: frame.pixel_data.len(),
            });
        }
        Ok(())
    }

    // Caller guarantees (x, y) is inside the frame.
    fn read_pixel(frame: &RawFrame, x: u32, y: u32) -> Color {
        let idx = (y as usize * frame.width as usize + x as usize) * frame.channel_count as usize;
        Color::new(
            frame.pixel_data[idx],
            frame.pixel_data[idx + 1],
            frame.pixel_data[idx + 2],
        )
    }
}
