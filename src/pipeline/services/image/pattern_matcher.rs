use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info};

use crate::common::Color;
use crate::pipeline::types::{AnalyzedPixel, MatchResult, PointDetail, Verdict};

/// Tunable decision thresholds for [`PatternMatcher`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchThresholds {
    /// Maximum per-channel deviation, as a percentage of 255.
    pub tolerance_percent: f64,
    /// Matched points needed to call a frame a test pattern.
    pub minimum_match_count: usize,
    /// A pixel whose `r + g + b` is at or below this is black.
    pub black_threshold: u32,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            tolerance_percent: 5.0,
            minimum_match_count: 4,
            black_threshold: 30,
        }
    }
}

/// Compares sampled colours against a pattern and renders a verdict.
///
/// Clones share the same thresholds, so a change made through any handle
/// applies to the next evaluation everywhere.
#[derive(Debug, Clone, Default)]
pub struct PatternMatcher {
    thresholds: Arc<RwLock<MatchThresholds>>,
}

impl PatternMatcher {
    pub fn new(thresholds: MatchThresholds) -> Self {
        Self {
            thresholds: Arc::new(RwLock::new(thresholds)),
        }
    }

    /// True when every channel differs by at most `255 * tolerance_percent / 100`.
    pub fn color_matches(actual: &Color, expected: &Color, tolerance_percent: f64) -> bool {
        let limit = 255.0 * tolerance_percent / 100.0;
        let (dr, dg, db) = actual.channel_deltas(expected);
        dr as f64 <= limit && dg as f64 <= limit && db as f64 <= limit
    }

    pub fn is_black(color: &Color, black_threshold: u32) -> bool {
        color.channel_sum() <= black_threshold
    }

    pub fn evaluate(&self, pixels: &[AnalyzedPixel]) -> MatchResult {
        let thresholds = self.thresholds();

        let details: Vec<PointDetail> = pixels
            .iter()
            .map(|pixel| {
                let matched = Self::color_matches(
                    &pixel.actual_color,
                    &pixel.expected_color,
                    thresholds.tolerance_percent,
                );
                let is_black = Self::is_black(&pixel.actual_color, thresholds.black_threshold);
                let color_difference = pixel.actual_color.distance(&pixel.expected_color);

                debug!(
                    "  {} {}{}: expected {} actual {} diff {}",
                    if matched { "match" } else { "miss" },
                    if is_black { "black " } else { "" },
                    pixel.name,
                    pixel.expected_color,
                    pixel.actual_color,
                    color_difference
                );

                PointDetail {
                    point: pixel.name.clone(),
                    position: pixel.position,
                    expected: pixel.expected_color,
                    actual: pixel.actual_color,
                    matched,
                    is_black,
                    color_difference,
                    description: pixel.description.clone(),
                }
            })
            .collect();

        let result = Self::decide(details, &thresholds);
        info!("Verdict: {} - {}", result.verdict, result.message);
        result
    }

    // Black screen outranks pattern detection: a dead feed can look like a
    // near-black pattern, and that is the more urgent report.
    fn decide(details: Vec<PointDetail>, thresholds: &MatchThresholds) -> MatchResult {
        let total_points = details.len();
        let matched_count = details.iter().filter(|d| d.matched).count();
        let all_black = details.iter().all(|d| d.is_black);

        let (verdict, message) = if all_black {
            (
                Verdict::BlackScreen,
                "Black screen detected (feed may be down)".to_string(),
            )
        } else if matched_count >= thresholds.minimum_match_count {
            (
                Verdict::SmpteDetected,
                format!(
                    "SMPTE test pattern detected ({matched_count}/{total_points} points matched)"
                ),
            )
        } else {
            (Verdict::Ok, "Stream is running normally".to_string())
        };

        MatchResult {
            verdict,
            matched_count,
            total_points,
            details,
            message,
        }
    }

    pub fn thresholds(&self) -> MatchThresholds {
        *self.read()
    }

    pub fn set_tolerance(&self, tolerance_percent: f64) {
        let mut thresholds = self.write();
        info!(
            "Colour tolerance updated: {}% -> {}%",
            thresholds.tolerance_percent, tolerance_percent
        );
        thresholds.tolerance_percent = tolerance_percent;
    }

    pub fn set_minimum_match_count(&self, count: usize) {
        let mut thresholds = self.write();
        info!(
            "Minimum match count updated: {} -> {}",
            thresholds.minimum_match_count, count
        );
        thresholds.minimum_match_count = count;
    }

    pub fn set_black_threshold(&self, max_rgb_sum: u32) {
        let mut thresholds = self.write();
        info!(
            "Black screen threshold updated: {} -> {}",
            thresholds.black_threshold, max_rgb_sum
        );
        thresholds.black_threshold = max_rgb_sum;
    }

    // Thresholds are plain values, a poisoned lock still holds a usable copy.
    fn read(&self) -> RwLockReadGuard<'_, MatchThresholds> {
        self.thresholds.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, MatchThresholds> {
        self.thresholds.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::AbsolutePosition;

    fn pixels(actual: Color, expected: Color, n: usize) -> Vec<AnalyzedPixel> {
        (0..n)
            .map(|i| {
                AnalyzedPixel::new(
                    format!("p{i}"),
                    AbsolutePosition::new(i as i64, 0),
                    actual,
                    expected,
                )
            })
            .collect()
    }

    #[test]
    fn tolerance_boundary_counts_as_match() {
        // 255 * 20 / 100 = 51 exactly.
        let expected = Color::new(100, 100, 100);
        assert!(PatternMatcher::color_matches(
            &Color::new(151, 49, 100),
            &expected,
            20.0
        ));
        assert!(!PatternMatcher::color_matches(
            &Color::new(152, 100, 100),
            &expected,
            20.0
        ));
        // 5% is 12.75, so 12 matches and 13 does not.
        assert!(PatternMatcher::color_matches(
            &Color::new(12, 0, 0),
            &Color::new(0, 0, 0),
            5.0
        ));
        assert!(!PatternMatcher::color_matches(
            &Color::new(0, 13, 0),
            &Color::new(0, 0, 0),
            5.0
        ));
    }

    #[test]
    fn black_is_inclusive_of_threshold() {
        assert!(PatternMatcher::is_black(&Color::new(10, 10, 10), 30));
        assert!(!PatternMatcher::is_black(&Color::new(10, 10, 11), 30));
    }

    #[test]
    fn near_red_pattern_is_smpte_detected() {
        let matcher = PatternMatcher::default();
        let result = matcher.evaluate(&pixels(Color::new(250, 3, 1), Color::new(255, 0, 0), 6));

        assert_eq!(result.verdict, Verdict::SmpteDetected);
        assert_eq!(result.matched_count, 6);
        assert_eq!(result.total_points, 6);
        assert!(result.details.iter().all(|d| d.matched && !d.is_black));
        assert_eq!(result.details[0].color_difference, 9);
        assert!(result.message.contains("6/6"));
    }

    #[test]
    fn all_black_wins_over_matches() {
        let matcher = PatternMatcher::default();
        // Expected colours are near-black too, so every point also matches.
        let result = matcher.evaluate(&pixels(Color::new(2, 1, 0), Color::new(0, 0, 0), 6));

        assert_eq!(result.verdict, Verdict::BlackScreen);
        assert_eq!(result.matched_count, 6);
        assert!(result.is_black_screen());
    }

    #[test]
    fn one_bright_point_breaks_black_screen() {
        let matcher = PatternMatcher::default();
        let mut input = pixels(Color::new(0, 0, 0), Color::new(0, 0, 0), 5);
        input.extend(pixels(Color::new(200, 200, 200), Color::new(0, 0, 255), 1));

        let result = matcher.evaluate(&input);
        assert_eq!(result.verdict, Verdict::SmpteDetected);
        assert_eq!(result.matched_count, 5);
    }

    #[test]
    fn few_matches_is_ok() {
        let matcher = PatternMatcher::default();
        let mut input = pixels(Color::new(190, 190, 0), Color::new(191, 191, 0), 3);
        input.extend(pixels(Color::new(40, 90, 140), Color::new(0, 191, 191), 3));

        let result = matcher.evaluate(&input);
        assert_eq!(result.verdict, Verdict::Ok);
        assert_eq!(result.matched_count, 3);
        assert_eq!(result.total_points, 6);
    }

    #[test]
    fn evaluation_is_repeatable() {
        let matcher = PatternMatcher::default();
        let input = pixels(Color::new(120, 60, 30), Color::new(118, 64, 30), 6);
        assert_eq!(matcher.evaluate(&input), matcher.evaluate(&input));
    }

    #[test]
    fn threshold_changes_apply_through_clones() {
        let matcher = PatternMatcher::default();
        let handle = matcher.clone();
        let input = pixels(Color::new(230, 0, 0), Color::new(255, 0, 0), 6);

        assert_eq!(matcher.evaluate(&input).verdict, Verdict::Ok);

        handle.set_tolerance(10.0);
        assert_eq!(matcher.evaluate(&input).verdict, Verdict::SmpteDetected);

        handle.set_minimum_match_count(7);
        assert_eq!(matcher.evaluate(&input).verdict, Verdict::Ok);

        handle.set_black_threshold(300);
        assert_eq!(matcher.evaluate(&input).verdict, Verdict::BlackScreen);
        assert_eq!(
            matcher.thresholds(),
            MatchThresholds {
                tolerance_percent: 10.0,
                minimum_match_count: 7,
                black_threshold: 300,
            }
        );
    }
}
