use serde::{Deserialize, Serialize};

use crate::common::{AbsolutePosition, Color};

/// Categorical outcome of one stream check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Ok,
    SmpteDetected,
    BlackScreen,
    SystemError,
    Disabled,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Ok => "OK",
            Verdict::SmpteDetected => "SMPTE_DETECTED",
            Verdict::BlackScreen => "BLACK_SCREEN",
            Verdict::SystemError => "SYSTEM_ERROR",
            Verdict::Disabled => "DISABLED",
        }
    }

    /// Failure classification, `None` for healthy and disabled streams.
    pub fn error_type(&self) -> Option<ErrorType> {
        match self {
            Verdict::Ok | Verdict::Disabled => None,
            Verdict::SmpteDetected => Some(ErrorType::SmpteDetected),
            Verdict::BlackScreen => Some(ErrorType::BlackScreen),
            Verdict::SystemError => Some(ErrorType::SystemError),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error_type().is_some()
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorType {
    BlackScreen,
    SmpteDetected,
    SystemError,
}

/// Per-point evidence kept for reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointDetail {
    pub point: String,
    pub position: AbsolutePosition,
    pub expected: Color,
    pub actual: Color,
    pub matched: bool,
    pub is_black: bool,
    pub color_difference: u32,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub verdict: Verdict,
    pub matched_count: usize,
    pub total_points: usize,
    pub details: Vec<PointDetail>,
    pub message: String,
}

impl MatchResult {
    pub fn is_black_screen(&self) -> bool {
        self.verdict == Verdict::BlackScreen
    }

    pub fn is_smpte_detected(&self) -> bool {
        self.verdict == Verdict::SmpteDetected
    }
}
