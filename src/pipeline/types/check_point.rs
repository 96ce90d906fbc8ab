use serde::{Deserialize, Serialize};

use crate::common::{Color, RelativePosition};

/// Stream layouts with their own check-point geometry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum PatternCategory {
    /// Full-frame picture.
    #[default]
    Rectangle,
    /// Picture inset in the centre with black side margins.
    Usb,
}

impl PatternCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternCategory::Rectangle => "rectangle",
            PatternCategory::Usb => "usb",
        }
    }
}

/// Strict parse, used for pattern file keys.
impl std::str::FromStr for PatternCategory {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "rectangle" => Ok(PatternCategory::Rectangle),
            "usb" => Ok(PatternCategory::Usb),
            other => Err(format!(
                "Unknown pattern category '{other}', expected 'rectangle' or 'usb'"
            )),
        }
    }
}

// Stream `type` fields: anything that is not a usb feed is treated as full-frame.
impl From<&str> for PatternCategory {
    fn from(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("usb") {
            PatternCategory::Usb
        } else {
            PatternCategory::Rectangle
        }
    }
}

impl From<String> for PatternCategory {
    fn from(value: String) -> Self {
        PatternCategory::from(value.as_str())
    }
}

impl std::fmt::Display for PatternCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckPoint {
    pub name: String,
    pub relative_position: RelativePosition,
    pub expected_color: Color,
    #[serde(default)]
    pub description: String,
}

impl CheckPoint {
    pub fn new(
        name: impl Into<String>,
        relative_position: RelativePosition,
        expected_color: Color,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            relative_position,
            expected_color,
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    pub name: String,
    pub check_points: Vec<CheckPoint>,
}

impl Pattern {
    pub fn new(name: impl Into<String>, check_points: Vec<CheckPoint>) -> Self {
        Self {
            name: name.into(),
            check_points,
        }
    }

    pub fn len(&self) -> usize {
        self.check_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.check_points.is_empty()
    }

    /// Checks the pattern is non-empty and every point sits inside the unit square.
    pub fn validate(&self) -> Result<(), String> {
        if self.check_points.is_empty() {
            return Err(format!("Pattern '{}' has no check points", self.name));
        }

        for point in &self.check_points {
            if !point.relative_position.is_within_unit_square() {
                return Err(format!(
                    "Check point '{}' of pattern '{}' lies outside the unit square ({}, {})",
                    point.name, self.name, point.relative_position.x, point.relative_position.y
                ));
            }
        }

        Ok(())
    }
}
