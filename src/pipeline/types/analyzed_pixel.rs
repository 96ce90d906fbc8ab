use serde::{Deserialize, Serialize};

use crate::common::{AbsolutePosition, Color};

/// One sampled check point, read from a decoded frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzedPixel {
    pub name: String,
    pub position: AbsolutePosition,
    pub actual_color: Color,
    pub expected_color: Color,
    pub description: String,
}

impl AnalyzedPixel {
    pub fn new(
        name: impl Into<String>,
        position: AbsolutePosition,
        actual_color: Color,
        expected_color: Color,
    ) -> Self {
        Self {
            name: name.into(),
            position,
            actual_color,
            expected_color,
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}
