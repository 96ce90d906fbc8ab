use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::common::{Color, RelativePosition};
use crate::pipeline::types::{CheckPoint, Pattern, PatternCategory};

/// The seven 75% SMPTE bars, left to right.
const SMPTE_BARS: [(&str, Color); 7] = [
    ("gray", Color::new(191, 191, 191)),
    ("yellow", Color::new(191, 191, 0)),
    ("cyan", Color::new(0, 191, 191)),
    ("green", Color::new(0, 191, 0)),
    ("magenta", Color::new(191, 0, 191)),
    ("red", Color::new(191, 0, 0)),
    ("blue", Color::new(0, 0, 191)),
];

/// Vertical position of the sample row, inside the tall upper bar band.
const BAR_ROW: f64 = 0.3;

/// Horizontal span of the picture in a pillarboxed usb feed (4:3 inside 16:9).
const USB_INSET_WIDTH: f64 = 0.75;

/// Patterns keyed by stream category, in definition order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "IndexMap<String, Pattern>",
    into = "IndexMap<String, Pattern>"
)]
pub struct PatternCatalog {
    patterns: IndexMap<PatternCategory, Pattern>,
}

// Unknown keys are rejected rather than folded into a default category.
impl TryFrom<IndexMap<String, Pattern>> for PatternCatalog {
    type Error = String;

    fn try_from(raw: IndexMap<String, Pattern>) -> Result<Self, Self::Error> {
        let mut catalog = Self::empty();
        for (key, pattern) in raw {
            let category: PatternCategory = key.parse()?;
            if catalog.insert(category, pattern).is_some() {
                return Err(format!("Pattern category '{category}' defined twice"));
            }
        }
        Ok(catalog)
    }
}

impl From<PatternCatalog> for IndexMap<String, Pattern> {
    fn from(catalog: PatternCatalog) -> Self {
        catalog
            .patterns
            .into_iter()
            .map(|(category, pattern)| (category.as_str().to_string(), pattern))
            .collect()
    }
}

impl PatternCatalog {
    pub fn empty() -> Self {
        Self {
            patterns: IndexMap::new(),
        }
    }

    /// Full-frame and centre-inset SMPTE bar layouts.
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        catalog.insert(
            PatternCategory::Rectangle,
            bar_pattern("SMPTE full frame", 0.0, 1.0),
        );
        let margin = (1.0 - USB_INSET_WIDTH) / 2.0;
        catalog.insert(
            PatternCategory::Usb,
            bar_pattern("SMPTE usb inset", margin, USB_INSET_WIDTH),
        );
        catalog
    }

    pub fn insert(&mut self, category: PatternCategory, pattern: Pattern) -> Option<Pattern> {
        self.patterns.insert(category, pattern)
    }

    pub fn get(&self, category: PatternCategory) -> Option<&Pattern> {
        self.patterns.get(&category)
    }

    /// Overrides this catalog's entries with the ones from `other`.
    pub fn merge(mut self, other: PatternCatalog) -> Self {
        for (category, pattern) in other.patterns {
            self.patterns.insert(category, pattern);
        }
        self
    }

    pub fn categories(&self) -> impl Iterator<Item = PatternCategory> + '_ {
        self.patterns.keys().copied()
    }

    pub fn validate(&self) -> Result<(), String> {
        for required in [PatternCategory::Rectangle, PatternCategory::Usb] {
            if !self.patterns.contains_key(&required) {
                return Err(format!("No pattern defined for category '{required}'"));
            }
        }
        for pattern in self.patterns.values() {
            pattern.validate()?;
        }
        Ok(())
    }
}

impl Default for PatternCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn bar_pattern(name: &str, left: f64, span: f64) -> Pattern {
    let bar_width = span / SMPTE_BARS.len() as f64;
    let check_points = SMPTE_BARS
        .iter()
        .enumerate()
        .map(|(i, (bar, color))| {
            let x = left + bar_width * (i as f64 + 0.5);
            CheckPoint::new(
                *bar,
                RelativePosition::new(x, BAR_ROW),
                *color,
                format!("{bar} bar, {} from the left", i + 1),
            )
        })
        .collect();
    Pattern::new(name, check_points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_is_valid() {
        let catalog = PatternCatalog::builtin();
        assert!(catalog.validate().is_ok());
        assert_eq!(
            catalog.categories().collect::<Vec<_>>(),
            vec![PatternCategory::Rectangle, PatternCategory::Usb]
        );
    }

    #[test]
    fn usb_points_stay_inside_the_inset() {
        let catalog = PatternCatalog::builtin();
        let usb = catalog.get(PatternCategory::Usb).unwrap();
        let full = catalog.get(PatternCategory::Rectangle).unwrap();

        assert_eq!(usb.len(), 7);
        for point in &usb.check_points {
            assert!(point.relative_position.x > 0.125 && point.relative_position.x < 0.875);
        }
        // The middle bar is centred in both layouts.
        assert!((usb.check_points[3].relative_position.x - 0.5).abs() < 1e-9);
        assert!((full.check_points[3].relative_position.x - 0.5).abs() < 1e-9);
        assert!(full.check_points[0].relative_position.x < usb.check_points[0].relative_position.x);
    }

    #[test]
    fn merge_overrides_by_category() {
        let custom: PatternCatalog = serde_json::from_str(
            r#"{
                "usb": {
                    "name": "custom usb",
                    "checkPoints": [
                        { "name": "c", "relativePosition": { "x": 0.5, "y": 0.5 },
                          "expectedColor": { "r": 1, "g": 2, "b": 3 } }
                    ]
                }
            }"#,
        )
        .unwrap();

        let merged = PatternCatalog::builtin().merge(custom);
        assert_eq!(merged.get(PatternCategory::Usb).unwrap().name, "custom usb");
        assert_eq!(
            merged.get(PatternCategory::Rectangle).unwrap().name,
            "SMPTE full frame"
        );
        assert!(merged.validate().is_ok());
    }

    #[test]
    fn unknown_category_keys_are_rejected() {
        let err = serde_json::from_str::<PatternCatalog>(
            r#"{
                "usb-inset": {
                    "name": "typo usb",
                    "checkPoints": [
                        { "name": "c", "relativePosition": { "x": 0.5, "y": 0.5 },
                          "expectedColor": { "r": 1, "g": 2, "b": 3 } }
                    ]
                }
            }"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("usb-inset"));
    }

    #[test]
    fn catalog_serializes_with_category_keys() {
        let json = serde_json::to_value(PatternCatalog::builtin()).unwrap();
        assert_eq!(json["rectangle"]["name"], "SMPTE full frame");
        assert_eq!(json["usb"]["checkPoints"].as_array().unwrap().len(), 7);
    }

    #[test]
    fn catalog_missing_a_category_is_invalid() {
        let mut catalog = PatternCatalog::empty();
        catalog.insert(
            PatternCategory::Rectangle,
            PatternCatalog::builtin()
                .get(PatternCategory::Rectangle)
                .cloned()
                .unwrap(),
        );
        assert!(catalog.validate().unwrap_err().contains("usb"));
    }
}
