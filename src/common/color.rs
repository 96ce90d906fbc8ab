use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn channel_sum(&self) -> u32 {
        self.r as u32 + self.g as u32 + self.b as u32
    }

    /// Per-channel absolute differences as (r, g, b).
    pub fn channel_deltas(&self, other: &Color) -> (u8, u8, u8) {
        (
            self.r.abs_diff(other.r),
            self.g.abs_diff(other.g),
            self.b.abs_diff(other.b),
        )
    }

    /// Manhattan distance in RGB space.
    pub fn distance(&self, other: &Color) -> u32 {
        let (dr, dg, db) = self.channel_deltas(other);
        dr as u32 + dg as u32 + db as u32
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RGB({},{},{})", self.r, self.g, self.b)
    }
}

/// Fractional position inside a frame, both axes nominally in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelativePosition {
    pub x: f64,
    pub y: f64,
}

impl RelativePosition {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_within_unit_square(&self) -> bool {
        (0.0..=1.0).contains(&self.x) && (0.0..=1.0).contains(&self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AbsolutePosition {
    pub x: i64,
    pub y: i64,
}

impl AbsolutePosition {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_sums_channel_deltas() {
        let a = Color::new(250, 3, 1);
        let b = Color::new(255, 0, 0);
        assert_eq!(a.channel_deltas(&b), (5, 3, 1));
        assert_eq!(a.distance(&b), 9);
        assert_eq!(b.distance(&a), 9);
    }

    #[test]
    fn unit_square_bounds_are_inclusive() {
        assert!(RelativePosition::new(0.0, 1.0).is_within_unit_square());
        assert!(!RelativePosition::new(1.01, 0.5).is_within_unit_square());
        assert!(!RelativePosition::new(0.5, -0.1).is_within_unit_square());
    }
}
