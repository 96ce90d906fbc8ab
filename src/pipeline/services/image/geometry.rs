use crate::common::{AbsolutePosition, RelativePosition};

/// Maps a fractional position onto a `width` x `height` frame.
///
/// Fractions are not validated: values outside `0.0..=1.0` land outside the
/// frame (possibly negative), and it is up to the sampler to reject them.
pub fn to_absolute(relative: RelativePosition, width: u32, height: u32) -> AbsolutePosition {
    AbsolutePosition::new(
        round_half_up(relative.x * width as f64),
        round_half_up(relative.y * height as f64),
    )
}

// Halves go towards positive infinity, negatives included (-2.5 -> -2).
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centre_of_full_hd_frame() {
        let pos = to_absolute(RelativePosition::new(0.5, 0.5), 1920, 1080);
        assert_eq!(pos, AbsolutePosition::new(960, 540));
    }

    #[test]
    fn rounds_to_nearest_pixel() {
        // 0.1 * 1366 = 136.6, 0.3 * 768 = 230.4
        let pos = to_absolute(RelativePosition::new(0.1, 0.3), 1366, 768);
        assert_eq!(pos, AbsolutePosition::new(137, 230));
    }

    #[test]
    fn corners_map_to_frame_edges() {
        assert_eq!(
            to_absolute(RelativePosition::new(0.0, 0.0), 640, 480),
            AbsolutePosition::new(0, 0)
        );
        assert_eq!(
            to_absolute(RelativePosition::new(1.0, 1.0), 640, 480),
            AbsolutePosition::new(640, 480)
        );
    }

    #[test]
    fn out_of_range_fractions_leave_the_frame() {
        let pos = to_absolute(RelativePosition::new(-0.25, 1.5), 100, 100);
        assert_eq!(pos, AbsolutePosition::new(-25, 150));
    }

    #[test]
    fn halves_round_up_on_both_sides_of_zero() {
        assert_eq!(
            to_absolute(RelativePosition::new(0.25, -0.25), 10, 10),
            AbsolutePosition::new(3, -2)
        );
    }
}
