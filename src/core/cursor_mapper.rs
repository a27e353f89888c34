// Cursor mapping - normalized landmark position to screen pixels

use crate::models::input::{Point, ScreenSize};
use crate::models::pose::Keypoint3D;

/// Smoothing used by the standard profile
pub const DEFAULT_SMOOTHING: f64 = 0.1;

/// Maps a tracked landmark onto the screen with optional exponential smoothing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorMapper {
    screen: ScreenSize,
    /// Weight of the previous position (0.0 = no smoothing)
    smoothing: f64,
}

impl CursorMapper {
    /// # Arguments
    /// * `smoothing` - weight given to the previous frame's position, in [0.0, 1.0)
    pub fn new(screen: ScreenSize, smoothing: f64) -> Self {
        Self {
            screen,
            smoothing: smoothing.clamp(0.0, 0.99),
        }
    }

    /// Unsmoothed screen position for a normalized point
    pub fn raw_position(&self, keypoint: &Keypoint3D) -> (f64, f64) {
        (
            (keypoint.x as f64 * self.screen.width as f64).trunc(),
            (keypoint.y as f64 * self.screen.height as f64).trunc(),
        )
    }

    /// Map a keypoint, blending with `previous` when there is one.
    ///
    /// Returns the pixel to move to and the unrounded position to carry into the
    /// next frame. With no previous position the raw mapping is used as-is.
    pub fn map(&self, keypoint: &Keypoint3D, previous: Option<(f64, f64)>) -> (Point, (f64, f64)) {
        let (raw_x, raw_y) = self.raw_position(keypoint);

        let smoothed = match previous {
            Some((prev_x, prev_y)) if self.smoothing > 0.0 => (
                prev_x * self.smoothing + raw_x * (1.0 - self.smoothing),
                prev_y * self.smoothing + raw_y * (1.0 - self.smoothing),
            ),
            _ => (raw_x, raw_y),
        };

        (self.to_pixel(smoothed), smoothed)
    }

    fn to_pixel(&self, (x, y): (f64, f64)) -> Point {
        let max_x = self.screen.width.saturating_sub(1) as f64;
        let max_y = self.screen.height.saturating_sub(1) as f64;

        Point {
            x: x.clamp(0.0, max_x) as i32,
            y: y.clamp(0.0, max_y) as i32,
        }
    }
}
