//! Gesture capture arbitration and drag tracking.
//!
//! For every candidate pointer move the arbiter decides whether the sheet or
//! a nested scrollable owns the gesture. Once the sheet captures, it keeps
//! the gesture until release.

/// Minimum downward travel before capturing over a scrolled-to-top anchor.
pub const ANCHORED_CAPTURE_THRESHOLD: f64 = 5.0;

/// Minimum downward travel before capturing when no anchor is preferred.
pub const UNANCHORED_CAPTURE_THRESHOLD: f64 = 10.0;

/// Share of the movement that must be vertical.
pub const VERTICAL_RATIO: f64 = 0.75;

/// Accumulated pointer movement since the gesture began.
///
/// Velocities are in pixels per millisecond. Positive `dy`/`vy` point down
/// (toward collapse).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GestureSample {
    pub dx: f64,
    pub dy: f64,
    pub vx: f64,
    pub vy: f64,
}

impl GestureSample {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self {
            dx,
            dy,
            ..Default::default()
        }
    }

    pub fn with_velocity(mut self, vx: f64, vy: f64) -> Self {
        self.vx = vx;
        self.vy = vy;
        self
    }

    /// Returns true if the pointer moved down past `threshold` and mostly vertically.
    pub fn is_moving_down(&self, threshold: f64) -> bool {
        self.dy > threshold && self.dy / (self.dy + self.dx.abs()) >= VERTICAL_RATIO
    }
}

/// Sheet state the arbiter consults.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CaptureContext {
    /// User gestures are disabled.
    pub disabled: bool,
    /// The preferred anchor currently owns scrolling.
    pub scroll_enabled: bool,
    /// Scroll offset of the preferred anchor, if one is preferred.
    pub anchor_scroll_offset: Option<f64>,
}

/// Decide whether the sheet captures the gesture.
///
/// Captures when gestures are enabled and any of:
/// - nested scrolling is disabled,
/// - the preferred anchor sits at (or above) its top edge and the pointer
///   moves down past [`ANCHORED_CAPTURE_THRESHOLD`],
/// - no anchor is preferred and the pointer moves down past
///   [`UNANCHORED_CAPTURE_THRESHOLD`].
pub fn should_capture(context: CaptureContext, sample: GestureSample) -> bool {
    if context.disabled {
        return false;
    }

    !context.scroll_enabled
        || match context.anchor_scroll_offset {
            Some(offset) => offset <= 0.0 && sample.is_moving_down(ANCHORED_CAPTURE_THRESHOLD),
            None => sample.is_moving_down(UNANCHORED_CAPTURE_THRESHOLD),
        }
}

/// A captured drag: converts accumulated movement into sheet positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    origin: f64,
    min_translate: f64,
    max_translate: f64,
}

impl DragSession {
    /// Start a drag at translate value `origin`, allowed to travel within
    /// `[min_translate, max_translate]`.
    pub fn new(origin: f64, min_translate: f64, max_translate: f64) -> Self {
        Self {
            origin,
            min_translate,
            max_translate,
        }
    }

    pub fn origin(&self) -> f64 {
        self.origin
    }

    /// Position for an accumulated vertical movement.
    ///
    /// Returns `None` when the movement would leave the allowed range; the
    /// caller leaves the position where it is rather than clamping.
    pub fn position_for(&self, dy: f64) -> Option<f64> {
        let position = self.origin + dy;
        (position >= self.min_translate && position <= self.max_translate).then_some(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mostly_horizontal_motion_is_not_vertical() {
        let sample = GestureSample::new(20.0, 12.0);
        assert!(!sample.is_moving_down(5.0));
    }

    #[test]
    fn drag_session_rejects_out_of_range() {
        let drag = DragSession::new(300.0, 0.0, 600.0);
        assert_eq!(drag.position_for(-100.0), Some(200.0));
        assert_eq!(drag.position_for(-301.0), None);
        assert_eq!(drag.position_for(301.0), None);
    }
}
