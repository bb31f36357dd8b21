//! Velocity handoff between the sheet and a nested scrollable region.
//!
//! Expanding: a fling that fully expands the sheet continues as a scroll of
//! the preferred anchor. Collapsing: an anchor that overscrolls its top edge
//! while moving upward hands its velocity to the sheet, which collapses.

use std::time::Instant;

/// Fling velocity (pixels per millisecond) the release must exceed, upward,
/// before it continues into the anchor.
pub const EXPAND_FLING_THRESHOLD: f64 = -0.1;

/// Pixels of scroll per unit of release velocity.
pub const FLING_SCROLL_FACTOR: f64 = 70.0;

/// Largest scroll offset an expand handoff may request.
pub const MAX_FLING_SCROLL: f64 = 100.0;

/// Scrolling capabilities a mounted scrollable may expose.
///
/// Hosts implement whichever methods their scrollable supports and return
/// `true` when the call was handled. Capabilities are tried in declaration
/// order: direct offset, indexed list offset, then the inner responder.
pub trait ScrollHandle {
    /// Scroll directly to a vertical offset.
    fn scroll_to(&mut self, _y: f64, _animated: bool) -> bool {
        false
    }

    /// Scroll a list to an offset.
    fn scroll_to_offset(&mut self, _offset: f64, _animated: bool) -> bool {
        false
    }

    /// Inner scroll responder wrapped by this handle.
    fn scroll_responder(&mut self) -> Option<&mut dyn ScrollHandle> {
        None
    }
}

/// Which capability handled a scroll request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollCapability {
    Direct,
    IndexedList,
    Responder,
}

/// Apply an animated scroll using the first capability the handle supports.
pub fn apply_scroll(handle: &mut dyn ScrollHandle, y: f64) -> Option<ScrollCapability> {
    if handle.scroll_to(y, true) {
        return Some(ScrollCapability::Direct);
    }
    if handle.scroll_to_offset(y, true) {
        return Some(ScrollCapability::IndexedList);
    }
    let responder = handle.scroll_responder()?;
    responder
        .scroll_to(y, true)
        .then_some(ScrollCapability::Responder)
}

/// Scroll offset an upward release of velocity `vy` should continue into.
///
/// Returns `None` unless the fling is faster than [`EXPAND_FLING_THRESHOLD`].
pub fn expand_scroll_target(vy: f64) -> Option<f64> {
    if vy >= EXPAND_FLING_THRESHOLD {
        return None;
    }
    Some((-vy * FLING_SCROLL_FACTOR).clamp(0.0, MAX_FLING_SCROLL))
}

/// Derives scroll velocity from consecutive offset samples.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScrollVelocityTracker {
    last: Option<(f64, Instant)>,
}

impl ScrollVelocityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sample and return the velocity since the previous one, in
    /// pixels per millisecond. The first sample reports zero.
    pub fn sample(&mut self, offset: f64, now: Instant) -> f64 {
        let velocity = match self.last {
            Some((prev_offset, prev_time)) => {
                let dt = now.saturating_duration_since(prev_time).as_micros() as f64 / 1000.0;
                if dt > 0.0 {
                    (offset - prev_offset) / dt
                } else {
                    0.0
                }
            }
            None => 0.0,
        };
        self.last = Some((offset, now));
        velocity
    }

    /// Forget previous samples.
    pub fn reset(&mut self) {
        self.last = None;
    }
}
