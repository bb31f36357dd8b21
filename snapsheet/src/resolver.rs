//! Snap target resolution: map a shown amount and a direction to a snap index.
//!
//! The snap offsets partition the travel range into one interval per snap
//! point. Boundary inclusion depends on direction so that a position resting
//! exactly on a boundary never flips between two indices:
//!
//! - expanding: index `i` matches when `offset[i] <= shown < offset[i + 1]`
//!   (or `i` is last)
//! - collapsing: index `i` matches when `offset[i - 1] < shown <= offset[i]`
//!   (or `i` is first)

/// Drags shorter than this (in pixels) resolve to the interval under the
/// current position instead of stepping.
pub const MIN_TRAVEL: f64 = 30.0;

/// Release speed (pixels per millisecond) past which a collapsing gesture
/// always drops to index 0.
pub const FAST_COLLAPSE_VELOCITY: f64 = 0.3;

/// Direction of travel along the snap axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Toward the last snap point (pointer moving up).
    Expand,
    /// Toward index 0 (pointer moving down).
    Collapse,
}

impl Direction {
    /// Direction implied by a vertical release velocity. Zero counts as expanding.
    pub fn from_velocity(vy: f64) -> Self {
        if vy <= 0.0 {
            Self::Expand
        } else {
            Self::Collapse
        }
    }
}

/// Options that shape release resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReleasePolicy {
    /// Collapse one step instead of dropping to index 0.
    pub snap_while_decelerating: bool,
    /// Lowest index a release may resolve to.
    pub min_snap_index: usize,
}

/// Index of the interval containing `shown`, before clamping.
fn interval_at(offsets: &[f64], shown: f64, direction: Direction) -> usize {
    let last = offsets.len().saturating_sub(1);
    let found = match direction {
        Direction::Expand => offsets
            .iter()
            .enumerate()
            .position(|(i, v)| *v <= shown && (i == last || shown < offsets[i + 1])),
        Direction::Collapse => offsets
            .iter()
            .enumerate()
            .position(|(i, v)| *v >= shown && (i == 0 || shown > offsets[i - 1])),
    };

    match found {
        Some(index) => index,
        // Outside the travel range: below the first offset when expanding,
        // above the last when collapsing.
        None if direction == Direction::Collapse && shown > offsets[last] => last,
        None => 0,
    }
}

/// Resolve the snap index under `shown`, clamped to `[min_snap_index, len - 1]`.
pub fn resolve(offsets: &[f64], shown: f64, direction: Direction, min_snap_index: usize) -> usize {
    clamp_index(interval_at(offsets, shown, direction), min_snap_index, offsets.len())
}

/// Resolve the target of a drag release.
///
/// `dy` is the total drag distance and `vy` the release velocity; negative
/// values point toward expansion.
pub fn resolve_release(
    offsets: &[f64],
    shown: f64,
    dy: f64,
    vy: f64,
    policy: ReleasePolicy,
) -> usize {
    let direction = Direction::from_velocity(vy);
    let current = interval_at(offsets, shown, direction);
    let last = offsets.len().saturating_sub(1);

    let target = if dy.abs() <= MIN_TRAVEL {
        current
    } else {
        match direction {
            Direction::Expand => (current + 1).min(last),
            Direction::Collapse if vy > FAST_COLLAPSE_VELOCITY => 0,
            Direction::Collapse if policy.snap_while_decelerating => current.saturating_sub(1),
            Direction::Collapse => 0,
        }
    };

    log::trace!(
        "[resolver] release shown={shown:.1} dy={dy:.1} vy={vy:.3} direction={direction:?} current={current} target={target}"
    );

    clamp_index(target, policy.min_snap_index, offsets.len())
}

/// Clamp an index to `[min_snap_index, len - 1]`.
pub fn clamp_index(index: usize, min_snap_index: usize, len: usize) -> usize {
    let last = len.saturating_sub(1);
    index.max(min_snap_index).min(last)
}
