//! Animation primitive contract and a reference implementation.
//!
//! The controller never interpolates positions itself. It hands a
//! [`MotionRequest`] to an [`AnimationPrimitive`] and expects the host to
//! report frames and completion back. [`MotionPlayer`] is a host-side
//! primitive that integrates springs and timed tweens when advanced.

use std::time::{Duration, Instant};

/// Identifies one started animation. Never reused within a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationId(pub u64);

impl std::fmt::Display for AnimationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "anim-{}", self.0)
    }
}

/// Easing function for timed animations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl Easing {
    /// Apply easing to progress (0.0 to 1.0).
    pub fn apply(self, t: f64) -> f64 {
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

/// How a value travels to its target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionKind {
    /// Velocity-aware spring. Duration depends on distance and velocity.
    Spring,
    /// Fixed-duration tween.
    Timing { duration: Duration, easing: Easing },
}

/// Everything a primitive needs to start an animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionRequest {
    pub from: f64,
    pub to: f64,
    /// Initial velocity in pixels per millisecond, if known.
    pub velocity: Option<f64>,
    pub kind: MotionKind,
    pub started_at: Instant,
}

/// Host animation capability.
///
/// Implementations report progress by calling
/// [`SnapSheet::on_animation_frame`](crate::SnapSheet::on_animation_frame)
/// and completion through
/// [`SnapSheet::on_animation_complete`](crate::SnapSheet::on_animation_complete).
pub trait AnimationPrimitive {
    /// Start animating. A running animation with the same id is replaced.
    fn start(&mut self, id: AnimationId, request: MotionRequest);

    /// Stop an animation. Unknown ids are ignored.
    fn cancel(&mut self, id: AnimationId);
}

/// One frame produced by [`MotionPlayer::advance`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionTick {
    pub id: AnimationId,
    pub value: f64,
    /// The animation reached rest and was removed.
    pub done: bool,
}

// Spring constants match common mobile defaults.
const STIFFNESS: f64 = 100.0;
const DAMPING: f64 = 10.0;
const MASS: f64 = 1.0;
const REST_SPEED: f64 = 0.001;
const REST_DISPLACEMENT: f64 = 0.001;

#[derive(Debug, Clone)]
struct ActiveMotion {
    id: AnimationId,
    request: MotionRequest,
}

impl ActiveMotion {
    /// Value and whether the motion has settled at `now`.
    fn sample(&self, now: Instant) -> (f64, bool) {
        let MotionRequest {
            from,
            to,
            velocity,
            kind,
            started_at,
        } = self.request;
        let elapsed = now.saturating_duration_since(started_at);

        match kind {
            MotionKind::Timing { duration, easing } => {
                let progress = if duration.is_zero() {
                    1.0
                } else {
                    (elapsed.as_secs_f64() / duration.as_secs_f64()).min(1.0)
                };
                let eased = easing.apply(progress);
                (from + (to - from) * eased, progress >= 1.0)
            }
            MotionKind::Spring => {
                let (position, speed) =
                    spring_at(from, to, velocity.unwrap_or(0.0) * 1000.0, elapsed.as_secs_f64());
                let resting =
                    speed.abs() <= REST_SPEED && (to - position).abs() <= REST_DISPLACEMENT;
                if resting { (to, true) } else { (position, false) }
            }
        }
    }
}

/// Closed-form damped spring: position and velocity after `t` seconds.
/// `velocity` is in units per second.
fn spring_at(from: f64, to: f64, velocity: f64, t: f64) -> (f64, f64) {
    let x0 = to - from;
    let v0 = -velocity;
    let zeta = DAMPING / (2.0 * (STIFFNESS * MASS).sqrt());
    let omega0 = (STIFFNESS / MASS).sqrt();

    if zeta < 1.0 {
        let omega1 = omega0 * (1.0 - zeta * zeta).sqrt();
        let envelope = (-zeta * omega0 * t).exp();
        let (sin, cos) = (omega1 * t).sin_cos();
        let a = (v0 + zeta * omega0 * x0) / omega1;
        let position = to - envelope * (a * sin + x0 * cos);
        let speed = zeta * omega0 * envelope * (a * sin + x0 * cos)
            - envelope * (cos * (v0 + zeta * omega0 * x0) - omega1 * x0 * sin);
        (position, speed)
    } else {
        let envelope = (-omega0 * t).exp();
        let position = to - envelope * (x0 + (v0 + omega0 * x0) * t);
        let speed = envelope * (v0 * (t * omega0 - 1.0) + t * x0 * omega0 * omega0);
        (position, speed)
    }
}

/// Reference animation primitive driven by explicit [`advance`](Self::advance) calls.
#[derive(Debug, Default)]
pub struct MotionPlayer {
    active: Vec<ActiveMotion>,
}

impl MotionPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no animation is running.
    pub fn is_idle(&self) -> bool {
        self.active.is_empty()
    }

    /// Sample every running animation at `now`, pruning finished ones.
    pub fn advance(&mut self, now: Instant) -> Vec<MotionTick> {
        let ticks: Vec<MotionTick> = self
            .active
            .iter()
            .map(|motion| {
                let (value, done) = motion.sample(now);
                MotionTick {
                    id: motion.id,
                    value,
                    done,
                }
            })
            .collect();

        self.active
            .retain(|motion| !ticks.iter().any(|t| t.id == motion.id && t.done));
        ticks
    }
}

impl AnimationPrimitive for MotionPlayer {
    fn start(&mut self, id: AnimationId, request: MotionRequest) {
        self.active.retain(|motion| motion.id != id);
        self.active.push(ActiveMotion { id, request });
    }

    fn cancel(&mut self, id: AnimationId) {
        self.active.retain(|motion| motion.id != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spring_starts_at_origin() {
        let (position, _) = spring_at(600.0, 0.0, 0.0, 0.0);
        assert!((position - 600.0).abs() < 1e-9);
    }

    #[test]
    fn spring_converges() {
        let (position, speed) = spring_at(600.0, 0.0, 0.0, 5.0);
        assert!(position.abs() < 0.01);
        assert!(speed.abs() < 0.1);
    }
}
