//! Motion animator with dual completion detection.
//!
//! A spring's real duration is not known up front, so completion is a race
//! between the primitive's own completion report and a timeout derived from
//! the travel distance. Whichever arrives first wins; the other is dropped.

use std::time::{Duration, Instant};

use crate::motion::{AnimationId, AnimationPrimitive, MotionRequest};

/// Lower bound of the completion timeout.
pub const MIN_COMPLETION_TIMEOUT: Duration = Duration::from_millis(300);

/// Timeout budget per pixel of travel (70ms per 100 pixels).
pub const TIMEOUT_PER_PIXEL: Duration = Duration::from_micros(700);

/// Completion timeout for a motion covering `distance` pixels.
pub fn completion_timeout(distance: f64) -> Duration {
    let micros = (distance.abs() * TIMEOUT_PER_PIXEL.as_micros() as f64).round();
    let scaled = if micros.is_finite() && micros < u64::MAX as f64 {
        Duration::from_micros(micros as u64)
    } else {
        MIN_COMPLETION_TIMEOUT
    };
    scaled.max(MIN_COMPLETION_TIMEOUT)
}

/// What a motion is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionPurpose {
    /// Travel to a snap index.
    Snap(usize),
    /// Keyboard lift retarget in `whole` mode.
    Lift,
}

/// Which signal settled a motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionSource {
    /// The primitive reported completion.
    Animation,
    /// The timeout fired first.
    Timeout,
    /// Nothing to animate; already at the target.
    Immediate,
}

/// A settled motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Completion {
    pub id: AnimationId,
    pub purpose: MotionPurpose,
    pub target: f64,
    pub source: CompletionSource,
}

/// Result of [`MotionAnimator::start`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionStart {
    /// The primitive is animating; completion arrives later.
    Started(AnimationId),
    /// No travel was needed; the motion completed synchronously.
    Immediate(Completion),
}

#[derive(Debug, Clone, Copy)]
struct PendingMotion {
    id: AnimationId,
    purpose: MotionPurpose,
    target: f64,
    deadline: Instant,
    /// One-shot guard: completion already reported.
    signalled: bool,
}

/// Drives one motion at a time and reports its completion exactly once.
#[derive(Debug, Default)]
pub struct MotionAnimator {
    next_id: u64,
    pending: Option<PendingMotion>,
}

impl MotionAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a motion, cancelling any motion still running.
    pub fn start(
        &mut self,
        primitive: &mut dyn AnimationPrimitive,
        request: MotionRequest,
        purpose: MotionPurpose,
    ) -> MotionStart {
        self.cancel(primitive);

        self.next_id += 1;
        let id = AnimationId(self.next_id);
        let distance = (request.from - request.to).abs();

        if distance < f64::EPSILON {
            log::trace!("[animator] {id} {purpose:?} already at target {}", request.to);
            return MotionStart::Immediate(Completion {
                id,
                purpose,
                target: request.to,
                source: CompletionSource::Immediate,
            });
        }

        let timeout = completion_timeout(distance);
        log::trace!(
            "[animator] {id} {purpose:?} {:.1} -> {:.1} timeout={timeout:?}",
            request.from,
            request.to
        );

        primitive.start(id, request);
        self.pending = Some(PendingMotion {
            id,
            purpose,
            target: request.to,
            deadline: request.started_at + timeout,
            signalled: false,
        });
        MotionStart::Started(id)
    }

    /// Cancel the running motion, if any. Its completion will never be reported.
    pub fn cancel(&mut self, primitive: &mut dyn AnimationPrimitive) {
        if let Some(pending) = self.pending.take() {
            log::trace!("[animator] cancel {}", pending.id);
            primitive.cancel(pending.id);
        }
    }

    /// The primitive finished `id`. Returns the completion if it won the race.
    pub fn on_complete(&mut self, id: AnimationId) -> Option<Completion> {
        let pending = self.pending.filter(|p| p.id == id)?;
        self.pending = None;
        if pending.signalled {
            return None;
        }
        Some(Completion {
            id,
            purpose: pending.purpose,
            target: pending.target,
            source: CompletionSource::Animation,
        })
    }

    /// Fire the timeout if it is due. Returns the completion if it won the race.
    ///
    /// After a timeout completion the motion keeps running until the
    /// primitive reports completion, so frames are still accepted.
    pub fn poll(&mut self, now: Instant) -> Option<Completion> {
        let pending = self.pending.as_mut()?;
        if pending.signalled || now < pending.deadline {
            return None;
        }
        pending.signalled = true;
        Some(Completion {
            id: pending.id,
            purpose: pending.purpose,
            target: pending.target,
            source: CompletionSource::Timeout,
        })
    }

    /// Returns true if frames for `id` should be applied.
    pub fn owns(&self, id: AnimationId) -> bool {
        self.pending.is_some_and(|p| p.id == id)
    }

    /// Id of the running motion.
    pub fn current(&self) -> Option<AnimationId> {
        self.pending.map(|p| p.id)
    }

    /// Returns true while a started motion has not yet reported completion.
    pub fn is_settling(&self) -> bool {
        self.pending.is_some_and(|p| !p.signalled)
    }

    /// When the pending timeout fires, if one is armed.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending
            .filter(|p| !p.signalled)
            .map(|p| p.deadline)
    }
}
