//! The snap controller.
//!
//! [`SnapSheet`] owns the sheet's position and composes the resolver,
//! animator, gesture arbiter, anchor ranking, scroll handoff and keyboard
//! coordinator. Exactly one writer touches the position at a time, selected
//! by [`Phase`]:
//!
//! - `Dragging`: the captured gesture
//! - `Animating`: a snap motion
//! - `Lifting`: a `whole` mode keyboard lift
//!
//! The host feeds pointer, scroll, keyboard and animation callbacks in, calls
//! [`SnapSheet::tick`] when [`SnapSheet::next_deadline`] passes, and drains
//! [`SheetEvent`]s out.

use std::collections::HashMap;
use std::time::Instant;

use crate::anchor::{AnchorId, AnchorRegistry};
use crate::animator::{Completion, CompletionSource, MotionAnimator, MotionPurpose, MotionStart};
use crate::config::{KeyboardDodging, SheetOptions, SnapPoints};
use crate::error::SheetError;
use crate::event::SheetEvent;
use crate::gesture::{self, CaptureContext, DragSession, GestureSample};
use crate::handoff::{self, ScrollHandle, ScrollVelocityTracker};
use crate::keyboard::{KeyboardEvent, LiftCoordinator, LiftRequest, LiftTicket};
use crate::motion::{AnimationId, AnimationPrimitive, MotionKind, MotionPlayer, MotionRequest};
use crate::resolver::{self, Direction, ReleasePolicy};
use crate::scan::{DescendantKind, DescendantScanner};

/// Which writer owns the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Dragging,
    Animating,
    Lifting,
}

/// Placement of the sheet for rendering.
///
/// The sheet is `height` tall, sits `bottom` above the container's bottom
/// edge and is shifted down by `translate`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetFrame {
    pub translate: f64,
    pub bottom: f64,
    pub height: f64,
}

/// Headless snap-point motion controller.
pub struct SnapSheet<P: AnimationPrimitive> {
    options: SheetOptions,
    points: SnapPoints,
    primitive: P,
    animator: MotionAnimator,
    phase: Phase,
    position: f64,
    target_index: usize,
    settled_index: usize,
    scroll_enabled: bool,
    drag: Option<DragSession>,
    anchors: AnchorRegistry,
    /// One tracker per anchor; samples from different scrollables never mix.
    scroll_velocity: HashMap<AnchorId, ScrollVelocityTracker>,
    keyboard: LiftCoordinator,
    /// Lift applied by moving the whole sheet, as opposed to shifting offsets.
    whole_lift: f64,
    inputs: Vec<u64>,
    resnap_pending: bool,
    events: Vec<SheetEvent>,
}

impl<P: AnimationPrimitive> SnapSheet<P> {
    /// Validate `options` and build a sheet resting at its initial index.
    pub fn new(options: SheetOptions, primitive: P) -> Result<Self, SheetError> {
        let points = SnapPoints::new(options.snap_points.clone())?;
        let len = points.len();
        if options.min_snap_index >= len {
            return Err(SheetError::MinIndexOutOfRange {
                index: options.min_snap_index,
                len,
            });
        }
        if options.initial_snap_index >= len {
            return Err(SheetError::InitialIndexOutOfRange {
                index: options.initial_snap_index,
                len,
            });
        }

        let initial = options.initial_snap_index.max(options.min_snap_index);
        let position = points.translate(initial).unwrap_or_default();
        log::debug!(
            "[sheet] created with {len} snap points at index {initial} (keyboard {})",
            options.keyboard_dodging
        );

        Ok(Self {
            anchors: AnchorRegistry::new(options.current_anchor_tag.clone()),
            keyboard: LiftCoordinator::new(
                options.keyboard_dodging,
                options.keyboard_dodging_offset,
            ),
            scroll_enabled: initial == points.last_index(),
            options,
            points,
            primitive,
            animator: MotionAnimator::new(),
            phase: Phase::Idle,
            position,
            target_index: initial,
            settled_index: initial,
            drag: None,
            scroll_velocity: HashMap::new(),
            whole_lift: 0.0,
            inputs: Vec::new(),
            resnap_pending: false,
            events: Vec::new(),
        })
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn options(&self) -> &SheetOptions {
        &self.options
    }

    pub fn snap_points(&self) -> &SnapPoints {
        &self.points
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current translate value (0 at full expansion).
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Last commanded snap index.
    pub fn target_index(&self) -> usize {
        self.target_index
    }

    /// Last snap index the sheet settled at.
    pub fn settled_index(&self) -> usize {
        self.settled_index
    }

    /// True when idle at the commanded index.
    pub fn is_settled(&self) -> bool {
        self.phase == Phase::Idle && self.target_index == self.settled_index
    }

    /// Whether the preferred anchor may scroll natively.
    pub fn scroll_enabled(&self) -> bool {
        self.scroll_enabled
    }

    /// Committed keyboard lift.
    pub fn lift(&self) -> f64 {
        self.keyboard.current_lift()
    }

    pub fn keyboard_dodging(&self) -> KeyboardDodging {
        self.keyboard.mode()
    }

    pub fn anchors(&self) -> &AnchorRegistry {
        &self.anchors
    }

    pub fn preferred_anchor(&self) -> Option<AnchorId> {
        self.anchors.preferred()
    }

    /// Ids of text inputs found by the last [`sync_descendants`](Self::sync_descendants).
    pub fn inputs(&self) -> &[u64] {
        &self.inputs
    }

    pub fn frame(&self) -> SheetFrame {
        SheetFrame {
            translate: self.position,
            bottom: self.points.lift(),
            height: self.points.base()[self.points.last_index()],
        }
    }

    pub fn primitive(&self) -> &P {
        &self.primitive
    }

    pub fn primitive_mut(&mut self) -> &mut P {
        &mut self.primitive
    }

    /// Take every event queued since the last call.
    pub fn drain_events(&mut self) -> Vec<SheetEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Earliest instant at which [`tick`](Self::tick) has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        [self.animator.next_deadline(), self.anchors.next_deadline()]
            .into_iter()
            .flatten()
            .min()
    }

    // =========================================================================
    // Snap control
    // =========================================================================

    /// Snap to `index`, even when user gestures are disabled.
    pub fn snap(&mut self, index: usize, now: Instant) -> Result<(), SheetError> {
        self.animate_to(index, None, true, now)
    }

    /// Animate to `index` with an optional initial velocity (pixels per ms).
    ///
    /// A no-op when the sheet is disabled unless `force` is set. Indices
    /// below the minimum are raised to it; indices past the last snap point
    /// are an error.
    pub fn animate_to(
        &mut self,
        index: usize,
        velocity: Option<f64>,
        force: bool,
        now: Instant,
    ) -> Result<(), SheetError> {
        if self.options.disabled && !force {
            log::trace!("[sheet] ignoring snap to {index}: disabled");
            return Ok(());
        }
        let last = self.points.last_index();
        if index > last {
            return Err(SheetError::InvalidSnapIndex { index, max: last });
        }
        self.start_snap(index.max(self.options.min_snap_index), velocity, now);
        Ok(())
    }

    /// Enable or disable user gestures.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.options.disabled = disabled;
    }

    /// Replace the snap points.
    ///
    /// Re-snaps to the current target immediately, or once the running drag
    /// or lift finishes.
    pub fn set_snap_points(&mut self, points: Vec<f64>, now: Instant) -> Result<(), SheetError> {
        let mut next = SnapPoints::new(points)?;
        if self.options.min_snap_index >= next.len() {
            return Err(SheetError::MinIndexOutOfRange {
                index: self.options.min_snap_index,
                len: next.len(),
            });
        }
        next.set_lift(self.points.lift());
        self.options.snap_points = next.base().to_vec();
        self.points = next;

        let last = self.points.last_index();
        self.target_index = self.target_index.min(last);
        self.settled_index = self.settled_index.min(last);

        match self.phase {
            Phase::Dragging | Phase::Lifting => {
                log::debug!("[sheet] resnap deferred while {:?}", self.phase);
                self.resnap_pending = true;
            }
            Phase::Idle | Phase::Animating => self.resnap(now),
        }
        Ok(())
    }

    fn resnap(&mut self, now: Instant) {
        let index = resolver::clamp_index(
            self.target_index,
            self.options.min_snap_index,
            self.points.len(),
        );
        log::debug!("[sheet] resnap to {index}");
        self.start_snap(index, None, now);
    }

    fn start_snap(&mut self, index: usize, velocity: Option<f64>, now: Instant) {
        self.drag = None;
        self.set_scroll_enabled(index == self.points.last_index());
        self.target_index = index;
        self.events.push(SheetEvent::SnapIndex(index));

        let request = MotionRequest {
            from: self.position,
            to: self.target_translate(index),
            velocity,
            kind: MotionKind::Spring,
            started_at: now,
        };
        log::debug!(
            "[sheet] snap {} -> {index} ({:.1} -> {:.1})",
            self.settled_index,
            request.from,
            request.to
        );

        match self
            .animator
            .start(&mut self.primitive, request, MotionPurpose::Snap(index))
        {
            MotionStart::Started(_) => self.phase = Phase::Animating,
            MotionStart::Immediate(completion) => self.settle(completion, now),
        }
    }

    fn settle(&mut self, completion: Completion, now: Instant) {
        // After a timeout the primitive keeps delivering frames until it stops.
        if completion.source != CompletionSource::Timeout {
            self.position = completion.target;
        }
        self.phase = Phase::Idle;

        match completion.purpose {
            MotionPurpose::Snap(index) => {
                self.settled_index = index;
                log::debug!("[sheet] settled at {index} ({:?})", completion.source);
                self.events.push(SheetEvent::SnapFinish(index));
            }
            MotionPurpose::Lift => {
                log::debug!(
                    "[keyboard] lift settled at {:.1} ({:?})",
                    self.whole_lift,
                    completion.source
                );
            }
        }

        self.flush_lift(now);
        if self.resnap_pending && self.phase == Phase::Idle {
            self.resnap_pending = false;
            self.resnap(now);
        }
    }

    fn target_translate(&self, index: usize) -> f64 {
        self.points.translate(index).unwrap_or_default() - self.whole_lift
    }

    /// Amount of the sheet shown, in lifted offset space.
    fn shown(&self) -> f64 {
        self.points.shown(self.position + self.whole_lift)
    }

    fn set_scroll_enabled(&mut self, enabled: bool) {
        if self.scroll_enabled != enabled {
            self.scroll_enabled = enabled;
            self.events.push(SheetEvent::ScrollEnabled(enabled));
        }
    }

    // =========================================================================
    // Animation callbacks
    // =========================================================================

    /// A frame from the primitive. Frames of cancelled motions are ignored.
    pub fn on_animation_frame(&mut self, id: AnimationId, value: f64) {
        if self.phase == Phase::Dragging || !self.animator.owns(id) {
            log::trace!("[sheet] dropping frame of {id}");
            return;
        }
        self.position = value;
    }

    /// The primitive finished `id`.
    pub fn on_animation_complete(&mut self, id: AnimationId, now: Instant) {
        match self.animator.on_complete(id) {
            Some(completion) => self.settle(completion, now),
            None => log::trace!("[sheet] ignoring completion of {id}"),
        }
    }

    /// Fire due timers: the completion timeout and the anchor re-rank.
    pub fn tick(&mut self, now: Instant) {
        if let Some(completion) = self.animator.poll(now) {
            log::debug!("[sheet] {} completion timed out", completion.id);
            self.settle(completion, now);
        }
        if self.anchors.poll(now) {
            self.events
                .push(SheetEvent::PreferredAnchor(self.anchors.preferred()));
        }
    }

    // =========================================================================
    // Gestures
    // =========================================================================

    /// Decide whether the sheet captures a pointer move. Starts a drag on capture.
    pub fn should_capture(&mut self, sample: GestureSample) -> bool {
        match self.phase {
            Phase::Dragging => return true,
            Phase::Lifting => {
                log::trace!("[sheet] not capturing while lifting");
                return false;
            }
            Phase::Idle | Phase::Animating => {}
        }

        let context = CaptureContext {
            disabled: self.options.disabled,
            scroll_enabled: self.scroll_enabled,
            anchor_scroll_offset: self.anchors.preferred_record().map(|r| r.scroll_offset),
        };
        if !gesture::should_capture(context, sample) {
            return false;
        }

        self.begin_drag();
        true
    }

    fn begin_drag(&mut self) {
        self.animator.cancel(&mut self.primitive);
        self.set_scroll_enabled(false);

        let floor = if self.options.loosen_min_snap {
            0
        } else {
            self.options.min_snap_index
        };
        let session = DragSession::new(
            self.position,
            self.target_translate(self.points.last_index()),
            self.target_translate(floor),
        );
        log::debug!("[sheet] drag start at {:.1}", session.origin());
        self.drag = Some(session);
        self.phase = Phase::Dragging;
    }

    /// Follow the pointer. Moves past the allowed range leave the position unchanged.
    pub fn drag_move(&mut self, sample: GestureSample) {
        let Some(drag) = self.drag.filter(|_| self.phase == Phase::Dragging) else {
            return;
        };
        match drag.position_for(sample.dy) {
            Some(position) => self.position = position,
            None => log::trace!("[sheet] drag dy={:.1} out of range", sample.dy),
        }
    }

    /// End the drag and animate to the resolved snap index.
    ///
    /// Returns the target index, or `None` if no drag was in progress.
    pub fn release(&mut self, sample: GestureSample, now: Instant) -> Option<usize> {
        if self.phase != Phase::Dragging {
            return None;
        }
        self.drag = None;
        self.resnap_pending = false;

        let policy = ReleasePolicy {
            snap_while_decelerating: self.options.snap_while_decelerating,
            min_snap_index: self.options.min_snap_index,
        };
        let target = resolver::resolve_release(
            self.points.offsets(),
            self.shown(),
            sample.dy,
            sample.vy,
            policy,
        );
        log::debug!(
            "[sheet] release dy={:.1} vy={:.3} -> {target}",
            sample.dy,
            sample.vy
        );

        let expanding = Direction::from_velocity(sample.vy) == Direction::Expand;
        self.start_snap(target, expanding.then_some(sample.vy), now);

        if self.options.inherit_scroll_velocity_on_expand && target == self.points.last_index() {
            self.inherit_into_scroll(sample.vy);
        }
        Some(target)
    }

    /// The gesture was taken away (pointer cancel). Return to the target index.
    pub fn cancel_gesture(&mut self, now: Instant) {
        if self.phase != Phase::Dragging {
            return;
        }
        log::debug!("[sheet] drag cancelled");
        self.start_snap(self.target_index, None, now);
    }

    fn inherit_into_scroll(&mut self, vy: f64) {
        let Some(offset) = handoff::expand_scroll_target(vy) else {
            return;
        };
        let Some(anchor) = self.anchors.preferred() else {
            log::trace!("[sheet] no preferred anchor to inherit velocity");
            return;
        };
        let Some(handle) = self.anchors.preferred_handle_mut() else {
            log::debug!("[sheet] {anchor} has no scroll handle");
            return;
        };

        match handoff::apply_scroll(handle, offset) {
            Some(capability) => {
                log::debug!(
                    "[sheet] {anchor} inherits fling as scroll to {offset:.1} via {capability:?}"
                );
                self.events.push(SheetEvent::ScrollInherited {
                    anchor,
                    offset,
                    capability,
                });
            }
            None => log::debug!("[sheet] {anchor} exposes no scroll capability"),
        }
    }

    // =========================================================================
    // Scroll anchors
    // =========================================================================

    /// Register a mounted scrollable. Returns true if it is new.
    pub fn register_anchor(
        &mut self,
        id: AnchorId,
        path: Vec<usize>,
        tag: Option<String>,
        now: Instant,
    ) -> bool {
        self.anchors.register(id, path, tag, now)
    }

    /// Forget an unmounted scrollable. Returns true if it was registered.
    pub fn unregister_anchor(&mut self, id: AnchorId, now: Instant) -> bool {
        self.scroll_velocity.remove(&id);
        self.anchors.unregister(id, now).is_some()
    }

    /// Attach the host's scroll capability to an anchor.
    pub fn attach_scroll_handle(&mut self, id: AnchorId, handle: Box<dyn ScrollHandle>) -> bool {
        self.anchors.attach_handle(id, handle)
    }

    /// Change the tag selecting the preferred anchor. Re-ranks immediately.
    pub fn set_current_anchor_tag(&mut self, tag: Option<String>) {
        self.options.current_anchor_tag = tag.clone();
        if self.anchors.set_current_tag(tag) {
            self.events
                .push(SheetEvent::PreferredAnchor(self.anchors.preferred()));
        }
    }

    /// Reconcile anchors and inputs with a scan of the host tree.
    ///
    /// Scrollables no longer reported are unregistered; new ones are
    /// registered.
    pub fn sync_descendants(&mut self, scanner: &dyn DescendantScanner, now: Instant) {
        let mut mounted: Vec<(AnchorId, Vec<usize>, Option<String>)> = Vec::new();
        let mut inputs = Vec::new();
        scanner.scan(&mut |descendant| match descendant.kind {
            DescendantKind::Scrollable => mounted.push((
                AnchorId(descendant.id),
                descendant.path.to_vec(),
                descendant.anchor_tag.map(str::to_owned),
            )),
            DescendantKind::TextInput => inputs.push(descendant.id),
        });

        for id in self.anchors.ids() {
            if !mounted.iter().any(|(mounted_id, ..)| *mounted_id == id) {
                self.unregister_anchor(id, now);
            }
        }
        for (id, path, tag) in mounted {
            self.anchors.register(id, path, tag, now);
        }
        self.inputs = inputs;
    }

    /// A scroll event from an anchor.
    ///
    /// When the preferred anchor overscrolls its top edge while moving up,
    /// its velocity is handed to the sheet, which collapses. Returns true if
    /// that handoff happened.
    pub fn on_anchor_scroll(&mut self, id: AnchorId, offset: f64, now: Instant) -> bool {
        if !self.anchors.set_scroll_offset(id, offset) {
            log::trace!("[sheet] scroll from unknown {id}");
            return false;
        }
        if !self.options.inherit_scroll_velocity_on_collapse {
            self.scroll_velocity.remove(&id);
            return false;
        }
        if self.anchors.preferred().is_some_and(|preferred| preferred != id) {
            return false;
        }

        let velocity = self.scroll_velocity.entry(id).or_default().sample(offset, now);
        if self.options.disabled || !self.scroll_enabled || offset > 0.0 || velocity >= 0.0 {
            return false;
        }
        if matches!(self.phase, Phase::Dragging | Phase::Lifting) {
            return false;
        }

        self.set_scroll_enabled(false);
        let current = resolver::resolve(
            self.points.offsets(),
            self.shown(),
            Direction::Collapse,
            0,
        );
        let target = if self.options.snap_while_decelerating {
            current.saturating_sub(1)
        } else {
            0
        };
        let target = target.max(self.options.min_snap_index);
        log::debug!("[sheet] {id} overscrolled at {velocity:.3}px/ms, collapsing to {target}");
        self.start_snap(target, Some(-velocity), now);
        true
    }

    // =========================================================================
    // Keyboard
    // =========================================================================

    /// A keyboard change. Returns a ticket when the host must measure
    /// before the lift is known.
    pub fn on_keyboard(&mut self, event: KeyboardEvent, now: Instant) -> Option<LiftTicket> {
        match self.keyboard.on_keyboard(event) {
            LiftRequest::Resolved(lift) => {
                self.offer_lift(lift, now);
                None
            }
            LiftRequest::Measure(ticket) => Some(ticket),
        }
    }

    /// The host measured the element named by `ticket`.
    ///
    /// Returns false if a newer keyboard change superseded the ticket.
    pub fn on_lift_measured(
        &mut self,
        ticket: LiftTicket,
        element_bottom: f64,
        now: Instant,
    ) -> bool {
        match self.keyboard.on_measured(ticket, element_bottom) {
            Some(lift) => {
                self.offer_lift(lift, now);
                true
            }
            None => false,
        }
    }

    /// Switch keyboard dodging modes. Switching to `off` drops any lift.
    pub fn set_keyboard_dodging(&mut self, mode: KeyboardDodging, now: Instant) {
        if mode == self.keyboard.mode() {
            return;
        }
        let lift = match mode {
            KeyboardDodging::Off => 0.0,
            _ => self.keyboard.current_lift(),
        };
        log::debug!("[keyboard] mode {} -> {mode}", self.keyboard.mode());
        self.keyboard.set_mode(mode);
        self.options.keyboard_dodging = mode;
        self.keyboard.requeue(lift);
        self.flush_lift(now);
    }

    fn offer_lift(&mut self, lift: f64, now: Instant) {
        if !self.keyboard.offer(lift) {
            log::trace!("[keyboard] lift {lift:.1} unchanged");
            return;
        }
        self.flush_lift(now);
    }

    fn flush_lift(&mut self, now: Instant) {
        if self.phase != Phase::Idle {
            if let Some(lift) = self.keyboard.pending_lift() {
                log::debug!("[keyboard] lift {lift:.1} deferred while {:?}", self.phase);
            }
            return;
        }
        if let Some(lift) = self.keyboard.take_pending() {
            self.apply_lift(lift, now);
        }
    }

    fn apply_lift(&mut self, lift: f64, now: Instant) {
        let (whole_lift, offset_lift) = if self.keyboard.mode().is_whole() {
            (lift, 0.0)
        } else {
            (0.0, lift)
        };
        log::debug!("[keyboard] apply lift {lift:.1} ({})", self.keyboard.mode());
        self.keyboard.commit(lift);
        self.points.set_lift(offset_lift);
        self.events.push(SheetEvent::LiftChanged(lift));

        if (whole_lift - self.whole_lift).abs() < f64::EPSILON {
            return;
        }
        self.whole_lift = whole_lift;

        let request = MotionRequest {
            from: self.position,
            to: self.target_translate(self.target_index),
            velocity: None,
            kind: MotionKind::Timing {
                duration: self.options.lift_duration(),
                easing: self.options.lift_easing,
            },
            started_at: now,
        };
        match self
            .animator
            .start(&mut self.primitive, request, MotionPurpose::Lift)
        {
            MotionStart::Started(_) => self.phase = Phase::Lifting,
            MotionStart::Immediate(completion) => self.settle(completion, now),
        }
    }
}

impl SnapSheet<MotionPlayer> {
    /// Advance the built-in player to `now`, apply its frames and fire due timers.
    pub fn advance(&mut self, now: Instant) {
        for tick in self.primitive.advance(now) {
            self.on_animation_frame(tick.id, tick.value);
            if tick.done {
                self.on_animation_complete(tick.id, now);
            }
        }
        self.tick(now);
    }
}
