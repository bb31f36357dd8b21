//! Modal state machine on top of [`SnapSheet`].
//!
//! A modal rests `closed`, at an optional `middle` height or `opened`. Open,
//! close and middle requests are always honored, even when user gestures
//! are disabled. Requests made to a centered modal before it is measured
//! wait for the measurement, and only the latest request per state runs.

use std::collections::HashMap;
use std::time::Instant;

use snapsheet::{
    AnchorId, AnimationId, AnimationPrimitive, DescendantScanner, GestureSample, IntentToken,
    IntentTokens, KeyboardDodging, KeyboardEvent, LiftTicket, MotionPlayer, SheetError,
    SheetEvent, SheetOptions, SnapSheet,
};
use thiserror::Error;
use tokio::sync::oneshot;

use crate::input::FocusableInput;
use crate::options::ModalOptions;
use crate::state::ModalState;
use crate::ticket::{SnapOutcome, SnapTicket};

/// Snap points of a centered modal before it is measured.
const CENTERED_PLACEHOLDER: [f64; 2] = [0.0, 0.3];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModalError {
    #[error("middle snap requested but no middle height is configured")]
    NoMiddleSnap,

    #[error("initial state 'middle' requires a middle height")]
    MiddleRequiredForInitialState,

    #[error("state must be any of closed, middle, opened but got '{0}'")]
    UnknownState(String),

    #[error(transparent)]
    Sheet(#[from] SheetError),
}

/// Lifecycle notifications for the host.
#[derive(Debug, Clone, PartialEq)]
pub enum ModalEvent {
    /// The modal settled in a new state.
    StateChanged(ModalState),
    /// The modal settled open after being closed.
    Opened,
    /// The modal settled closed.
    Closed,
    /// Passed through from the sheet.
    Sheet(SheetEvent),
}

struct PendingSnap {
    state: ModalState,
    token: IntentToken,
    reply: oneshot::Sender<SnapOutcome>,
}

/// A snap sheet driven as a modal.
pub struct SnapSheetModal<P: AnimationPrimitive> {
    options: ModalOptions,
    sheet: SnapSheet<P>,
    has_middle: bool,
    view: Option<(f64, f64)>,
    content_height: Option<f64>,
    current_state: ModalState,
    future_state: ModalState,
    reported_state: ModalState,
    release_unmount: bool,
    tokens: IntentTokens<ModalState>,
    pending: Vec<PendingSnap>,
    inputs: HashMap<u64, Box<dyn FocusableInput>>,
    events: Vec<ModalEvent>,
}

impl<P: AnimationPrimitive> SnapSheetModal<P> {
    pub fn new(mut options: ModalOptions, primitive: P) -> Result<Self, ModalError> {
        if options.centered {
            if options.middle_height.take().is_some() {
                log::warn!("[modal] middle height is ignored by centered modals");
            }
            if options.initial_state == ModalState::Middle {
                options.initial_state = ModalState::Opened;
            }
        }
        let has_middle = options.middle_height.is_some();
        if options.initial_state == ModalState::Middle && !has_middle {
            return Err(ModalError::MiddleRequiredForInitialState);
        }

        let initial = options.initial_state;
        let snap_points = if options.centered {
            CENTERED_PLACEHOLDER.to_vec()
        } else {
            docked_points(&options)
        };
        let keyboard_dodging = if initial == ModalState::Closed {
            KeyboardDodging::Off
        } else {
            options.sheet.keyboard_dodging
        };
        let sheet_options = SheetOptions {
            snap_points,
            initial_snap_index: initial.index(has_middle),
            min_snap_index: 0,
            disabled: options.centered || options.disabled || options.disable_pan_gesture,
            keyboard_dodging,
            ..options.sheet.clone()
        };
        let sheet = SnapSheet::new(sheet_options, primitive)?;
        log::debug!(
            "[modal] created {initial} (middle: {has_middle}, centered: {})",
            options.centered
        );

        Ok(Self {
            options,
            sheet,
            has_middle,
            view: None,
            content_height: None,
            current_state: initial,
            future_state: initial,
            reported_state: initial,
            release_unmount: false,
            tokens: IntentTokens::new(),
            pending: Vec::new(),
            inputs: HashMap::new(),
            events: Vec::new(),
        })
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn options(&self) -> &ModalOptions {
        &self.options
    }

    /// Settled state.
    pub fn state(&self) -> ModalState {
        self.current_state
    }

    /// State the modal is moving toward.
    pub fn future_state(&self) -> ModalState {
        self.future_state
    }

    pub fn has_middle(&self) -> bool {
        self.has_middle
    }

    /// Settled closed with no motion toward another state.
    pub fn has_closed(&self) -> bool {
        self.current_state == ModalState::Closed && self.future_state == ModalState::Closed
    }

    pub fn will_close(&self) -> bool {
        self.future_state == ModalState::Closed
    }

    /// Open or opening.
    pub fn is_opened(&self) -> bool {
        !self.will_close()
    }

    /// Whether the host should keep the modal's children mounted.
    pub fn children_mounted(&self) -> bool {
        !(self.has_closed() && self.options.unmount_children_when_closed && !self.release_unmount)
    }

    /// Measured height of centered content, if known.
    pub fn content_height(&self) -> Option<f64> {
        self.content_height
    }

    pub fn sheet(&self) -> &SnapSheet<P> {
        &self.sheet
    }

    pub fn sheet_mut(&mut self) -> &mut SnapSheet<P> {
        &mut self.sheet
    }

    pub fn drain_events(&mut self) -> Vec<ModalEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.sheet.next_deadline()
    }

    // =========================================================================
    // Snap requests
    // =========================================================================

    pub fn open(&mut self, now: Instant) -> Result<SnapTicket, ModalError> {
        self.request(ModalState::Opened, now)
    }

    pub fn close(&mut self, now: Instant) -> Result<SnapTicket, ModalError> {
        self.request(ModalState::Closed, now)
    }

    pub fn middle_snap(&mut self, now: Instant) -> Result<SnapTicket, ModalError> {
        if !self.has_middle {
            return Err(ModalError::NoMiddleSnap);
        }
        self.request(ModalState::Middle, now)
    }

    /// The backdrop was pressed. Closes unless the backdrop is disabled.
    pub fn press_backdrop(&mut self, now: Instant) -> Result<Option<SnapTicket>, ModalError> {
        if self.options.disabled || self.options.disable_backdrop || self.has_closed() {
            log::trace!("[modal] backdrop press ignored");
            return Ok(None);
        }
        self.close(now).map(Some)
    }

    /// The hardware back button was pressed. Returns true if the modal
    /// consumed it by closing.
    pub fn handle_back_press(&mut self, now: Instant) -> Result<bool, ModalError> {
        if self.options.disabled || self.options.disable_back_handler || !self.is_opened() {
            return Ok(false);
        }
        self.close(now)?;
        Ok(true)
    }

    fn request(&mut self, state: ModalState, now: Instant) -> Result<SnapTicket, ModalError> {
        let token = self.tokens.issue(state);
        let (reply, outcome) = oneshot::channel();
        let ticket = SnapTicket::new(token, outcome);

        if state != ModalState::Closed && self.options.unmount_children_when_closed {
            self.release_unmount = true;
        }
        if !self.sizing_ready() {
            log::debug!("[modal] {state} ({token}) waits for measurement");
            self.pending.push(PendingSnap { state, token, reply });
            return Ok(ticket);
        }

        let outcome = self.apply_snap(state, now)?;
        // The ticket may already be gone.
        let _ = reply.send(outcome);
        self.sync(now);
        Ok(ticket)
    }

    fn apply_snap(&mut self, state: ModalState, now: Instant) -> Result<SnapOutcome, ModalError> {
        log::debug!("[modal] snap {} -> {state}", self.current_state);
        self.sheet.snap(state.index(self.has_middle), now)?;
        Ok(SnapOutcome::Applied(state))
    }

    fn flush_pending(&mut self, now: Instant) {
        if self.pending.is_empty() || !self.sizing_ready() {
            return;
        }
        for PendingSnap { state, token, reply } in std::mem::take(&mut self.pending) {
            let outcome = if !self.tokens.is_current(&state, token) {
                log::debug!("[modal] dropping stale {state} request {token}");
                SnapOutcome::Superseded
            } else {
                match self.apply_snap(state, now) {
                    Ok(outcome) => outcome,
                    Err(err) => {
                        log::error!("[modal] deferred {state} request failed: {err}");
                        SnapOutcome::Dropped
                    }
                }
            };
            let _ = reply.send(outcome);
        }
    }

    // =========================================================================
    // Sizing
    // =========================================================================

    /// The container was laid out.
    pub fn measure_view(
        &mut self,
        width: f64,
        height: f64,
        now: Instant,
    ) -> Result<(), ModalError> {
        log::trace!("[modal] view {width:.1}x{height:.1}");
        self.view = Some((width, height));
        self.refresh_snap_points(now)
    }

    /// Centered content was laid out.
    pub fn measure_content(&mut self, height: f64, now: Instant) -> Result<(), ModalError> {
        log::trace!("[modal] content height {height:.1}");
        self.content_height = Some(height);
        self.refresh_snap_points(now)
    }

    /// Docked snap points are known up front; centered ones need both measurements.
    fn sizing_ready(&self) -> bool {
        !self.options.centered || (self.view.is_some() && self.content_height.is_some())
    }

    fn desired_points(&self) -> Option<Vec<f64>> {
        if !self.options.centered {
            return Some(docked_points(&self.options));
        }
        match (self.view, self.content_height) {
            (Some((_, view_height)), Some(content)) => {
                Some(vec![-(content / 2.0), view_height / 2.0])
            }
            _ => None,
        }
    }

    fn refresh_snap_points(&mut self, now: Instant) -> Result<(), ModalError> {
        let changed = self
            .desired_points()
            .filter(|points| self.sheet.snap_points().base() != points.as_slice());
        if let Some(points) = changed {
            log::debug!("[modal] snap points {points:?}");
            self.sheet.set_snap_points(points, now)?;
        }
        self.sync(now);
        Ok(())
    }

    // =========================================================================
    // Inputs
    // =========================================================================

    /// Track an input so it is blurred when the modal starts closing.
    pub fn register_input(&mut self, id: u64, input: Box<dyn FocusableInput>) {
        self.inputs.insert(id, input);
    }

    pub fn unregister_input(&mut self, id: u64) -> bool {
        self.inputs.remove(&id).is_some()
    }

    fn blur_inputs(&mut self) {
        for (id, input) in self.inputs.iter_mut() {
            if !input.is_focused() {
                continue;
            }
            if let Err(err) = input.blur() {
                log::error!("[modal] failed to blur input {id}: {err}");
            }
        }
    }

    // =========================================================================
    // Sheet plumbing
    // =========================================================================

    /// Collect sheet events, update modal state and run deferred requests.
    fn sync(&mut self, now: Instant) {
        loop {
            for event in self.sheet.drain_events() {
                self.handle_sheet_event(&event);
                self.events.push(ModalEvent::Sheet(event));
            }
            self.maintain(now);
            if !self.sheet.has_events() {
                break;
            }
        }
    }

    fn handle_sheet_event(&mut self, event: &SheetEvent) {
        match *event {
            SheetEvent::SnapIndex(index) => {
                let next = ModalState::from_index(index, self.has_middle);
                let closing = next == ModalState::Closed && self.future_state != ModalState::Closed;
                self.future_state = next;
                if closing {
                    log::debug!("[modal] closing");
                    self.blur_inputs();
                } else if next != ModalState::Closed && self.options.unmount_children_when_closed {
                    self.release_unmount = true;
                }
            }
            SheetEvent::SnapFinish(index) => {
                self.current_state = ModalState::from_index(index, self.has_middle);
                if self.current_state == ModalState::Closed {
                    self.release_unmount = false;
                }
                self.report_settled();
            }
            _ => {}
        }
    }

    fn report_settled(&mut self) {
        if self.future_state != self.current_state || self.current_state == self.reported_state {
            return;
        }
        let previous = std::mem::replace(&mut self.reported_state, self.current_state);
        log::debug!("[modal] state {previous} -> {}", self.current_state);
        self.events.push(ModalEvent::StateChanged(self.current_state));
        if self.current_state == ModalState::Closed {
            self.events.push(ModalEvent::Closed);
        } else if previous == ModalState::Closed {
            self.events.push(ModalEvent::Opened);
        }
    }

    fn maintain(&mut self, now: Instant) {
        let mode = if self.has_closed() {
            KeyboardDodging::Off
        } else {
            self.options.sheet.keyboard_dodging
        };
        self.sheet.set_keyboard_dodging(mode, now);

        if self.options.centered && !self.children_mounted() && self.content_height.is_some() {
            self.content_height = None;
            log::debug!("[modal] content unmounted, awaiting new measurement");
        }

        self.flush_pending(now);
    }

    // =========================================================================
    // Host callbacks
    // =========================================================================

    pub fn on_animation_frame(&mut self, id: AnimationId, value: f64) {
        self.sheet.on_animation_frame(id, value);
    }

    pub fn on_animation_complete(&mut self, id: AnimationId, now: Instant) {
        self.sheet.on_animation_complete(id, now);
        self.sync(now);
    }

    pub fn tick(&mut self, now: Instant) {
        self.sheet.tick(now);
        self.sync(now);
    }

    pub fn should_capture(&mut self, sample: GestureSample, now: Instant) -> bool {
        let captured = self.sheet.should_capture(sample);
        self.sync(now);
        captured
    }

    pub fn drag_move(&mut self, sample: GestureSample) {
        self.sheet.drag_move(sample);
    }

    pub fn release(&mut self, sample: GestureSample, now: Instant) -> Option<usize> {
        let target = self.sheet.release(sample, now);
        self.sync(now);
        target
    }

    pub fn cancel_gesture(&mut self, now: Instant) {
        self.sheet.cancel_gesture(now);
        self.sync(now);
    }

    pub fn on_anchor_scroll(&mut self, id: AnchorId, offset: f64, now: Instant) -> bool {
        let handed_off = self.sheet.on_anchor_scroll(id, offset, now);
        self.sync(now);
        handed_off
    }

    pub fn sync_descendants(&mut self, scanner: &dyn DescendantScanner, now: Instant) {
        self.sheet.sync_descendants(scanner, now);
        self.sync(now);
    }

    pub fn on_keyboard(&mut self, event: KeyboardEvent, now: Instant) -> Option<LiftTicket> {
        let ticket = self.sheet.on_keyboard(event, now);
        self.sync(now);
        ticket
    }

    pub fn on_lift_measured(
        &mut self,
        ticket: LiftTicket,
        element_bottom: f64,
        now: Instant,
    ) -> bool {
        let applied = self.sheet.on_lift_measured(ticket, element_bottom, now);
        self.sync(now);
        applied
    }
}

impl SnapSheetModal<MotionPlayer> {
    /// Advance the built-in player and process what settled.
    pub fn advance(&mut self, now: Instant) {
        self.sheet.advance(now);
        self.sync(now);
    }
}

fn docked_points(options: &ModalOptions) -> Vec<f64> {
    let mut points = vec![0.0];
    points.extend(options.middle_height);
    points.push(options.modal_height);
    points
}
