//! Keyboard avoidance: compute how far the sheet must lift to clear an
//! on-screen keyboard.
//!
//! Lifts are computed from a measurement the host performs asynchronously
//! (the focused input in `optimum` mode, a sentinel at the sheet's bottom
//! edge in the `whole` modes). Each keyboard change issues an intent token;
//! a measurement that arrives after a newer change is discarded.

use crate::config::KeyboardDodging;
use crate::intent::{IntentToken, IntentTokens};

/// Keyboard geometry in window coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyboardMetrics {
    pub height: f64,
    /// Window y of the keyboard's top edge.
    pub screen_y: f64,
}

/// Host source of keyboard geometry.
pub trait KeyboardMetricsProvider {
    /// Current geometry, or `None` if the keyboard is hidden.
    fn metrics(&self) -> Option<KeyboardMetrics>;
}

/// A keyboard show, hide or frame change.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KeyboardEvent {
    pub metrics: Option<KeyboardMetrics>,
    /// An input inside the sheet has focus.
    pub input_focused: bool,
}

impl KeyboardEvent {
    pub fn shown(metrics: KeyboardMetrics, input_focused: bool) -> Self {
        Self {
            metrics: Some(metrics),
            input_focused,
        }
    }

    pub fn hidden() -> Self {
        Self::default()
    }

    /// Build an event from a provider's current metrics.
    pub fn from_provider(provider: &dyn KeyboardMetricsProvider, input_focused: bool) -> Self {
        Self {
            metrics: provider.metrics(),
            input_focused,
        }
    }
}

/// Which element the host must measure to resolve a lift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureTarget {
    /// Bottom edge of the focused input.
    FocusedInput,
    /// Bottom edge of the sheet's placeholder sentinel.
    Sentinel,
}

/// Pending measurement request. Hand it back with the measured window y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiftTicket {
    pub token: IntentToken,
    pub target: MeasureTarget,
    pub keyboard_top: f64,
}

/// Outcome of a keyboard change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiftRequest {
    /// The lift is known without measuring.
    Resolved(f64),
    /// The host must measure and call back with the ticket.
    Measure(LiftTicket),
}

/// How far an element's bottom edge reaches below the keyboard's top edge.
pub fn required_lift(element_bottom: f64, keyboard_top: f64) -> f64 {
    (element_bottom - keyboard_top).max(0.0)
}

/// Lift state: the committed lift and a lift waiting for the sheet to be idle.
#[derive(Debug, Clone)]
pub struct LiftCoordinator {
    mode: KeyboardDodging,
    offset: f64,
    current_lift: f64,
    pending_lift: Option<f64>,
    intents: IntentTokens<()>,
}

impl LiftCoordinator {
    pub fn new(mode: KeyboardDodging, offset: f64) -> Self {
        Self {
            mode,
            offset,
            current_lift: 0.0,
            pending_lift: None,
            intents: IntentTokens::new(),
        }
    }

    pub fn mode(&self) -> KeyboardDodging {
        self.mode
    }

    /// Switch modes. Invalidates outstanding measurements.
    pub fn set_mode(&mut self, mode: KeyboardDodging) {
        self.mode = mode;
        self.intents.issue(());
    }

    pub fn current_lift(&self) -> f64 {
        self.current_lift
    }

    pub fn pending_lift(&self) -> Option<f64> {
        self.pending_lift
    }

    /// React to a keyboard change.
    pub fn on_keyboard(&mut self, event: KeyboardEvent) -> LiftRequest {
        let token = self.intents.issue(());

        let Some(metrics) = event.metrics.filter(|m| m.height > 0.0) else {
            return LiftRequest::Resolved(0.0);
        };

        let target = match self.mode {
            KeyboardDodging::Off => return LiftRequest::Resolved(0.0),
            KeyboardDodging::Optimum | KeyboardDodging::Whole if !event.input_focused => {
                return LiftRequest::Resolved(0.0);
            }
            KeyboardDodging::Optimum => MeasureTarget::FocusedInput,
            KeyboardDodging::Whole | KeyboardDodging::WholeAlways => MeasureTarget::Sentinel,
        };

        log::debug!(
            "[keyboard] {token} measure {target:?} against keyboard top {:.1}",
            metrics.screen_y
        );
        LiftRequest::Measure(LiftTicket {
            token,
            target,
            keyboard_top: metrics.screen_y,
        })
    }

    /// Resolve a measurement. Returns `None` if a newer keyboard change
    /// superseded the ticket.
    pub fn on_measured(&mut self, ticket: LiftTicket, element_bottom: f64) -> Option<f64> {
        if !self.intents.is_current(&(), ticket.token) {
            log::debug!("[keyboard] dropping stale measurement {}", ticket.token);
            return None;
        }

        let required = required_lift(element_bottom, ticket.keyboard_top);
        let lift = match self.mode {
            KeyboardDodging::Off => 0.0,
            KeyboardDodging::Optimum if required > 0.0 => required + self.offset,
            KeyboardDodging::Optimum => 0.0,
            KeyboardDodging::Whole | KeyboardDodging::WholeAlways => required,
        };
        Some(lift)
    }

    /// Queue a lift. Returns false if it changes nothing.
    pub fn offer(&mut self, lift: f64) -> bool {
        let effective = self.pending_lift.unwrap_or(self.current_lift);
        if (effective - lift).abs() < f64::EPSILON {
            return false;
        }
        self.pending_lift = Some(lift);
        true
    }

    /// Queue a lift even if it matches the committed one, so it is applied
    /// again under a new mode.
    pub fn requeue(&mut self, lift: f64) {
        self.pending_lift = Some(lift);
    }

    /// Take the queued lift for application.
    pub fn take_pending(&mut self) -> Option<f64> {
        self.pending_lift.take()
    }

    /// Record a lift as applied.
    pub fn commit(&mut self, lift: f64) {
        self.current_lift = lift;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shown(top: f64) -> KeyboardEvent {
        KeyboardEvent::shown(
            KeyboardMetrics {
                height: 300.0,
                screen_y: top,
            },
            true,
        )
    }

    #[test]
    fn offer_is_idempotent() {
        let mut lift = LiftCoordinator::new(KeyboardDodging::Whole, 0.0);
        assert!(!lift.offer(0.0));
        assert!(lift.offer(40.0));
        assert!(!lift.offer(40.0));
        let value = lift.take_pending().unwrap();
        lift.commit(value);
        assert!(!lift.offer(40.0));
    }

    #[test]
    fn optimum_adds_offset_only_when_lifting() {
        let mut lift = LiftCoordinator::new(KeyboardDodging::Optimum, 10.0);
        let LiftRequest::Measure(ticket) = lift.on_keyboard(shown(500.0)) else {
            panic!("expected a measurement request");
        };
        assert_eq!(lift.on_measured(ticket, 550.0), Some(60.0));

        let LiftRequest::Measure(ticket) = lift.on_keyboard(shown(500.0)) else {
            panic!("expected a measurement request");
        };
        assert_eq!(lift.on_measured(ticket, 450.0), Some(0.0));
    }
}
