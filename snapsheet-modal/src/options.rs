//! Modal configuration.

use snapsheet::SheetOptions;

use crate::state::ModalState;

/// Configuration of a [`SnapSheetModal`](crate::SnapSheetModal).
///
/// The embedded [`SheetOptions`] carry gesture, handoff and keyboard
/// settings. Its snap points, initial index and minimum index are derived
/// by the modal and ignored here.
#[derive(Debug, Clone, PartialEq)]
pub struct ModalOptions {
    /// Height of the fully opened modal.
    pub modal_height: f64,
    /// Optional intermediate resting height.
    pub middle_height: Option<f64>,
    pub initial_state: ModalState,
    /// Center the content vertically instead of docking it to the bottom.
    pub centered: bool,
    /// Block backdrop, back button and pan closing. Programmatic control still works.
    pub disabled: bool,
    pub disable_pan_gesture: bool,
    pub disable_backdrop: bool,
    pub disable_back_handler: bool,
    pub unmount_children_when_closed: bool,
    pub sheet: SheetOptions,
}

impl ModalOptions {
    pub fn new(modal_height: f64) -> Self {
        Self {
            modal_height,
            middle_height: None,
            initial_state: ModalState::Closed,
            centered: false,
            disabled: false,
            disable_pan_gesture: false,
            disable_backdrop: false,
            disable_back_handler: false,
            unmount_children_when_closed: true,
            sheet: SheetOptions::new(vec![0.0, modal_height]),
        }
    }

    /// A centered modal sized from its measured content.
    pub fn centered() -> Self {
        Self {
            centered: true,
            ..Self::new(0.0)
        }
    }

    pub fn middle_height(mut self, height: f64) -> Self {
        self.middle_height = Some(height);
        self
    }

    pub fn initial_state(mut self, state: ModalState) -> Self {
        self.initial_state = state;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn disable_pan_gesture(mut self, disable: bool) -> Self {
        self.disable_pan_gesture = disable;
        self
    }

    pub fn disable_backdrop(mut self, disable: bool) -> Self {
        self.disable_backdrop = disable;
        self
    }

    pub fn disable_back_handler(mut self, disable: bool) -> Self {
        self.disable_back_handler = disable;
        self
    }

    pub fn unmount_children_when_closed(mut self, unmount: bool) -> Self {
        self.unmount_children_when_closed = unmount;
        self
    }

    pub fn sheet(mut self, sheet: SheetOptions) -> Self {
        self.sheet = sheet;
        self
    }
}
