//! JSON scenario model.
//!
//! ```json
//! {
//!   "sheet": { "snap_points": [0, 300, 600], "keyboard_dodging": "optimum" },
//!   "steps": [
//!     { "at_ms": 0, "action": "snap", "index": 2 },
//!     { "at_ms": 400, "action": "drag", "dy": 120, "vy": 0.4 },
//!     { "at_ms": 450, "action": "release", "dy": 120, "vy": 0.4 }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::Deserialize;
use snapsheet::{KeyboardDodging, SheetOptions};
use snapsheet_modal::{ModalOptions, ModalState};

use crate::error::SimError;

fn default_frame_ms() -> u64 {
    16
}

fn default_settle_ms() -> u64 {
    1_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub sheet: SheetOptions,
    /// Drive the sheet through a modal instead of directly.
    #[serde(default)]
    pub modal: Option<ModalSpec>,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u64,
    /// How long to keep running after the last step.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self, SimError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, SimError> {
        let mut scenario: Scenario = serde_json::from_str(text)?;
        if scenario.frame_ms == 0 {
            return Err(SimError::Usage("frame_ms must be positive".into()));
        }
        scenario.steps.sort_by_key(|step| step.at_ms);
        Ok(scenario)
    }

    /// Time of the last step.
    pub fn last_step_ms(&self) -> u64 {
        self.steps.last().map_or(0, |step| step.at_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModalSpec {
    pub modal_height: f64,
    #[serde(default)]
    pub middle_height: Option<f64>,
    #[serde(default)]
    pub initial_state: Option<String>,
    #[serde(default)]
    pub centered: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub disable_pan_gesture: bool,
    #[serde(default)]
    pub disable_backdrop: bool,
    #[serde(default)]
    pub disable_back_handler: bool,
}

impl ModalSpec {
    pub fn to_options(&self, sheet: SheetOptions) -> Result<ModalOptions, SimError> {
        let base = if self.centered {
            ModalOptions::centered()
        } else {
            ModalOptions::new(self.modal_height)
        };
        let mut options = base
            .disabled(self.disabled)
            .disable_pan_gesture(self.disable_pan_gesture)
            .disable_backdrop(self.disable_backdrop)
            .disable_back_handler(self.disable_back_handler)
            .sheet(sheet);
        if let Some(middle) = self.middle_height {
            options = options.middle_height(middle);
        }
        if let Some(state) = &self.initial_state {
            options = options.initial_state(state.parse::<ModalState>()?);
        }
        Ok(options)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    pub at_ms: u64,
    #[serde(flatten)]
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Snap { index: usize },
    /// Offer a pointer move; starts a drag if the sheet captures it.
    Drag {
        dy: f64,
        #[serde(default)]
        dx: f64,
        #[serde(default)]
        vy: f64,
    },
    Release {
        dy: f64,
        #[serde(default)]
        vy: f64,
    },
    Keyboard {
        #[serde(default)]
        height: Option<f64>,
        #[serde(default)]
        screen_y: f64,
        #[serde(default)]
        focused: bool,
    },
    /// Answer the last lift measurement request.
    Measured { bottom: f64 },
    DodgingMode { mode: KeyboardDodging },
    SnapPoints { points: Vec<f64> },
    Open,
    Close,
    Middle,
    Backdrop,
    Back,
    MeasureView { width: f64, height: f64 },
    MeasureContent { height: f64 },
}
