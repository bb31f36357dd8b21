//! Sheet configuration: snap points, behaviour flags and keyboard dodging.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::SheetError;
use crate::motion::Easing;

/// Validated, strictly increasing snap offsets.
///
/// Offsets measure how much of the sheet is shown, from the bottom edge. A
/// keyboard lift shifts every offset by the same amount; the translate values
/// used for positioning are unaffected because they only depend on differences.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapPoints {
    base: Vec<f64>,
    lifted: Vec<f64>,
    lift: f64,
}

impl SnapPoints {
    /// Validate and wrap a list of offsets.
    pub fn new(points: Vec<f64>) -> Result<Self, SheetError> {
        if points.len() < 2 {
            return Err(SheetError::TooFewSnapPoints {
                count: points.len(),
            });
        }
        for (index, value) in points.iter().copied().enumerate() {
            if !value.is_finite() {
                return Err(SheetError::InvalidSnapPoint { index, value });
            }
        }
        for (index, pair) in points.windows(2).enumerate() {
            if pair[0] >= pair[1] {
                return Err(SheetError::NotAscending {
                    index,
                    value: pair[0],
                    next: pair[1],
                });
            }
        }

        Ok(Self {
            lifted: points.clone(),
            base: points,
            lift: 0.0,
        })
    }

    /// Number of snap points (always at least two).
    pub fn len(&self) -> usize {
        self.base.len()
    }

    /// Always false; kept for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    /// Index of the fully expanded snap point.
    pub fn last_index(&self) -> usize {
        self.base.len() - 1
    }

    /// Offsets as configured, without keyboard lift.
    pub fn base(&self) -> &[f64] {
        &self.base
    }

    /// Offsets including the current keyboard lift.
    pub fn offsets(&self) -> &[f64] {
        &self.lifted
    }

    /// Lifted offset of a single snap point.
    pub fn offset(&self, index: usize) -> Option<f64> {
        self.lifted.get(index).copied()
    }

    /// Current lift applied to every offset.
    pub fn lift(&self) -> f64 {
        self.lift
    }

    /// Shift every offset by `lift`.
    pub(crate) fn set_lift(&mut self, lift: f64) {
        self.lift = lift;
        self.lifted = self.base.iter().map(|v| v + lift).collect();
    }

    /// Distance between the collapsed and fully expanded snap points.
    pub fn travel(&self) -> f64 {
        self.base[self.last_index()] - self.base[0]
    }

    /// Translate value for a snap index: 0 at full expansion, growing downward.
    pub fn translate(&self, index: usize) -> Option<f64> {
        let last = self.base[self.last_index()];
        self.base.get(index).map(|v| last - v)
    }

    /// Translate values for every snap point, in index order.
    pub fn translate_values(&self) -> Vec<f64> {
        let last = self.base[self.last_index()];
        self.base.iter().map(|v| last - v).collect()
    }

    /// Amount of sheet shown (in lifted offset space) for a translate value.
    pub fn shown(&self, translate: f64) -> f64 {
        self.lifted[self.last_index()] - translate
    }
}

/// How the sheet avoids an on-screen keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum KeyboardDodging {
    /// Never lift.
    Off,
    /// Lift only as far as the focused input needs to clear the keyboard.
    #[default]
    Optimum,
    /// Move the whole sheet above the keyboard while an input is focused.
    Whole,
    /// Move the whole sheet above the keyboard whenever it is visible.
    WholeAlways,
}

impl KeyboardDodging {
    /// True for the modes that move the whole sheet.
    pub fn is_whole(self) -> bool {
        matches!(self, Self::Whole | Self::WholeAlways)
    }
}

impl FromStr for KeyboardDodging {
    type Err = SheetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(Self::Off),
            "optimum" => Ok(Self::Optimum),
            "whole" => Ok(Self::Whole),
            "whole-always" => Ok(Self::WholeAlways),
            other => Err(SheetError::UnknownDodgingMode(other.to_string())),
        }
    }
}

impl fmt::Display for KeyboardDodging {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Off => "off",
            Self::Optimum => "optimum",
            Self::Whole => "whole",
            Self::WholeAlways => "whole-always",
        };
        f.write_str(name)
    }
}

/// Per-sheet configuration.
///
/// Built with chained setters and validated by [`SnapSheet::new`](crate::SnapSheet::new).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SheetOptions {
    /// Snap offsets, strictly increasing, at least two.
    pub snap_points: Vec<f64>,
    /// Snap index to rest at after construction. Raised to `min_snap_index`.
    pub initial_snap_index: usize,
    /// Lowest index reachable by gestures and snaps.
    pub min_snap_index: usize,
    /// Let drags travel below `min_snap_index` (down to index 0).
    pub loosen_min_snap: bool,
    /// Collapse one step at a time instead of dropping to index 0.
    pub snap_while_decelerating: bool,
    /// Hand upward fling velocity to the preferred scroll anchor on full expansion.
    pub inherit_scroll_velocity_on_expand: bool,
    /// Collapse the sheet when the preferred anchor overscrolls its top edge.
    pub inherit_scroll_velocity_on_collapse: bool,
    /// Keyboard avoidance mode.
    pub keyboard_dodging: KeyboardDodging,
    /// Extra clearance added in `optimum` mode when a lift is needed.
    pub keyboard_dodging_offset: f64,
    /// Ignore user gestures. Programmatic snaps still work.
    pub disabled: bool,
    /// Anchor tag selecting the preferred scroll anchor.
    pub current_anchor_tag: Option<String>,
    /// Duration of the `whole` mode lift animation, in milliseconds.
    pub lift_duration_ms: u64,
    /// Easing of the `whole` mode lift animation.
    pub lift_easing: Easing,
}

impl Default for SheetOptions {
    fn default() -> Self {
        Self {
            snap_points: Vec::new(),
            initial_snap_index: 0,
            min_snap_index: 0,
            loosen_min_snap: false,
            snap_while_decelerating: false,
            inherit_scroll_velocity_on_expand: false,
            inherit_scroll_velocity_on_collapse: false,
            keyboard_dodging: KeyboardDodging::default(),
            keyboard_dodging_offset: 10.0,
            disabled: false,
            current_anchor_tag: None,
            lift_duration_ms: 250,
            lift_easing: Easing::EaseOut,
        }
    }
}

impl SheetOptions {
    /// Create options for the given snap points.
    pub fn new(snap_points: impl Into<Vec<f64>>) -> Self {
        Self {
            snap_points: snap_points.into(),
            ..Default::default()
        }
    }

    /// Set the initial snap index.
    pub fn initial_snap_index(mut self, index: usize) -> Self {
        self.initial_snap_index = index;
        self
    }

    /// Set the minimum snap index.
    pub fn min_snap_index(mut self, index: usize) -> Self {
        self.min_snap_index = index;
        self
    }

    /// Allow drags below the minimum snap index.
    pub fn loosen_min_snap(mut self, loosen: bool) -> Self {
        self.loosen_min_snap = loosen;
        self
    }

    /// Collapse one snap point at a time.
    pub fn snap_while_decelerating(mut self, enabled: bool) -> Self {
        self.snap_while_decelerating = enabled;
        self
    }

    /// Hand fling velocity to the preferred anchor on full expansion.
    pub fn inherit_scroll_velocity_on_expand(mut self, enabled: bool) -> Self {
        self.inherit_scroll_velocity_on_expand = enabled;
        self
    }

    /// Collapse on top-edge overscroll of the preferred anchor.
    pub fn inherit_scroll_velocity_on_collapse(mut self, enabled: bool) -> Self {
        self.inherit_scroll_velocity_on_collapse = enabled;
        self
    }

    /// Set the keyboard dodging mode.
    pub fn keyboard_dodging(mut self, mode: KeyboardDodging) -> Self {
        self.keyboard_dodging = mode;
        self
    }

    /// Set the extra clearance used in `optimum` mode.
    pub fn keyboard_dodging_offset(mut self, offset: f64) -> Self {
        self.keyboard_dodging_offset = offset;
        self
    }

    /// Disable user gestures.
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Select the preferred scroll anchor by tag.
    pub fn current_anchor_tag(mut self, tag: impl Into<String>) -> Self {
        self.current_anchor_tag = Some(tag.into());
        self
    }

    /// Configure the `whole` mode lift animation.
    pub fn lift_motion(mut self, duration: Duration, easing: Easing) -> Self {
        self.lift_duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self.lift_easing = easing;
        self
    }

    /// Duration of the lift animation.
    pub fn lift_duration(&self) -> Duration {
        Duration::from_millis(self.lift_duration_ms)
    }
}
