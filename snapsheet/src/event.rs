//! Events emitted by the sheet for the host to observe.

use crate::anchor::AnchorId;
use crate::handoff::ScrollCapability;

/// Something the host should react to.
///
/// Events queue inside the sheet and are collected with
/// [`SnapSheet::drain_events`](crate::SnapSheet::drain_events).
#[derive(Debug, Clone, PartialEq)]
pub enum SheetEvent {
    /// A new target index was committed; the motion toward it just started.
    SnapIndex(usize),
    /// The motion settled at this index.
    SnapFinish(usize),
    /// Native scrolling of the preferred anchor must be enabled or disabled.
    ScrollEnabled(bool),
    /// The preferred anchor changed.
    PreferredAnchor(Option<AnchorId>),
    /// The keyboard lift changed.
    LiftChanged(f64),
    /// Release velocity continued into the preferred anchor as a scroll.
    ScrollInherited {
        anchor: AnchorId,
        offset: f64,
        capability: ScrollCapability,
    },
}
