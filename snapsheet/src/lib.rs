pub mod anchor;
pub mod animator;
pub mod config;
pub mod error;
pub mod event;
pub mod gesture;
pub mod handoff;
pub mod intent;
pub mod keyboard;
pub mod motion;
pub mod resolver;
pub mod scan;
pub mod sheet;
pub mod timer;

pub use anchor::{AnchorId, AnchorRegistry, ScrollAnchorRecord};
pub use animator::{Completion, CompletionSource, MotionAnimator, MotionPurpose};
pub use config::{KeyboardDodging, SheetOptions, SnapPoints};
pub use error::SheetError;
pub use event::SheetEvent;
pub use gesture::{CaptureContext, DragSession, GestureSample};
pub use handoff::{ScrollCapability, ScrollHandle};
pub use intent::{IntentToken, IntentTokens};
pub use keyboard::{
    KeyboardEvent, KeyboardMetrics, KeyboardMetricsProvider, LiftTicket, MeasureTarget,
};
pub use motion::{
    AnimationId, AnimationPrimitive, Easing, MotionKind, MotionPlayer, MotionRequest, MotionTick,
};
pub use resolver::{Direction, ReleasePolicy};
pub use scan::{DescendantKind, DescendantScanner, SheetNode};
pub use sheet::{Phase, SheetFrame, SnapSheet};
pub use timer::Debounce;
