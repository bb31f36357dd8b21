#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use snapsheet::{
    AnimationId, AnimationPrimitive, MotionRequest, ScrollHandle, SheetEvent, SheetOptions,
    SnapSheet,
};

/// Primitive double: records requests, never animates on its own.
#[derive(Debug, Default)]
pub struct ScriptedPrimitive {
    pub started: Vec<(AnimationId, MotionRequest)>,
    pub cancelled: Vec<AnimationId>,
}

impl ScriptedPrimitive {
    pub fn last(&self) -> Option<(AnimationId, MotionRequest)> {
        self.started.last().copied()
    }
}

impl AnimationPrimitive for ScriptedPrimitive {
    fn start(&mut self, id: AnimationId, request: MotionRequest) {
        self.started.push((id, request));
    }

    fn cancel(&mut self, id: AnimationId) {
        self.cancelled.push(id);
    }
}

pub type TestSheet = SnapSheet<ScriptedPrimitive>;

pub fn sheet(options: SheetOptions) -> TestSheet {
    SnapSheet::new(options, ScriptedPrimitive::default()).unwrap()
}

/// Play the most recent animation to its end.
pub fn finish(sheet: &mut TestSheet, now: Instant) {
    let (id, request) = sheet.primitive().last().expect("an animation was started");
    sheet.on_animation_frame(id, request.to);
    sheet.on_animation_complete(id, now);
}

pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

pub fn count(events: &[SheetEvent], wanted: &SheetEvent) -> usize {
    events.iter().filter(|e| *e == wanted).count()
}

/// Scroll handle that records every request it handles.
#[derive(Debug, Clone, Default)]
pub struct RecordingHandle {
    pub direct: bool,
    pub list: bool,
    pub calls: Rc<RefCell<Vec<(&'static str, f64)>>>,
}

impl ScrollHandle for RecordingHandle {
    fn scroll_to(&mut self, y: f64, _animated: bool) -> bool {
        if self.direct {
            self.calls.borrow_mut().push(("scroll_to", y));
        }
        self.direct
    }

    fn scroll_to_offset(&mut self, offset: f64, _animated: bool) -> bool {
        if self.list {
            self.calls.borrow_mut().push(("scroll_to_offset", offset));
        }
        self.list
    }
}
