#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use snapsheet::{AnimationId, AnimationPrimitive, MotionRequest};
use snapsheet_modal::{FocusableInput, InputError, ModalOptions, SnapSheetModal};

/// Primitive double: records requests, never animates on its own.
#[derive(Debug, Default)]
pub struct ScriptedPrimitive {
    pub started: Vec<(AnimationId, MotionRequest)>,
}

impl AnimationPrimitive for ScriptedPrimitive {
    fn start(&mut self, id: AnimationId, request: MotionRequest) {
        self.started.push((id, request));
    }

    fn cancel(&mut self, _id: AnimationId) {}
}

pub type TestModal = SnapSheetModal<ScriptedPrimitive>;

pub fn modal(options: ModalOptions) -> TestModal {
    SnapSheetModal::new(options, ScriptedPrimitive::default()).unwrap()
}

/// Play the most recent animation to its end.
pub fn finish(modal: &mut TestModal, now: Instant) {
    let (id, request) = *modal
        .sheet()
        .primitive()
        .started
        .last()
        .expect("an animation was started");
    modal.on_animation_frame(id, request.to);
    modal.on_animation_complete(id, now);
}

/// Input double counting blur calls.
pub struct FakeInput {
    pub focused: bool,
    pub fail: bool,
    pub blurs: Rc<Cell<u32>>,
}

impl FakeInput {
    pub fn boxed(focused: bool, fail: bool, blurs: &Rc<Cell<u32>>) -> Box<dyn FocusableInput> {
        Box::new(Self {
            focused,
            fail,
            blurs: Rc::clone(blurs),
        })
    }
}

impl FocusableInput for FakeInput {
    fn is_focused(&self) -> bool {
        self.focused
    }

    fn blur(&mut self) -> Result<(), InputError> {
        self.blurs.set(self.blurs.get() + 1);
        if self.fail {
            return Err(InputError::Host("blur rejected".into()));
        }
        self.focused = false;
        Ok(())
    }
}
