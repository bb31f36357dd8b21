//! Replays a scenario on a tokio clock.
//!
//! Every frame the runner applies the steps that are due, advances the
//! built-in [`MotionPlayer`] and prints what changed.

use std::io::Write;
use std::time::{Duration, Instant};

use snapsheet::{
    GestureSample, KeyboardEvent, KeyboardMetrics, LiftTicket, MotionPlayer, SheetFrame, SnapSheet,
};
use snapsheet_modal::{ModalState, SnapSheetModal, SnapTicket};
use tokio::time::MissedTickBehavior;

use crate::error::SimError;
use crate::scenario::{Action, Scenario, Step};

enum Driven {
    Sheet(SnapSheet<MotionPlayer>),
    Modal(SnapSheetModal<MotionPlayer>),
}

impl Driven {
    fn sheet(&self) -> &SnapSheet<MotionPlayer> {
        match self {
            Driven::Sheet(sheet) => sheet,
            Driven::Modal(modal) => modal.sheet(),
        }
    }

    fn sheet_mut(&mut self) -> &mut SnapSheet<MotionPlayer> {
        match self {
            Driven::Sheet(sheet) => sheet,
            Driven::Modal(modal) => modal.sheet_mut(),
        }
    }

    fn modal(&mut self, action: &Action) -> Result<&mut SnapSheetModal<MotionPlayer>, SimError> {
        match self {
            Driven::Modal(modal) => Ok(modal),
            Driven::Sheet(_) => Err(SimError::Usage(format!(
                "{action:?} needs a scenario with a modal"
            ))),
        }
    }
}

pub struct Runner<W: Write> {
    frame: Duration,
    end_ms: u64,
    steps: Vec<Step>,
    target: Driven,
    out: W,
    lift_ticket: Option<LiftTicket>,
    tickets: Vec<(ModalState, SnapTicket)>,
    last_frame: Option<SheetFrame>,
}

impl<W: Write> Runner<W> {
    pub fn new(scenario: Scenario, out: W) -> Result<Self, SimError> {
        let end_ms = scenario.last_step_ms() + scenario.settle_ms;
        let target = match &scenario.modal {
            Some(spec) => {
                let options = spec.to_options(scenario.sheet.clone())?;
                Driven::Modal(SnapSheetModal::new(options, MotionPlayer::new())?)
            }
            None => Driven::Sheet(SnapSheet::new(scenario.sheet.clone(), MotionPlayer::new())?),
        };
        Ok(Self {
            frame: Duration::from_millis(scenario.frame_ms),
            end_ms,
            steps: scenario.steps,
            target,
            out,
            lift_ticket: None,
            tickets: Vec::new(),
            last_frame: None,
        })
    }

    /// Run until every step is applied and the settle time has passed.
    pub async fn run(mut self) -> Result<W, SimError> {
        let mut interval = tokio::time::interval(self.frame);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let start = interval.tick().await.into_std();
        let mut steps = std::mem::take(&mut self.steps).into_iter().peekable();
        let mut now = start;

        log::info!("[sim] running {} steps for {}ms", steps.len(), self.end_ms);
        loop {
            let elapsed = u64::try_from(now.duration_since(start).as_millis()).unwrap_or(u64::MAX);
            while let Some(step) = steps.next_if(|step| step.at_ms <= elapsed) {
                log::debug!("[sim] {elapsed}ms {:?}", step.action);
                self.apply(&step.action, now)?;
            }

            match &mut self.target {
                Driven::Sheet(sheet) => sheet.advance(now),
                Driven::Modal(modal) => modal.advance(now),
            }
            self.report(elapsed)?;

            if steps.peek().is_none() && elapsed >= self.end_ms {
                break;
            }
            now = interval.tick().await.into_std();
        }

        log::info!("[sim] done");
        Ok(self.out)
    }

    fn apply(&mut self, action: &Action, now: Instant) -> Result<(), SimError> {
        match action {
            Action::Snap { index } => self.target.sheet_mut().snap(*index, now)?,
            Action::Drag { dy, dx, vy } => {
                let sample = GestureSample::new(*dx, *dy).with_velocity(0.0, *vy);
                let captured = match &mut self.target {
                    Driven::Sheet(sheet) => sheet.should_capture(sample),
                    Driven::Modal(modal) => modal.should_capture(sample, now),
                };
                if captured {
                    self.target.sheet_mut().drag_move(sample);
                } else {
                    writeln!(self.out, "        gesture not captured")?;
                }
            }
            Action::Release { dy, vy } => {
                let sample = GestureSample::new(0.0, *dy).with_velocity(0.0, *vy);
                let target = match &mut self.target {
                    Driven::Sheet(sheet) => sheet.release(sample, now),
                    Driven::Modal(modal) => modal.release(sample, now),
                };
                if let Some(index) = target {
                    writeln!(self.out, "        released toward {index}")?;
                }
            }
            Action::Keyboard {
                height,
                screen_y,
                focused,
            } => {
                let event = match height {
                    Some(height) => KeyboardEvent::shown(
                        KeyboardMetrics {
                            height: *height,
                            screen_y: *screen_y,
                        },
                        *focused,
                    ),
                    None => KeyboardEvent::hidden(),
                };
                let ticket = match &mut self.target {
                    Driven::Sheet(sheet) => sheet.on_keyboard(event, now),
                    Driven::Modal(modal) => modal.on_keyboard(event, now),
                };
                if let Some(ticket) = ticket {
                    writeln!(
                        self.out,
                        "        measure {:?} against keyboard top {:.1}",
                        ticket.target, ticket.keyboard_top
                    )?;
                    self.lift_ticket = Some(ticket);
                }
            }
            Action::Measured { bottom } => {
                let ticket = self
                    .lift_ticket
                    .take()
                    .ok_or_else(|| SimError::Usage("no lift measurement was requested".into()))?;
                let applied = match &mut self.target {
                    Driven::Sheet(sheet) => sheet.on_lift_measured(ticket, *bottom, now),
                    Driven::Modal(modal) => modal.on_lift_measured(ticket, *bottom, now),
                };
                if !applied {
                    writeln!(self.out, "        measurement {} was stale", ticket.token)?;
                }
            }
            Action::DodgingMode { mode } => {
                self.target.sheet_mut().set_keyboard_dodging(*mode, now);
            }
            Action::SnapPoints { points } => match &mut self.target {
                Driven::Sheet(sheet) => sheet.set_snap_points(points.clone(), now)?,
                Driven::Modal(_) => {
                    return Err(SimError::Usage(
                        "modal snap points are derived from its heights".into(),
                    ));
                }
            },
            Action::Open => {
                let ticket = self.target.modal(action)?.open(now)?;
                self.tickets.push((ModalState::Opened, ticket));
            }
            Action::Close => {
                let ticket = self.target.modal(action)?.close(now)?;
                self.tickets.push((ModalState::Closed, ticket));
            }
            Action::Middle => {
                let ticket = self.target.modal(action)?.middle_snap(now)?;
                self.tickets.push((ModalState::Middle, ticket));
            }
            Action::Backdrop => {
                if let Some(ticket) = self.target.modal(action)?.press_backdrop(now)? {
                    self.tickets.push((ModalState::Closed, ticket));
                }
            }
            Action::Back => {
                let consumed = self.target.modal(action)?.handle_back_press(now)?;
                writeln!(self.out, "        back press consumed: {consumed}")?;
            }
            Action::MeasureView { width, height } => {
                self.target.modal(action)?.measure_view(*width, *height, now)?;
            }
            Action::MeasureContent { height } => {
                self.target.modal(action)?.measure_content(*height, now)?;
            }
        }
        Ok(())
    }

    fn report(&mut self, elapsed: u64) -> Result<(), SimError> {
        match &mut self.target {
            Driven::Sheet(sheet) => {
                for event in sheet.drain_events() {
                    writeln!(self.out, "{elapsed:>6}ms {event:?}")?;
                }
            }
            Driven::Modal(modal) => {
                for event in modal.drain_events() {
                    writeln!(self.out, "{elapsed:>6}ms {event:?}")?;
                }
            }
        }

        let mut resolved = Vec::new();
        for (index, (state, ticket)) in self.tickets.iter_mut().enumerate() {
            if let Some(outcome) = ticket.try_outcome() {
                writeln!(
                    self.out,
                    "{elapsed:>6}ms {state} request {}: {outcome:?}",
                    ticket.token()
                )?;
                resolved.push(index);
            }
        }
        for index in resolved.into_iter().rev() {
            self.tickets.remove(index);
        }

        let frame = self.target.sheet().frame();
        if self.last_frame != Some(frame) {
            writeln!(
                self.out,
                "{elapsed:>6}ms translate={:.1} bottom={:.1} height={:.1}",
                frame.translate, frame.bottom, frame.height
            )?;
            self.last_frame = Some(frame);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn replay(json: &str) -> String {
        let scenario = Scenario::parse(json).unwrap();
        let out = Runner::new(scenario, Vec::new()).unwrap().run().await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn snap_settles_on_the_clock() {
        let output = replay(
            r#"{
                "sheet": { "snap_points": [0, 300, 600] },
                "steps": [{ "at_ms": 0, "action": "snap", "index": 2 }],
                "settle_ms": 4000
            }"#,
        )
        .await;

        assert!(output.contains("SnapIndex(2)"));
        assert!(output.contains("SnapFinish(2)"));
        assert!(output.contains("translate=0.0"));
    }

    #[tokio::test(start_paused = true)]
    async fn docked_modal_opens_without_waiting_for_view() {
        let output = replay(
            r#"{
                "sheet": { "snap_points": [0, 1] },
                "modal": { "modal_height": 600 },
                "steps": [{ "at_ms": 0, "action": "open" }],
                "settle_ms": 2000
            }"#,
        )
        .await;

        assert!(output.contains("     0ms opened request intent-1: Applied(Opened)"));
        assert!(output.contains("StateChanged(Opened)"));
    }

    #[tokio::test(start_paused = true)]
    async fn modal_actions_need_a_modal() {
        let scenario = Scenario::parse(
            r#"{
                "sheet": { "snap_points": [0, 600] },
                "steps": [{ "at_ms": 0, "action": "open" }]
            }"#,
        )
        .unwrap();
        let result = Runner::new(scenario, Vec::new()).unwrap().run().await;
        assert!(matches!(result, Err(SimError::Usage(_))));
    }
}
