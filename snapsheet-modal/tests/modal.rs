mod common;

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use common::{finish, modal, FakeInput};
use snapsheet::{KeyboardDodging, KeyboardEvent, KeyboardMetrics, MeasureTarget, SheetEvent};
use snapsheet_modal::{
    ModalError, ModalEvent, ModalOptions, ModalState, SnapOutcome, SnapSheetModal,
};

fn state_events(events: &[ModalEvent]) -> Vec<ModalEvent> {
    events
        .iter()
        .filter(|e| !matches!(e, ModalEvent::Sheet(_)))
        .cloned()
        .collect()
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_modal_rests_at_initial_state() {
    let mut m = modal(
        ModalOptions::new(600.0)
            .middle_height(300.0)
            .initial_state(ModalState::Middle),
    );

    assert_eq!(m.state(), ModalState::Middle);
    assert_eq!(m.sheet().target_index(), 1);
    assert_eq!(m.sheet().snap_points().base(), &[0.0, 300.0, 600.0]);
    assert!(m.drain_events().is_empty());
}

#[test]
fn test_middle_initial_state_requires_middle_height() {
    let result = SnapSheetModal::new(
        ModalOptions::new(600.0).initial_state(ModalState::Middle),
        common::ScriptedPrimitive::default(),
    );
    assert!(matches!(result, Err(ModalError::MiddleRequiredForInitialState)));
}

#[test]
fn test_invalid_heights_are_rejected() {
    let result = SnapSheetModal::new(
        ModalOptions::new(300.0).middle_height(400.0),
        common::ScriptedPrimitive::default(),
    );
    assert!(matches!(result, Err(ModalError::Sheet(_))));
}

#[test]
fn test_centered_drops_middle_and_promotes_initial_state() {
    let m = modal(
        ModalOptions::centered()
            .middle_height(100.0)
            .initial_state(ModalState::Middle),
    );

    assert!(!m.has_middle());
    assert_eq!(m.state(), ModalState::Opened);
    assert_eq!(m.sheet().snap_points().base(), &[0.0, 0.3]);
    assert!(m.sheet().options().disabled);
}

#[test]
fn test_keyboard_dodging_off_only_while_closed() {
    let now = Instant::now();
    let mut m = modal(ModalOptions::new(600.0));
    assert_eq!(m.sheet().keyboard_dodging(), KeyboardDodging::Off);

    m.open(now).unwrap();
    assert_eq!(m.sheet().keyboard_dodging(), KeyboardDodging::Optimum);

    finish(&mut m, now);
    assert_eq!(m.sheet().keyboard_dodging(), KeyboardDodging::Optimum);

    m.close(now).unwrap();
    finish(&mut m, now);
    assert!(m.has_closed());
    assert_eq!(m.sheet().keyboard_dodging(), KeyboardDodging::Off);
}

// ============================================================================
// Snap Requests
// ============================================================================

#[test]
fn test_open_settles_with_lifecycle_events() {
    let now = Instant::now();
    let mut m = modal(ModalOptions::new(600.0));
    m.measure_view(400.0, 800.0, now).unwrap();

    let mut ticket = m.open(now).unwrap();
    assert_eq!(ticket.try_outcome(), Some(SnapOutcome::Applied(ModalState::Opened)));
    assert_eq!(m.state(), ModalState::Closed);
    assert_eq!(m.future_state(), ModalState::Opened);
    assert!(!m.has_closed());
    assert!(m.is_opened());
    assert!(m.children_mounted());

    finish(&mut m, now);
    let events = m.drain_events();
    assert!(events.contains(&ModalEvent::Sheet(SheetEvent::SnapFinish(1))));
    assert_eq!(
        state_events(&events),
        vec![ModalEvent::StateChanged(ModalState::Opened), ModalEvent::Opened]
    );
    assert!(m.is_opened());
}

#[test]
fn test_close_settles_and_unmounts_children() {
    let now = Instant::now();
    let mut m = modal(ModalOptions::new(600.0).initial_state(ModalState::Opened));
    m.measure_view(400.0, 800.0, now).unwrap();

    m.close(now).unwrap();
    assert!(m.will_close());
    assert!(m.children_mounted());

    finish(&mut m, now);
    assert_eq!(
        state_events(&m.drain_events()),
        vec![ModalEvent::StateChanged(ModalState::Closed), ModalEvent::Closed]
    );
    assert!(!m.children_mounted());
}

#[test]
fn test_children_stay_mounted_when_configured() {
    let now = Instant::now();
    let mut m = modal(
        ModalOptions::new(600.0)
            .initial_state(ModalState::Opened)
            .unmount_children_when_closed(false),
    );
    m.measure_view(400.0, 800.0, now).unwrap();
    m.close(now).unwrap();
    finish(&mut m, now);

    assert!(m.has_closed());
    assert!(m.children_mounted());
}

#[test]
fn test_middle_snap_without_middle_fails() {
    let now = Instant::now();
    let mut m = modal(ModalOptions::new(600.0));
    assert!(matches!(m.middle_snap(now), Err(ModalError::NoMiddleSnap)));
}

#[test]
fn test_programmatic_snaps_ignore_disabled() {
    let now = Instant::now();
    let mut m = modal(ModalOptions::new(600.0).middle_height(300.0).disabled(true));
    m.measure_view(400.0, 800.0, now).unwrap();

    let mut ticket = m.middle_snap(now).unwrap();
    assert_eq!(ticket.try_outcome(), Some(SnapOutcome::Applied(ModalState::Middle)));
    finish(&mut m, now);
    assert_eq!(m.state(), ModalState::Middle);
}

#[test]
fn test_no_state_change_when_settling_in_place() {
    let now = Instant::now();
    let mut m = modal(ModalOptions::new(600.0).initial_state(ModalState::Opened));
    m.measure_view(400.0, 800.0, now).unwrap();

    // Already there: the sheet settles immediately.
    m.open(now).unwrap();
    let events = m.drain_events();
    assert!(events.contains(&ModalEvent::Sheet(SheetEvent::SnapFinish(1))));
    assert!(state_events(&events).is_empty());
}

// ============================================================================
// Deferred Requests
// ============================================================================

#[test]
fn test_docked_open_needs_no_measurement() {
    let now = Instant::now();
    let mut m = modal(ModalOptions::new(600.0).middle_height(300.0));

    let mut ticket = m.middle_snap(now).unwrap();
    assert_eq!(ticket.try_outcome(), Some(SnapOutcome::Applied(ModalState::Middle)));
    assert_eq!(m.sheet().target_index(), 1);
    assert_eq!(m.sheet().primitive().started.len(), 1);

    finish(&mut m, now);
    assert_eq!(m.state(), ModalState::Middle);
}

#[tokio::test]
async fn test_centered_request_waits_for_both_measurements() {
    let now = Instant::now();
    let mut m = modal(ModalOptions::centered());

    let mut ticket = m.open(now).unwrap();
    assert_eq!(ticket.try_outcome(), None);
    assert!(m.sheet().primitive().started.is_empty());

    m.measure_view(400.0, 800.0, now).unwrap();
    assert_eq!(ticket.try_outcome(), None);

    m.measure_content(200.0, now).unwrap();
    assert_eq!(ticket.outcome().await, SnapOutcome::Applied(ModalState::Opened));
    assert_eq!(m.sheet().target_index(), 1);
}

#[tokio::test]
async fn test_latest_open_request_wins() {
    let now = Instant::now();
    let mut m = modal(ModalOptions::centered());

    let first = m.open(now).unwrap();
    let second = m.open(now).unwrap();
    assert!(second.token() > first.token());

    m.measure_view(400.0, 800.0, now).unwrap();
    m.measure_content(200.0, now).unwrap();
    assert_eq!(first.outcome().await, SnapOutcome::Superseded);
    assert_eq!(second.outcome().await, SnapOutcome::Applied(ModalState::Opened));
    assert_eq!(m.future_state(), ModalState::Opened);
}

#[tokio::test]
async fn test_dropped_modal_resolves_pending_tickets() {
    let now = Instant::now();
    let mut m = modal(ModalOptions::centered());
    let ticket = m.open(now).unwrap();
    drop(m);
    assert_eq!(ticket.outcome().await, SnapOutcome::Dropped);
}

// ============================================================================
// Backdrop and Back Button
// ============================================================================

#[test]
fn test_backdrop_closes_open_modal() {
    let now = Instant::now();
    let mut m = modal(ModalOptions::new(600.0).initial_state(ModalState::Opened));
    m.measure_view(400.0, 800.0, now).unwrap();

    assert!(m.press_backdrop(now).unwrap().is_some());
    assert!(m.will_close());
}

#[test]
fn test_backdrop_ignored_when_disabled_or_closed() {
    let now = Instant::now();
    let mut m = modal(
        ModalOptions::new(600.0)
            .initial_state(ModalState::Opened)
            .disable_backdrop(true),
    );
    m.measure_view(400.0, 800.0, now).unwrap();
    assert!(m.press_backdrop(now).unwrap().is_none());
    assert!(m.is_opened());

    let mut closed = modal(ModalOptions::new(600.0));
    closed.measure_view(400.0, 800.0, now).unwrap();
    assert!(closed.press_backdrop(now).unwrap().is_none());
}

#[test]
fn test_opening_modal_can_be_dismissed() {
    let now = Instant::now();
    let mut m = modal(ModalOptions::new(600.0));
    m.open(now).unwrap();
    assert!(m.press_backdrop(now).unwrap().is_some());
    assert!(m.will_close());

    let mut m = modal(ModalOptions::new(600.0));
    m.open(now).unwrap();
    assert!(m.handle_back_press(now).unwrap());
    assert!(m.will_close());
}

#[test]
fn test_back_press_closes_only_open_modal() {
    let now = Instant::now();
    let mut m = modal(ModalOptions::new(600.0).initial_state(ModalState::Opened));
    m.measure_view(400.0, 800.0, now).unwrap();

    assert!(m.handle_back_press(now).unwrap());
    assert!(m.will_close());
    // Already closing.
    assert!(!m.handle_back_press(now).unwrap());
}

#[test]
fn test_disabled_modal_blocks_backdrop_and_back_press() {
    let now = Instant::now();
    let mut m = modal(
        ModalOptions::new(600.0)
            .initial_state(ModalState::Opened)
            .disabled(true),
    );
    m.measure_view(400.0, 800.0, now).unwrap();

    assert!(m.press_backdrop(now).unwrap().is_none());
    assert!(!m.handle_back_press(now).unwrap());
    assert!(m.is_opened());
}

#[test]
fn test_back_handler_can_be_disabled() {
    let now = Instant::now();
    let mut m = modal(
        ModalOptions::new(600.0)
            .initial_state(ModalState::Opened)
            .disable_back_handler(true),
    );
    m.measure_view(400.0, 800.0, now).unwrap();
    assert!(!m.handle_back_press(now).unwrap());
}

#[test]
fn test_keyboard_lifts_while_opening() {
    let now = Instant::now();
    let mut m = modal(ModalOptions::new(600.0));
    m.open(now).unwrap();

    let event = KeyboardEvent::shown(
        KeyboardMetrics {
            height: 300.0,
            screen_y: 500.0,
        },
        true,
    );
    let ticket = m.on_keyboard(event, now).expect("a measurement is requested");
    assert_eq!(ticket.target, MeasureTarget::FocusedInput);
    assert_eq!(ticket.keyboard_top, 500.0);
}

// ============================================================================
// Inputs
// ============================================================================

#[test]
fn test_close_blurs_focused_inputs_despite_failures() {
    let now = Instant::now();
    let blurs = Rc::new(Cell::new(0));
    let mut m = modal(ModalOptions::new(600.0).initial_state(ModalState::Opened));
    m.register_input(1, FakeInput::boxed(true, true, &blurs));
    m.register_input(2, FakeInput::boxed(true, false, &blurs));
    m.register_input(3, FakeInput::boxed(false, false, &blurs));
    m.measure_view(400.0, 800.0, now).unwrap();

    m.close(now).unwrap();
    assert_eq!(blurs.get(), 2);
    assert!(m.will_close());

    finish(&mut m, now);
    assert_eq!(m.state(), ModalState::Closed);
}

#[test]
fn test_unregistered_input_is_not_blurred() {
    let now = Instant::now();
    let blurs = Rc::new(Cell::new(0));
    let mut m = modal(ModalOptions::new(600.0).initial_state(ModalState::Opened));
    m.register_input(1, FakeInput::boxed(true, false, &blurs));
    assert!(m.unregister_input(1));
    m.measure_view(400.0, 800.0, now).unwrap();

    m.close(now).unwrap();
    assert_eq!(blurs.get(), 0);
}

// ============================================================================
// Centered Modals
// ============================================================================

#[test]
fn test_centered_snap_points_follow_measurements() {
    let now = Instant::now();
    let mut m = modal(ModalOptions::centered().initial_state(ModalState::Opened));

    m.measure_view(400.0, 800.0, now).unwrap();
    assert_eq!(m.sheet().snap_points().base(), &[0.0, 0.3]);

    m.measure_content(200.0, now).unwrap();
    assert_eq!(m.sheet().snap_points().base(), &[-100.0, 400.0]);
    assert_eq!(m.sheet().target_index(), 1);
}

#[test]
fn test_centered_open_waits_for_content() {
    let now = Instant::now();
    let mut m = modal(ModalOptions::centered());
    assert!(!m.children_mounted());

    m.measure_view(400.0, 800.0, now).unwrap();
    let mut ticket = m.open(now).unwrap();
    assert_eq!(ticket.try_outcome(), None);
    assert!(m.children_mounted());

    m.measure_content(300.0, now).unwrap();
    assert_eq!(ticket.try_outcome(), Some(SnapOutcome::Applied(ModalState::Opened)));
    assert_eq!(m.sheet().snap_points().base(), &[-150.0, 400.0]);
}

#[test]
fn test_centered_content_remeasured_after_close() {
    let now = Instant::now();
    let mut m = modal(ModalOptions::centered().initial_state(ModalState::Opened));
    m.measure_view(400.0, 800.0, now).unwrap();
    m.measure_content(200.0, now).unwrap();

    m.close(now).unwrap();
    finish(&mut m, now);
    assert!(!m.children_mounted());
    assert_eq!(m.content_height(), None);

    let mut ticket = m.open(now).unwrap();
    assert_eq!(ticket.try_outcome(), None);

    m.measure_content(300.0, now).unwrap();
    assert_eq!(ticket.try_outcome(), Some(SnapOutcome::Applied(ModalState::Opened)));
    assert_eq!(m.sheet().snap_points().base(), &[-150.0, 400.0]);
}
