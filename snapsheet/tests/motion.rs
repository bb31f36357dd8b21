use std::time::{Duration, Instant};

use snapsheet::animator::{completion_timeout, CompletionSource, MotionAnimator, MotionStart};
use snapsheet::{
    AnimationId, AnimationPrimitive, Easing, MotionKind, MotionPlayer, MotionPurpose,
    MotionRequest,
};

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

fn tween(from: f64, to: f64, now: Instant) -> MotionRequest {
    MotionRequest {
        from,
        to,
        velocity: None,
        kind: MotionKind::Timing {
            duration: ms(200),
            easing: Easing::Linear,
        },
        started_at: now,
    }
}

fn spring(from: f64, to: f64, velocity: Option<f64>, now: Instant) -> MotionRequest {
    MotionRequest {
        from,
        to,
        velocity,
        kind: MotionKind::Spring,
        started_at: now,
    }
}

// ============================================================================
// Easing
// ============================================================================

#[test]
fn test_easing_endpoints() {
    for easing in [
        Easing::Linear,
        Easing::EaseIn,
        Easing::EaseOut,
        Easing::EaseInOut,
    ] {
        assert_eq!(easing.apply(0.0), 0.0, "{easing:?} at 0");
        assert_eq!(easing.apply(1.0), 1.0, "{easing:?} at 1");
    }
}

#[test]
fn test_ease_out_leads_ease_in() {
    assert!(Easing::EaseOut.apply(0.3) > Easing::Linear.apply(0.3));
    assert!(Easing::EaseIn.apply(0.3) < Easing::Linear.apply(0.3));
    assert_eq!(Easing::EaseInOut.apply(0.5), 0.5);
}

// ============================================================================
// Motion Player
// ============================================================================

#[test]
fn test_timing_motion_reaches_target() {
    let now = Instant::now();
    let mut player = MotionPlayer::new();
    player.start(AnimationId(1), tween(0.0, 100.0, now));

    let ticks = player.advance(now + ms(100));
    assert_eq!(ticks.len(), 1);
    assert!((ticks[0].value - 50.0).abs() < 1e-9);
    assert!(!ticks[0].done);

    let ticks = player.advance(now + ms(250));
    assert_eq!(ticks[0].value, 100.0);
    assert!(ticks[0].done);
    assert!(player.is_idle());
}

#[test]
fn test_cancelled_motion_stops_ticking() {
    let now = Instant::now();
    let mut player = MotionPlayer::new();
    player.start(AnimationId(1), tween(0.0, 100.0, now));
    player.cancel(AnimationId(1));
    assert!(player.advance(now + ms(50)).is_empty());
}

#[test]
fn test_spring_settles_on_target() {
    let now = Instant::now();
    let mut player = MotionPlayer::new();
    player.start(AnimationId(7), spring(600.0, 0.0, None, now));

    let ticks = player.advance(now + ms(5_000));
    assert_eq!(ticks[0].value, 0.0);
    assert!(ticks[0].done);
}

#[test]
fn test_spring_honours_initial_velocity() {
    let now = Instant::now();
    let mut player = MotionPlayer::new();
    player.start(AnimationId(1), spring(600.0, 0.0, None, now));
    player.start(AnimationId(2), spring(600.0, 0.0, Some(-2.0), now));

    let ticks = player.advance(now + ms(30));
    let resting = ticks.iter().find(|t| t.id == AnimationId(1)).unwrap();
    let flung = ticks.iter().find(|t| t.id == AnimationId(2)).unwrap();
    assert!(flung.value < resting.value);
}

// ============================================================================
// Animator
// ============================================================================

#[test]
fn test_completion_timeout_scales_with_distance() {
    assert_eq!(completion_timeout(0.0), ms(300));
    assert_eq!(completion_timeout(100.0), ms(300));
    assert_eq!(completion_timeout(-1_000.0), ms(700));
    assert_eq!(completion_timeout(2_000.0), ms(1_400));
}

#[test]
fn test_zero_distance_completes_immediately() {
    let now = Instant::now();
    let mut player = MotionPlayer::new();
    let mut animator = MotionAnimator::new();

    let request = spring(300.0, 300.0, None, now);
    let start = animator.start(&mut player, request, MotionPurpose::Snap(1));
    match start {
        MotionStart::Immediate(completion) => {
            assert_eq!(completion.source, CompletionSource::Immediate);
            assert_eq!(completion.purpose, MotionPurpose::Snap(1));
        }
        MotionStart::Started(id) => panic!("unexpected animation {id}"),
    }
    assert!(player.is_idle());
    assert!(!animator.is_settling());
}

#[test]
fn test_completion_reported_once() {
    let now = Instant::now();
    let mut player = MotionPlayer::new();
    let mut animator = MotionAnimator::new();

    let MotionStart::Started(id) =
        animator.start(&mut player, spring(0.0, 500.0, None, now), MotionPurpose::Snap(2))
    else {
        panic!("expected a running animation");
    };
    assert_eq!(animator.next_deadline(), Some(now + ms(350)));

    assert!(animator.poll(now + ms(349)).is_none());
    let completion = animator.poll(now + ms(350)).unwrap();
    assert_eq!(completion.source, CompletionSource::Timeout);
    assert!(animator.poll(now + ms(400)).is_none());

    // Frames are still owned until the primitive finishes.
    assert!(animator.owns(id));
    assert!(animator.on_complete(id).is_none());
    assert!(!animator.owns(id));
}

#[test]
fn test_restart_cancels_previous_motion() {
    let now = Instant::now();
    let mut player = MotionPlayer::new();
    let mut animator = MotionAnimator::new();

    let MotionStart::Started(first) =
        animator.start(&mut player, tween(0.0, 100.0, now), MotionPurpose::Lift)
    else {
        panic!("expected a running animation");
    };
    let MotionStart::Started(second) =
        animator.start(&mut player, tween(50.0, 0.0, now), MotionPurpose::Snap(0))
    else {
        panic!("expected a running animation");
    };

    assert_ne!(first, second);
    assert!(animator.on_complete(first).is_none());
    assert_eq!(animator.current(), Some(second));

    let ticks = player.advance(now + ms(10));
    assert_eq!(ticks.len(), 1);
    assert_eq!(ticks[0].id, second);
}
