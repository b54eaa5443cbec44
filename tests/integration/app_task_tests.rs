//! Integration tests for the mailbox → AppTask → ports pipeline.
//!
//! These run on the host (x86_64) and drive the real control task with
//! a mock platform, advancing simulated time in loop-sized steps.

use boltlock::app::lock::{ActorMethod, LockAction};
use boltlock::app::task::AppTask;
use boltlock::config::AppConfig;
use boltlock::connectivity::ConnectivityState;
use boltlock::drivers::led::LedPattern;
use boltlock::error::Error;
use boltlock::events::{ButtonAction, Event, EventKind, FUNCTION_BUTTON, LOCK_BUTTON, Mailbox, TimerHandle};
use boltlock::fsm::FunctionState;

use crate::mock_hw::{Call, MockPin, MockPlatform};

type Task<'a> = AppTask<'a, ConnectivityState, MockPin, MockPin>;

const RESET_BLINK: LedPattern = LedPattern::Blink {
    on_ms: 500,
    off_ms: 500,
};

fn make<'a>(mb: &'a Mailbox, conn: &'a ConnectivityState) -> (Task<'a>, MockPlatform<'a>) {
    let mut app = AppTask::new(
        AppConfig::default(),
        mb,
        conn,
        MockPin::default(),
        MockPin::default(),
    );
    let mut hw = MockPlatform::new(mb);
    app.init(&mut hw).unwrap();
    hw.calls.clear();
    (app, hw)
}

fn press(mb: &Mailbox, index: u8) {
    assert!(mb.post(Event::button(index, ButtonAction::Pressed).unwrap()));
}

fn release(mb: &Mailbox, index: u8) {
    assert!(mb.post(Event::button(index, ButtonAction::Released).unwrap()));
}

/// Step the loop every 10 ms of simulated time up to `until_ms`.
fn run_until(app: &mut Task<'_>, hw: &mut MockPlatform<'_>, until_ms: u64) {
    while hw.now_ms < until_ms {
        let next = (hw.now_ms + 10).min(until_ms);
        hw.advance_to(next);
        app.step(hw);
    }
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn init_shows_lock_state_and_sets_query_window() {
    let mb = Mailbox::new();
    let conn = ConnectivityState::new();
    let mut app = AppTask::new(
        AppConfig::default(),
        &mb,
        &conn,
        MockPin::default(),
        MockPin::default(),
    );
    let mut hw = MockPlatform::new(&mb);

    let rev = app.init(&mut hw).unwrap();
    assert_eq!(rev.as_str(), "1.0.0");
    assert!(app.lock_led().is_on(), "bolt starts locked");
    assert!(hw.calls.contains(&Call::QueryWindow(
        23 * 60 * 60 * 1000,
        24 * 60 * 60 * 1000
    )));
}

#[test]
fn init_with_unlocked_bolt_turns_lock_led_off() {
    let mb = Mailbox::new();
    let conn = ConnectivityState::new();
    let mut app: Task<'_> = AppTask::new(
        AppConfig::default(),
        &mb,
        &conn,
        MockPin::default(),
        MockPin::default(),
    );
    let mut hw = MockPlatform::new(&mb);
    hw.unlocked = true;
    app.init(&mut hw).unwrap();
    assert!(!app.lock_led().is_on());
}

#[test]
fn init_fails_without_firmware_revision() {
    let mb = Mailbox::new();
    let conn = ConnectivityState::new();
    let mut app: Task<'_> = AppTask::new(
        AppConfig::default(),
        &mb,
        &conn,
        MockPin::default(),
        MockPin::default(),
    );
    let mut hw = MockPlatform::new(&mb);
    hw.revision = "";
    assert!(matches!(app.init(&mut hw), Err(Error::Init(_))));
}

// ── Function button ───────────────────────────────────────────

#[test]
fn short_press_triggers_update_check() {
    let mb = Mailbox::new();
    let conn = ConnectivityState::new();
    let (mut app, mut hw) = make(&mb, &conn);

    press(&mb, FUNCTION_BUTTON);
    app.step(&mut hw);
    assert_eq!(app.function_state(), FunctionState::SoftwareUpdatePending);
    assert_eq!(hw.timer_starts(), vec![3000]);

    run_until(&mut app, &mut hw, 800);
    release(&mb, FUNCTION_BUTTON);
    app.step(&mut hw);

    assert_eq!(app.function_state(), FunctionState::NoneSelected);
    assert!(!app.function_timer_armed());
    assert_eq!(hw.count(Call::UpdateCheckNow), 1);
    assert_eq!(hw.count(Call::TimerStop), 1);
    assert!(!hw.calls.contains(&Call::UpdateAbort));

    run_until(&mut app, &mut hw, 10_000);
    assert_eq!(hw.timer_fires, 0, "cancelled timer must not fire");
}

#[test]
fn short_press_during_update_aborts_it() {
    let mb = Mailbox::new();
    let conn = ConnectivityState::new();
    let (mut app, mut hw) = make(&mb, &conn);
    hw.update_in_progress = true;

    press(&mb, FUNCTION_BUTTON);
    release(&mb, FUNCTION_BUTTON);
    app.step(&mut hw);

    assert_eq!(hw.count(Call::UpdateAbort), 1);
    assert_eq!(hw.count(Call::UpdateCheckNow), 0);
}

#[test]
fn long_hold_arms_reset_and_release_cancels() {
    let mb = Mailbox::new();
    let conn = ConnectivityState::new();
    let (mut app, mut hw) = make(&mb, &conn);

    press(&mb, FUNCTION_BUTTON);
    app.step(&mut hw);
    run_until(&mut app, &mut hw, 3000);

    assert_eq!(app.function_state(), FunctionState::FactoryReset);
    assert!(app.function_timer_armed());
    assert_eq!(hw.timer_starts(), vec![3000, 3000]);
    assert_eq!(app.status_led().pattern(), RESET_BLINK);
    assert_eq!(app.lock_led().pattern(), RESET_BLINK);

    // Both LEDs blink in lock-step.
    for t in (3010..4500).step_by(10) {
        hw.advance_to(t);
        app.step(&mut hw);
        assert_eq!(app.status_led().is_on(), app.lock_led().is_on(), "out of phase at {t} ms");
    }

    release(&mb, FUNCTION_BUTTON);
    app.step(&mut hw);

    assert_eq!(app.function_state(), FunctionState::NoneSelected);
    assert_eq!(app.lock_led().pattern(), LedPattern::Steady(true), "restored to locked");
    assert_eq!(hw.factory_resets(), 0);

    run_until(&mut app, &mut hw, 20_000);
    assert_eq!(hw.factory_resets(), 0);
    assert_eq!(hw.timer_fires, 1);
}

#[test]
fn hold_through_cancel_window_commits_reset_once() {
    let mb = Mailbox::new();
    let conn = ConnectivityState::new();
    let (mut app, mut hw) = make(&mb, &conn);

    press(&mb, FUNCTION_BUTTON);
    app.step(&mut hw);
    run_until(&mut app, &mut hw, 6000);
    assert_eq!(hw.factory_resets(), 1);

    run_until(&mut app, &mut hw, 15_000);
    release(&mb, FUNCTION_BUTTON);
    app.step(&mut hw);
    assert_eq!(hw.factory_resets(), 1);
    assert_eq!(hw.timer_fires, 2);
}

#[test]
fn status_policy_suspended_while_reset_armed() {
    let mb = Mailbox::new();
    let conn = ConnectivityState::new();
    let (mut app, mut hw) = make(&mb, &conn);
    conn.update(|f| {
        f.service_connectivity = true;
        f.service_subscription_established = true;
    });

    press(&mb, FUNCTION_BUTTON);
    app.step(&mut hw);
    assert_eq!(app.status_led().pattern(), LedPattern::Steady(true));

    run_until(&mut app, &mut hw, 3500);
    assert_eq!(app.status_led().pattern(), RESET_BLINK);

    release(&mb, FUNCTION_BUTTON);
    app.step(&mut hw);
    assert_eq!(app.status_led().pattern(), LedPattern::Steady(true));
}

#[test]
fn redundant_timer_start_restarts_instead_of_stacking() {
    let mb = Mailbox::new();
    let conn = ConnectivityState::new();
    let (mut app, mut hw) = make(&mb, &conn);
    hw.timer_deadline = Some(50);

    press(&mb, FUNCTION_BUTTON);
    app.step(&mut hw);

    assert_eq!(hw.calls[..2], [Call::TimerStop, Call::TimerStart(3000)]);
    run_until(&mut app, &mut hw, 2990);
    assert_eq!(hw.timer_fires, 0);
    run_until(&mut app, &mut hw, 3000);
    assert_eq!(hw.timer_fires, 1);
}

#[test]
fn timer_stop_failure_is_not_fatal() {
    let mb = Mailbox::new();
    let conn = ConnectivityState::new();
    let (mut app, mut hw) = make(&mb, &conn);
    hw.stop_fails = true;

    press(&mb, FUNCTION_BUTTON);
    release(&mb, FUNCTION_BUTTON);
    app.step(&mut hw);

    assert_eq!(app.function_state(), FunctionState::NoneSelected);
    assert_eq!(hw.count(Call::UpdateCheckNow), 1);

    // The expiry that slipped through is ignored.
    run_until(&mut app, &mut hw, 3000);
    assert_eq!(hw.timer_fires, 1);
    assert_eq!(app.function_state(), FunctionState::NoneSelected);
}

#[test]
fn stale_timer_event_is_ignored() {
    let mb = Mailbox::new();
    let conn = ConnectivityState::new();
    let (mut app, mut hw) = make(&mb, &conn);
    mb.post(Event::timer(TimerHandle(1)));
    app.step(&mut hw);
    assert_eq!(app.function_state(), FunctionState::NoneSelected);
    assert!(hw.calls.is_empty());
}

// ── Status LED ────────────────────────────────────────────────

#[test]
fn status_led_follows_connectivity() {
    let mb = Mailbox::new();
    let conn = ConnectivityState::new();
    let (mut app, mut hw) = make(&mb, &conn);

    app.step(&mut hw);
    assert_eq!(
        app.status_led().pattern(),
        LedPattern::Blink {
            on_ms: 50,
            off_ms: 950
        }
    );

    conn.update(|f| f.ble_connected = true);
    app.step(&mut hw);
    assert_eq!(
        app.status_led().pattern(),
        LedPattern::Blink {
            on_ms: 100,
            off_ms: 100
        }
    );

    conn.update(|f| {
        f.service_connectivity = true;
        f.service_subscription_established = true;
    });
    app.step(&mut hw);
    assert_eq!(app.status_led().pattern(), LedPattern::Steady(true));
}

#[test]
fn contended_stack_lock_keeps_last_snapshot() {
    let mb = Mailbox::new();
    let conn = ConnectivityState::new();
    let (mut app, mut hw) = make(&mb, &conn);

    conn.update(|f| f.ble_connected = true);
    app.step(&mut hw);
    assert!(app.snapshot().ble_connected);

    {
        let mut held = conn.try_lock().unwrap();
        held.ble_connected = false;
        held.service_connectivity = true;
        held.service_subscription_established = true;
        app.step(&mut hw);
        assert!(app.snapshot().ble_connected, "stale snapshot reused");
        assert!(!app.snapshot().is_fully_connected());
    }

    app.step(&mut hw);
    assert!(app.snapshot().is_fully_connected());
}

// ── Lock actions ──────────────────────────────────────────────

#[test]
fn lock_button_toggles_bolt() {
    let mb = Mailbox::new();
    let conn = ConnectivityState::new();
    let (mut app, mut hw) = make(&mb, &conn);

    press(&mb, LOCK_BUTTON);
    app.step(&mut hw);
    assert_eq!(app.lock_in_flight(), Some(LockAction::Unlock));
    assert_eq!(
        hw.calls,
        vec![
            Call::BoltBegin(LockAction::Unlock),
            Call::InitiateUnlock(ActorMethod::Physical)
        ]
    );
    assert_eq!(
        app.lock_led().pattern(),
        LedPattern::Blink {
            on_ms: 50,
            off_ms: 50
        }
    );

    run_until(&mut app, &mut hw, 2000);
    assert_eq!(app.lock_in_flight(), None);
    assert_eq!(hw.count(Call::UnlockingSuccessful), 1);
    assert_eq!(app.lock_led().pattern(), LedPattern::Steady(false));

    press(&mb, LOCK_BUTTON);
    app.step(&mut hw);
    run_until(&mut app, &mut hw, 5000);
    assert_eq!(hw.count(Call::LockingSuccessful), 1);
    assert_eq!(app.lock_led().pattern(), LedPattern::Steady(true));
}

#[test]
fn second_request_while_moving_is_rejected() {
    let mb = Mailbox::new();
    let conn = ConnectivityState::new();
    let (mut app, mut hw) = make(&mb, &conn);

    assert!(app.post_lock_action_request(ActorMethod::RemoteUserExplicit, LockAction::Unlock));
    press(&mb, LOCK_BUTTON);
    assert!(app.post_lock_action_request(ActorMethod::VoiceAssistant, LockAction::Lock));
    app.step(&mut hw);

    assert_eq!(hw.count(Call::BoltBegin(LockAction::Unlock)), 1);
    assert_eq!(hw.count(Call::BoltBegin(LockAction::Lock)), 0);
    assert_eq!(
        hw.calls,
        vec![
            Call::BoltBegin(LockAction::Unlock),
            Call::InitiateUnlock(ActorMethod::RemoteUserExplicit)
        ]
    );
}

#[test]
fn lock_button_release_never_reaches_the_task() {
    assert_eq!(Event::button(LOCK_BUTTON, ButtonAction::Released), None);
    assert_eq!(Event::button(5, ButtonAction::Pressed), None);
}

// ── Dispatch ──────────────────────────────────────────────────

#[test]
fn install_event_acknowledges_install() {
    let mb = Mailbox::new();
    let conn = ConnectivityState::new();
    let (mut app, mut hw) = make(&mb, &conn);
    app.post_event(Event::install());
    app.step(&mut hw);
    assert_eq!(hw.calls, vec![Call::InstallComplete(Ok(()))]);
}

#[test]
fn event_without_handler_is_dropped() {
    let mb = Mailbox::new();
    let conn = ConnectivityState::new();
    let (mut app, mut hw) = make(&mb, &conn);
    app.post_event(Event {
        kind: EventKind::Install,
        handler: None,
    });
    app.step(&mut hw);
    assert!(hw.calls.is_empty());
    assert!(mb.is_empty());
}

#[test]
fn events_are_handled_in_posting_order() {
    let mb = Mailbox::new();
    let conn = ConnectivityState::new();
    let (mut app, mut hw) = make(&mb, &conn);

    app.post_event(Event::install());
    press(&mb, FUNCTION_BUTTON);
    app.post_event(Event::install());
    app.step(&mut hw);

    assert_eq!(
        hw.calls,
        vec![
            Call::InstallComplete(Ok(())),
            Call::TimerStart(3000),
            Call::InstallComplete(Ok(()))
        ]
    );
}

#[test]
fn full_mailbox_drops_extra_posts() {
    let mb = Mailbox::new();
    let conn = ConnectivityState::new();
    let (mut app, mut hw) = make(&mb, &conn);

    let accepted = (0..12).filter(|_| app.post_event(Event::install())).count();
    assert_eq!(accepted, 10);
    app.step(&mut hw);
    assert_eq!(hw.count(Call::InstallComplete(Ok(()))), 10);
}

#[test]
fn run_once_returns_when_idle() {
    let mb = Mailbox::new();
    let conn = ConnectivityState::new();
    let (mut app, mut hw) = make(&mb, &conn);
    let start = std::time::Instant::now();
    app.run_once(&mut hw);
    app.run_once(&mut hw);
    assert!(start.elapsed() < std::time::Duration::from_secs(1));
    assert!(hw.calls.is_empty());
}

#[test]
fn run_once_handles_pending_event() {
    let mb = Mailbox::new();
    let conn = ConnectivityState::new();
    let (mut app, mut hw) = make(&mb, &conn);
    app.post_event(Event::install());
    app.post_event(Event::install());
    app.run_once(&mut hw);
    assert_eq!(hw.count(Call::InstallComplete(Ok(()))), 2);
    assert!(mb.is_empty());
}
