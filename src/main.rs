//! BoltLock Firmware entry point
//!
//! Hexagonal architecture around a single event-driven control task.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  OneShotTimer    SimulatedBoltLock   LogTraitSink              │
//! │  SimUpdateManager  DeviceConfig      MonotonicClock            │
//! │        └──────────── DeviceAdapter (Platform) ────────┘        │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │             AppTask (control logic)                    │    │
//! │  │  FunctionButton · LockCoordinator · LED policy         │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Mailbox (buttons, timer, lock requests, SWU install)          │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_svc::hal::gpio::{AnyIOPin, AnyOutputPin, PinDriver, Pull};
use log::info;

use boltlock::adapters::hardware::DeviceAdapter;
use boltlock::app::ports::Clock;
use boltlock::app::task::AppTask;
use boltlock::config::AppConfig;
use boltlock::connectivity::ConnectivityState;
use boltlock::drivers::button::ButtonPoller;
use boltlock::error::halt;
use boltlock::events::Mailbox;
use boltlock::pins;

/// Event mailbox shared with the timer callback and the update manager.
static MAILBOX: Mailbox = Mailbox::new();

/// Connectivity flags, owned by the networking stack.
static CONNECTIVITY: ConnectivityState = ConnectivityState::new();

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  BoltLock v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = AppConfig::default();
    if let Err(e) = config.validate() {
        halt(&e);
    }

    // ── 2. GPIO ───────────────────────────────────────────────
    // SAFETY: each pin number is claimed exactly once, here.
    let (status_pin, lock_pin, lock_btn, fn_btn) = unsafe {
        (
            AnyOutputPin::new(pins::STATUS_LED_GPIO),
            AnyOutputPin::new(pins::LOCK_LED_GPIO),
            AnyIOPin::new(pins::LOCK_BUTTON_GPIO),
            AnyIOPin::new(pins::FUNCTION_BUTTON_GPIO),
        )
    };
    let status_led = PinDriver::output(status_pin)?;
    let lock_led = PinDriver::output(lock_pin)?;
    let mut lock_button = PinDriver::input(lock_btn)?;
    lock_button.set_pull(Pull::Up)?;
    let mut function_button = PinDriver::input(fn_btn)?;
    function_button.set_pull(Pull::Up)?;

    // ── 3. Collaborators (timer, bolt, update manager, config) ─
    let mut hw = DeviceAdapter::new(&config, &MAILBOX).unwrap_or_else(|e| halt(&e));

    // ── 4. Control task ───────────────────────────────────────
    let mut app = AppTask::new(config, &MAILBOX, &CONNECTIVITY, status_led, lock_led);
    app.init(&mut hw).unwrap_or_else(|e| halt(&e));

    let mut buttons = ButtonPoller::new(&MAILBOX, lock_button, function_button);

    info!("System ready. Entering event loop.");

    // ── 5. Event loop ─────────────────────────────────────────
    loop {
        buttons.poll(hw.now_ms());
        hw.service();
        app.run_once(&mut hw);
    }
}
