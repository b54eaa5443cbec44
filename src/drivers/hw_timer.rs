//! Function timer backed by ESP-IDF's esp_timer API.
//!
//! A single re-armable one-shot.  The expiry callback runs in the
//! esp_timer task (not an ISR) and only posts a timer event into the
//! mailbox, which is safe from any context.
//!
//! On simulation targets the deadline is kept as an `Instant` and
//! [`OneShotTimer::poll`] posts the event once it has passed.

#[cfg(not(target_os = "espidf"))]
use std::time::{Duration, Instant};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use crate::app::ports::FunctionTimer;
use crate::error::TimerError;
use crate::events::{Event, Mailbox, TimerHandle};

/// Identity carried by function timer events.
pub const FUNCTION_TIMER: TimerHandle = TimerHandle(1);

#[cfg(target_os = "espidf")]
pub struct OneShotTimer {
    handle: esp_timer_handle_t,
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn function_timer_cb(arg: *mut core::ffi::c_void) {
    // SAFETY: `arg` is the `&'static Mailbox` handed to `esp_timer_create`
    // in `OneShotTimer::new`; it outlives the timer.
    let mailbox = unsafe { &*(arg as *const Mailbox) };
    mailbox.post(Event::timer(FUNCTION_TIMER));
}

#[cfg(target_os = "espidf")]
impl OneShotTimer {
    /// Create the timer.  Expiries are posted into `mailbox`.
    pub fn new(mailbox: &'static Mailbox) -> Result<Self, TimerError> {
        let args = esp_timer_create_args_t {
            callback: Some(function_timer_cb),
            arg: core::ptr::from_ref(mailbox).cast_mut().cast(),
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: c"fn_timer".as_ptr(),
            skip_unhandled_events: false,
        };
        let mut handle: esp_timer_handle_t = core::ptr::null_mut();
        // SAFETY: `args` and `handle` are valid for the duration of the call.
        let ret = unsafe { esp_timer_create(&args, &mut handle) };
        if ret != ESP_OK {
            return Err(TimerError::CreateFailed(ret));
        }
        Ok(Self { handle })
    }

    /// Expiry is delivered by the esp_timer task; nothing to do here.
    pub fn poll(&mut self) {}
}

#[cfg(target_os = "espidf")]
impl FunctionTimer for OneShotTimer {
    fn start(&mut self, timeout_ms: u32) -> Result<(), TimerError> {
        // SAFETY: `handle` was created in `new` and is deleted only on drop.
        let ret = unsafe { esp_timer_start_once(self.handle, u64::from(timeout_ms) * 1000) };
        if ret != ESP_OK {
            return Err(TimerError::StartFailed(ret));
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), TimerError> {
        // SAFETY: see `start`.
        let ret = unsafe { esp_timer_stop(self.handle) };
        // INVALID_STATE just means it was not running.
        if ret != ESP_OK && ret != ESP_ERR_INVALID_STATE as esp_err_t {
            return Err(TimerError::StopFailed(ret));
        }
        Ok(())
    }

    fn is_active(&self) -> bool {
        // SAFETY: see `start`.
        unsafe { esp_timer_is_active(self.handle) }
    }
}

#[cfg(target_os = "espidf")]
impl Drop for OneShotTimer {
    fn drop(&mut self) {
        // SAFETY: the handle is valid and never used after this.
        unsafe {
            esp_timer_stop(self.handle);
            esp_timer_delete(self.handle);
        }
    }
}

// ── Simulation ────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
pub struct OneShotTimer {
    mailbox: &'static Mailbox,
    deadline: Option<Instant>,
}

#[cfg(not(target_os = "espidf"))]
impl OneShotTimer {
    pub fn new(mailbox: &'static Mailbox) -> Result<Self, TimerError> {
        log::info!("hw_timer(sim): function timer created");
        Ok(Self {
            mailbox,
            deadline: None,
        })
    }

    /// Post the expiry event if the deadline has passed.
    pub fn poll(&mut self) {
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                self.deadline = None;
                self.mailbox.post(Event::timer(FUNCTION_TIMER));
            }
        }
    }
}

#[cfg(not(target_os = "espidf"))]
impl FunctionTimer for OneShotTimer {
    fn start(&mut self, timeout_ms: u32) -> Result<(), TimerError> {
        self.deadline = Some(Instant::now() + Duration::from_millis(u64::from(timeout_ms)));
        Ok(())
    }

    fn stop(&mut self) -> Result<(), TimerError> {
        self.deadline = None;
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.deadline.is_some()
    }
}
