//! Scoped browser timers.
//!
//! Both handles own their JS callback and cancel the timer when dropped, so
//! whoever holds the handle decides the timer's lifetime. [`defer`] covers the
//! fire-and-forget case.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::window;

use crate::error::Error;

/// A running `setInterval`.
pub struct Interval {
    id: i32,
    _callback: Closure<dyn FnMut()>,
}

impl Interval {
    pub fn new(period_ms: u32, f: impl FnMut() + 'static) -> Result<Self, Error> {
        let win = window().ok_or(Error::NoWindow)?;
        let callback = Closure::wrap(Box::new(f) as Box<dyn FnMut()>);
        let id = win.set_interval_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            clamp_ms(period_ms),
        )?;
        Ok(Self {
            id,
            _callback: callback,
        })
    }
}

impl Drop for Interval {
    fn drop(&mut self) {
        if let Some(win) = window() {
            win.clear_interval_with_handle(self.id);
        }
    }
}

/// A pending `setTimeout`.
pub struct Timeout {
    id: i32,
    _callback: Closure<dyn FnMut()>,
}

impl Timeout {
    pub fn new(delay_ms: u32, f: impl FnMut() + 'static) -> Result<Self, Error> {
        let win = window().ok_or(Error::NoWindow)?;
        let callback = Closure::wrap(Box::new(f) as Box<dyn FnMut()>);
        let id = win.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            clamp_ms(delay_ms),
        )?;
        Ok(Self {
            id,
            _callback: callback,
        })
    }

}

impl Drop for Timeout {
    fn drop(&mut self) {
        if let Some(win) = window() {
            win.clear_timeout_with_handle(self.id);
        }
    }
}

/// Run `f` once after `delay_ms`, with no handle to cancel it.
///
/// The callback is handed to JS as a one-shot function, which frees itself
/// after it runs.
pub fn defer(delay_ms: u32, f: impl FnOnce() + 'static) -> Result<(), Error> {
    let win = window().ok_or(Error::NoWindow)?;
    let callback = Closure::once_into_js(f);
    win.set_timeout_with_callback_and_timeout_and_arguments_0(
        callback.unchecked_ref(),
        clamp_ms(delay_ms),
    )?;
    Ok(())
}

fn clamp_ms(ms: u32) -> i32 {
    i32::try_from(ms).unwrap_or(i32::MAX)
}
