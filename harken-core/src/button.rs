//! User button debounce and press classification.
//!
//! Two deliberately different policies share the raw line:
//!
//! - [`ButtonMonitor::check_push_reset`] is level-polled from the main loop
//!   and fires on the *press* edge, with no duration distinction.
//! - [`ButtonMonitor::wait_press_and_dispatch`] blocks its context until
//!   *release* and classifies the press as short or long.
//!
//! Call sites depend on the difference; do not unify them. The blocking
//! wait is meant to occupy a dedicated secondary context, coordinated with
//! its owner only through the [`ButtonWatch`] flag (benign races accepted:
//! worst case one extra poll interval, never corruption).

use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::delay::DelayNs;

use crate::traits::system::ButtonProbe;

/// Gap between the two debounce samples.
pub const DEBOUNCE_DELAY_MS: u32 = 20;

/// Poll interval while tracking a press.
pub const POLL_INTERVAL_MS: u32 = 10;

/// Press duration that upgrades the classification to "long".
pub const LONG_PRESS_MS: u32 = 3000;

/// Reset action invoked on a classified press.
pub type ResetCallback = fn();

/// Debouncer and press classifier over a raw button line.
pub struct ButtonMonitor<P: ButtonProbe, D: DelayNs> {
    probe: P,
    delay: D,
    short_callback: Option<ResetCallback>,
    long_callback: Option<ResetCallback>,
    pressed_latched: bool,
}

impl<P: ButtonProbe, D: DelayNs> ButtonMonitor<P, D> {
    pub fn new(probe: P, delay: D) -> Self {
        Self {
            probe,
            delay,
            short_callback: None,
            long_callback: None,
            pressed_latched: false,
        }
    }

    pub fn set_short_callback(&mut self, callback: ResetCallback) {
        self.short_callback = Some(callback);
    }

    pub fn set_long_callback(&mut self, callback: ResetCallback) {
        self.long_callback = Some(callback);
    }

    /// Raw, undebounced level.
    pub fn is_pressed(&self) -> bool {
        self.probe.is_pressed()
    }

    /// Two samples one debounce delay apart; true only if both match.
    /// The sole debounce primitive - both policies build on it.
    fn detect_stable(&mut self, expected: bool) -> bool {
        let first = self.probe.is_pressed();
        self.delay.delay_ms(DEBOUNCE_DELAY_MS);
        let second = self.probe.is_pressed();
        first == expected && second == expected
    }

    /// Block until the current press is released, then dispatch.
    ///
    /// Aborts with no side effects when the press does not survive the
    /// initial stability check. The long classification is sticky once the
    /// threshold is crossed, even if later accounting is imprecise.
    pub fn wait_press_and_dispatch(&mut self) {
        if !self.detect_stable(true) {
            return;
        }

        let mut press_duration = 0u32;
        let mut long_press = false;
        while self.probe.is_pressed() {
            self.delay.delay_ms(POLL_INTERVAL_MS);
            if press_duration < LONG_PRESS_MS {
                press_duration += POLL_INTERVAL_MS;
                if press_duration >= LONG_PRESS_MS {
                    long_press = true;
                }
            }
        }

        while !self.detect_stable(false) {
            self.delay.delay_ms(POLL_INTERVAL_MS);
        }

        let callback = if long_press {
            self.long_callback
        } else {
            self.short_callback
        };
        if let Some(callback) = callback {
            callback();
        }
    }

    /// Level-polled reset check for the cooperative main loop.
    ///
    /// Fires the short callback immediately on a debounced press edge and
    /// latches until a debounced release clears it.
    pub fn check_push_reset(&mut self) {
        let pressed = self.probe.is_pressed();

        if pressed && !self.pressed_latched {
            if !self.detect_stable(true) {
                return;
            }
            self.pressed_latched = true;
            if let Some(callback) = self.short_callback {
                callback();
            }
            return;
        }

        if !pressed && self.pressed_latched && self.detect_stable(false) {
            self.pressed_latched = false;
        }
    }
}

/// Activity flag coordinating the secondary watch context with its owner.
pub struct ButtonWatch {
    active: AtomicBool,
}

impl ButtonWatch {
    pub const fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
        }
    }

    /// Arm the watch. Returns false (and changes nothing) if already armed.
    pub fn begin(&self) -> bool {
        !self.active.swap(true, Ordering::Relaxed)
    }

    /// Disarm; a running watch notices at its next loop top.
    pub fn cancel(&self) {
        self.active.store(false, Ordering::Relaxed);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }
}

impl Default for ButtonWatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Body of the secondary watch context.
///
/// Polls until a stable press arrives or the watch is cancelled, then runs
/// one full press-and-dispatch cycle and disarms itself. One-shot: the
/// owner must call [`ButtonWatch::begin`] again to watch for another press.
pub fn watch_until_press<P: ButtonProbe, D: DelayNs>(
    watch: &ButtonWatch,
    monitor: &mut ButtonMonitor<P, D>,
) {
    while watch.is_active() && !monitor.detect_stable(true) {
        monitor.delay.delay_ms(POLL_INTERVAL_MS);
    }

    if !watch.is_active() {
        return;
    }

    monitor.wait_press_and_dispatch();
    watch.cancel();
}
