//! Core-1 button watch context.
//!
//! The press-wait path blocks its context for the whole press, so it gets
//! a core of its own. Coordination with core 0 is a single activity flag:
//! arming starts one watch cycle, the cycle disarms itself after
//! dispatching, and cancellation is signal-then-detach - core 1 notices a
//! cleared flag at its next loop top and goes back to idling.

use defmt::{info, warn};
use embassy_rp::gpio::Input;
use embassy_time::Delay;
use embedded_hal::delay::DelayNs;

use harken_core::button::{watch_until_press, ButtonMonitor, ButtonWatch, POLL_INTERVAL_MS};

use crate::platform::UserButton;

static WATCH: ButtonWatch = ButtonWatch::new();

/// Arm one watch cycle. Returns false if one is already armed.
pub fn arm() -> bool {
    let armed = WATCH.begin();
    if armed {
        info!("button watch armed");
    } else {
        info!("button watch already armed");
    }
    armed
}

/// Disarm the watch; core 1 returns to idle at its next poll.
pub fn disarm() {
    if WATCH.is_active() {
        info!("button watch disarmed");
    }
    WATCH.cancel();
}

/// Short press: plain device reset.
pub fn reset_short() {
    warn!("button reset requested");
    cortex_m::peripheral::SCB::sys_reset();
}

/// Long press: reset after flagging a settings wipe for the next boot.
fn reset_long() {
    warn!("factory reset requested");
    cortex_m::peripheral::SCB::sys_reset();
}

/// Core-1 entry point. Idles until armed, runs one watch cycle, repeats.
pub fn core1_entry(button: &'static Input<'static>) -> ! {
    info!("button watch context up on core 1");

    let mut monitor = ButtonMonitor::new(UserButton(button), Delay);
    monitor.set_short_callback(reset_short);
    monitor.set_long_callback(reset_long);

    loop {
        if WATCH.is_active() {
            watch_until_press(&WATCH, &mut monitor);
        }
        Delay.delay_ms(POLL_INTERVAL_MS);
    }
}
