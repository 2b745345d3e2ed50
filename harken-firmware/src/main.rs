//! Harken - host-bus companion firmware
//!
//! Main firmware binary for RP2040-based Harken boards. The device sits on
//! the host computer's cartridge bus, receives checksummed command frames
//! encoded in strobed address reads, and answers with an interactive
//! terminal rendered into a shared framebuffer the host blits.
//!
//! Execution model:
//! - DMA completion IRQ: recovers bus words, assembles frames, publishes
//!   into the double-buffered command channel (the one critical section).
//! - Core 0 cooperative loop: polls the channel, runs the shell, refreshes
//!   the live status lines, services the polled reset check.
//! - Core 1: dedicated blocking context for the button press-wait path.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Input, Pull};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::multicore::{spawn_core1, Stack};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

mod bus;
mod config;
mod display;
mod font;
mod platform;
mod settings;
mod tasks;

static BUTTON: StaticCell<Input<'static>> = StaticCell::new();
static CORE1_STACK: StaticCell<Stack<{ config::CORE1_STACK_SIZE }>> = StaticCell::new();

#[interrupt]
unsafe fn DMA_IRQ_1() {
    bus::on_dma_irq();
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Harken firmware starting...");

    let p = embassy_rp::init(Default::default());

    // User button: pulled down, pressed = high.
    let button: &'static Input<'static> = BUTTON.init(Input::new(p.PIN_22, Pull::Down));

    // The bus latch block owns the DMA channel configuration; we service
    // its completion interrupt.
    interrupt::DMA_IRQ_1.set_priority(Priority::P1);
    unsafe { interrupt::DMA_IRQ_1.enable() };

    // Dedicated context for the blocking press-wait path.
    let stack = CORE1_STACK.init(Stack::new());
    spawn_core1(p.CORE1, stack, move || {
        tasks::button_watch::core1_entry(button)
    });

    // Watch the button during pass-through; the terminal takes over the
    // reset path once the host starts it.
    tasks::button_watch::arm();

    unwrap!(spawner.spawn(tasks::terminal::terminal_task(button)));

    info!("Harken up; waiting for host commands");
}
