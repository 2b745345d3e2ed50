//! Cooperative terminal loop on core 0.
//!
//! Polls the command channel, feeds the shell, and on its own cadence
//! refreshes the live status lines and runs the polled reset check.

use defmt::{debug, info, warn};
use embassy_rp::gpio::Input;
use embassy_time::{Delay, Instant, Timer};
use static_cell::StaticCell;

use harken_core::button::ButtonMonitor;
use harken_core::shell::{commands::builtin_commands, Env, Shell};
use harken_core::term::screen::FRAMEBUFFER_SIZE;
use harken_core::term::Terminal;
use harken_core::traits::system::{SeedSource, TokenExchange};
use harken_protocol::CMD_TERMINAL_START;

use crate::config::{COMMAND_POLL, RESET_CHECK, STATUS_REFRESH};
use crate::display::FrameDisplay;
use crate::platform::{AbsentStorage, OfflineNetwork, SharedExchange, TokenPort, TokenSeeder, UserButton};
use crate::settings::RamSettings;
use crate::tasks::button_watch;
use crate::bus;

static FRAMEBUFFER: StaticCell<[u8; FRAMEBUFFER_SIZE]> = StaticCell::new();
static EXCHANGE: SharedExchange = SharedExchange::new();

#[embassy_executor::task]
pub async fn terminal_task(button: &'static Input<'static>) {
    info!("Terminal task started");

    let framebuffer = FRAMEBUFFER.init([0; FRAMEBUFFER_SIZE]);
    let display = FrameDisplay::new(framebuffer, &EXCHANGE);
    let commands = builtin_commands();
    let mut shell = Shell::new(Terminal::new(display), &commands);

    let mut settings = RamSettings::with_defaults();
    let storage = AbsentStorage;
    let network = OfflineNetwork;
    let probe = UserButton(button);
    let mut seeder = TokenSeeder::new(Instant::now().as_ticks() as u32);
    let mut tokens = TokenPort(&EXCHANGE);

    // Seed the first exchange before any command can arrive.
    let first_seed = seeder.next_seed();
    tokens.publish_seed(first_seed);

    // Polled reset path for terminal mode; the core-1 watch covers
    // pass-through mode until the terminal comes up.
    let mut reset_monitor = ButtonMonitor::new(probe, Delay);
    reset_monitor.set_short_callback(button_watch::reset_short);

    let mut last_overwrites = 0u32;
    let mut next_status = Instant::now() + STATUS_REFRESH;
    let mut next_reset_check = Instant::now() + RESET_CHECK;

    loop {
        if let Some(polled) = bus::poll() {
            if polled.overwrites != last_overwrites {
                warn!(
                    "{=u32} frame(s) overwritten before consumption",
                    polled.overwrites.wrapping_sub(last_overwrites)
                );
                last_overwrites = polled.overwrites;
            }
            debug!(
                "frame id={=u16} size={=u16}",
                polled.frame.command_id, polled.frame.payload_size
            );

            let started = polled.frame.command_id == CMD_TERMINAL_START;
            let mut env = Env {
                settings: &mut settings,
                storage: &storage,
                network: &network,
                button: &probe,
                seed: &mut seeder,
                tokens: &mut tokens,
            };
            shell.handle_frame(&mut env, &polled.frame);

            // Terminal mode owns the button from here; stop the
            // pass-through watch.
            if started {
                button_watch::disarm();
            }
        }

        let now = Instant::now();
        if now >= next_status {
            next_status = now + STATUS_REFRESH;
            let env = Env {
                settings: &mut settings,
                storage: &storage,
                network: &network,
                button: &probe,
                seed: &mut seeder,
                tokens: &mut tokens,
            };
            if shell.refresh_status(&env) {
                debug!("status lines updated");
            }
        }

        if now >= next_reset_check {
            next_reset_check = now + RESET_CHECK;
            reset_monitor.check_push_reset();
        }

        Timer::after(COMMAND_POLL).await;
    }
}
