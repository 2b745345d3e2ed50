//! Collaborator implementations for this board.
//!
//! The button probe, the shared exchange block the host polls, the seed
//! generator, and the offline network/storage stands-ins for boards
//! without the wireless or SD options fitted.

use embassy_rp::gpio::Input;
use portable_atomic::{AtomicU32, Ordering};

use harken_core::traits::display::DisplayCommand;
use harken_core::traits::system::{
    ButtonProbe, NetworkInfo, SeedSource, StorageMount, StorageSpace, TokenExchange,
};

/// Raw level of the user button (pressed = high, pulled down).
#[derive(Clone, Copy)]
pub struct UserButton(pub &'static Input<'static>);

impl ButtonProbe for UserButton {
    fn is_pressed(&self) -> bool {
        self.0.is_high()
    }
}

/// Display command word values the host understands.
const DISPLAY_CMD_TERMINAL: u32 = 1;
const DISPLAY_CMD_RESUME: u32 = 2;

/// The fixed exchange block the host polls over the bus.
///
/// Plain word-sized stores; the host tolerates reading a stale value for
/// one poll cycle.
pub struct SharedExchange {
    token: AtomicU32,
    seed: AtomicU32,
    display_command: AtomicU32,
    frame_counter: AtomicU32,
}

impl SharedExchange {
    pub const fn new() -> Self {
        Self {
            token: AtomicU32::new(0),
            seed: AtomicU32::new(0),
            display_command: AtomicU32::new(0),
            frame_counter: AtomicU32::new(0),
        }
    }

    pub fn publish_token(&self, token: u32) {
        self.token.store(token, Ordering::Release);
    }

    pub fn publish_seed(&self, seed: u32) {
        self.seed.store(seed, Ordering::Release);
    }

    pub fn publish_display_command(&self, command: DisplayCommand) {
        let word = match command {
            DisplayCommand::Terminal => DISPLAY_CMD_TERMINAL,
            DisplayCommand::Resume => DISPLAY_CMD_RESUME,
        };
        self.display_command.store(word, Ordering::Release);
    }

    pub fn bump_frame_counter(&self) {
        self.frame_counter.fetch_add(1, Ordering::Release);
    }
}

/// `TokenExchange` adapter over the shared block.
pub struct TokenPort(pub &'static SharedExchange);

impl TokenExchange for TokenPort {
    fn publish_token(&mut self, token: u32) {
        self.0.publish_token(token);
    }

    fn publish_seed(&mut self, seed: u32) {
        self.0.publish_seed(seed);
    }
}

/// Xorshift32 seed generator for the token exchange.
///
/// The exchange needs unpredictable-enough, never-repeating-soon values,
/// not cryptographic randomness.
pub struct TokenSeeder {
    state: u32,
}

impl TokenSeeder {
    pub fn new(seed: u32) -> Self {
        Self {
            // Xorshift must not start at zero.
            state: if seed == 0 { 0x6B65_6E21 } else { seed },
        }
    }
}

impl SeedSource for TokenSeeder {
    fn next_seed(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}

/// Network queries on a board without the wireless option.
pub struct OfflineNetwork;

impl NetworkInfo for OfflineNetwork {
    fn has_ip(&self) -> bool {
        false
    }

    fn ipv4(&self) -> Option<[u8; 4]> {
        None
    }

    fn ssid(&self) -> Option<&str> {
        None
    }

    fn rssi_dbm(&self) -> Option<i16> {
        None
    }

    fn wifi_mode(&self) -> &str {
        "N/A"
    }

    fn link_status(&self) -> &str {
        "Unavailable"
    }
}

/// Storage queries with no card slot fitted.
pub struct AbsentStorage;

impl StorageMount for AbsentStorage {
    fn is_mounted(&self) -> bool {
        false
    }

    fn mounted_info(&self) -> Option<StorageSpace> {
        None
    }
}
