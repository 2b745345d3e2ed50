//! Shared test fakes: display, collaborators and the environment fixture.

use core::cell::Cell;

use std::string::String as StdString;
use std::string::ToString;
use std::vec::Vec;

use crate::shell::Env;
use crate::term::screen::{FRAMEBUFFER_SIZE, SCREEN_COLS};
use crate::term::Terminal;
use crate::traits::display::{DisplayCommand, TermDisplay};
use crate::traits::settings::{SettingKind, SettingView, SettingsError, SettingsStore};
use crate::traits::system::{
    ButtonProbe, NetworkInfo, SeedSource, StorageMount, StorageSpace, TokenExchange,
};

/// Recording in-memory display.
pub struct FakeDisplay {
    pub framebuffer: Vec<u8>,
    pub commands: Vec<DisplayCommand>,
    pub surface: Option<(u8, u8)>,
    pub clear_calls: usize,
    pub refresh_calls: usize,
    pub draw_calls: usize,
}

impl FakeDisplay {
    pub fn new() -> Self {
        Self {
            framebuffer: std::vec![0; FRAMEBUFFER_SIZE],
            commands: Vec::new(),
            surface: None,
            clear_calls: 0,
            refresh_calls: 0,
            draw_calls: 0,
        }
    }
}

impl TermDisplay for FakeDisplay {
    fn start_surface(&mut self, cols: u8, rows: u8) {
        self.surface = Some((cols, rows));
    }

    fn clear(&mut self) {
        self.framebuffer.fill(0);
        self.clear_calls += 1;
    }

    fn draw_char(&mut self, _col: u8, _row: u8, _ch: u8) {
        self.draw_calls += 1;
    }

    fn draw_cursor(&mut self, _col: u8, _row: u8) {
        self.draw_calls += 1;
    }

    fn refresh(&mut self) {
        self.refresh_calls += 1;
    }

    fn send_command(&mut self, command: DisplayCommand) {
        self.commands.push(command);
    }

    fn framebuffer_mut(&mut self) -> &mut [u8] {
        &mut self.framebuffer
    }
}

/// Text of one grid row with trailing blanks stripped.
pub fn row_text<D: TermDisplay>(term: &mut Terminal<D>, row: u8) -> StdString {
    let mut text = StdString::new();
    for col in 0..SCREEN_COLS as u8 {
        let ch = term.char_at(col, row);
        text.push(if ch == 0 { ' ' } else { ch as char });
    }
    text.trim_end().to_string()
}

/// Growable in-memory settings store.
pub struct FakeSettings {
    entries: Vec<(StdString, SettingKind, StdString)>,
}

impl FakeSettings {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn put(&mut self, key: &str, kind: SettingKind, value: StdString) {
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.0 == key) {
            entry.1 = kind;
            entry.2 = value;
        } else {
            self.entries.push((key.to_string(), kind, value));
        }
    }
}

impl SettingsStore for FakeSettings {
    fn find(&self, key: &str) -> Option<SettingView<'_>> {
        self.entries
            .iter()
            .find(|entry| entry.0 == key)
            .map(|entry| SettingView {
                key: &entry.0,
                kind: entry.1,
                value: &entry.2,
            })
    }

    fn put_int(&mut self, key: &str, value: i32) -> Result<(), SettingsError> {
        self.put(key, SettingKind::Int, value.to_string());
        Ok(())
    }

    fn put_bool(&mut self, key: &str, value: bool) -> Result<(), SettingsError> {
        self.put(key, SettingKind::Bool, value.to_string());
        Ok(())
    }

    fn put_str(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.put(key, SettingKind::Str, value.to_string());
        Ok(())
    }

    fn save(&mut self) -> Result<(), SettingsError> {
        Ok(())
    }

    fn erase(&mut self) -> Result<(), SettingsError> {
        self.entries.clear();
        Ok(())
    }

    fn for_each(&self, visit: &mut dyn FnMut(SettingView<'_>)) {
        for entry in &self.entries {
            visit(SettingView {
                key: &entry.0,
                kind: entry.1,
                value: &entry.2,
            });
        }
    }
}

pub struct FakeStorage {
    pub mounted: bool,
    pub info: Option<StorageSpace>,
}

impl StorageMount for FakeStorage {
    fn is_mounted(&self) -> bool {
        self.mounted
    }

    fn mounted_info(&self) -> Option<StorageSpace> {
        self.info
    }
}

pub struct FakeNetwork {
    pub has_ip: bool,
    pub ip: Option<[u8; 4]>,
    pub ssid: Option<StdString>,
    pub rssi: Option<i16>,
}

impl NetworkInfo for FakeNetwork {
    fn has_ip(&self) -> bool {
        self.has_ip
    }

    fn ipv4(&self) -> Option<[u8; 4]> {
        self.ip
    }

    fn ssid(&self) -> Option<&str> {
        self.ssid.as_deref()
    }

    fn rssi_dbm(&self) -> Option<i16> {
        self.rssi
    }

    fn wifi_mode(&self) -> &str {
        "STA"
    }

    fn link_status(&self) -> &str {
        if self.has_ip {
            "Connected"
        } else {
            "Not connected"
        }
    }
}

pub struct FakeButton {
    pub pressed: Cell<bool>,
}

impl ButtonProbe for FakeButton {
    fn is_pressed(&self) -> bool {
        self.pressed.get()
    }
}

pub struct FakeSeed {
    pub next: u32,
}

impl SeedSource for FakeSeed {
    fn next_seed(&mut self) -> u32 {
        self.next = self.next.wrapping_add(1);
        self.next
    }
}

#[derive(Default)]
pub struct FakeTokens {
    pub tokens: Vec<u32>,
    pub seeds: Vec<u32>,
}

impl TokenExchange for FakeTokens {
    fn publish_token(&mut self, token: u32) {
        self.tokens.push(token);
    }

    fn publish_seed(&mut self, seed: u32) {
        self.seeds.push(seed);
    }
}

/// All collaborator fakes bundled for easy `Env` construction.
pub struct EnvFixture {
    pub settings: FakeSettings,
    pub storage: FakeStorage,
    pub network: FakeNetwork,
    pub button: FakeButton,
    pub seed: FakeSeed,
    pub tokens: FakeTokens,
}

impl EnvFixture {
    pub fn new() -> Self {
        Self {
            settings: FakeSettings::new(),
            storage: FakeStorage {
                mounted: false,
                info: None,
            },
            network: FakeNetwork {
                has_ip: false,
                ip: None,
                ssid: None,
                rssi: None,
            },
            button: FakeButton {
                pressed: Cell::new(false),
            },
            seed: FakeSeed { next: 0 },
            tokens: FakeTokens::default(),
        }
    }

    pub fn env(&mut self) -> Env<'_> {
        Env {
            settings: &mut self.settings,
            storage: &self.storage,
            network: &self.network,
            button: &self.button,
            seed: &mut self.seed,
            tokens: &mut self.tokens,
        }
    }
}
