//! RAM-backed settings store.
//!
//! The persistence medium is owned by a separate storage component on
//! boards that have one; this build keeps the table in RAM with sensible
//! defaults so the settings commands stay fully functional.

use core::fmt::Write as _;

use defmt::info;
use heapless::{String, Vec};

use harken_core::traits::settings::{
    SettingKind, SettingView, SettingsError, SettingsStore, MAX_KEY_LENGTH, MAX_VALUE_LENGTH,
};

const MAX_ENTRIES: usize = 12;

struct Entry {
    key: String<MAX_KEY_LENGTH>,
    kind: SettingKind,
    value: String<MAX_VALUE_LENGTH>,
}

/// In-memory settings table.
pub struct RamSettings {
    entries: Vec<Entry, MAX_ENTRIES>,
}

impl RamSettings {
    pub fn with_defaults() -> Self {
        let mut settings = Self {
            entries: Vec::new(),
        };
        let _ = settings.put_str("hostname", "harken");
        let _ = settings.put_bool("boot_to_terminal", true);
        let _ = settings.put_int("status_refresh_ms", 500);
        settings
    }

    fn put(
        &mut self,
        key: &str,
        kind: SettingKind,
        value: core::fmt::Arguments<'_>,
    ) -> Result<(), SettingsError> {
        let mut stored_key: String<MAX_KEY_LENGTH> = String::new();
        stored_key
            .push_str(key)
            .map_err(|_| SettingsError::ValueTooLong)?;

        let mut stored_value: String<MAX_VALUE_LENGTH> = String::new();
        stored_value
            .write_fmt(value)
            .map_err(|_| SettingsError::ValueTooLong)?;

        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.key.as_str() == key) {
            entry.kind = kind;
            entry.value = stored_value;
            return Ok(());
        }

        self.entries
            .push(Entry {
                key: stored_key,
                kind,
                value: stored_value,
            })
            .map_err(|_| SettingsError::Storage)
    }
}

impl SettingsStore for RamSettings {
    fn find(&self, key: &str) -> Option<SettingView<'_>> {
        self.entries
            .iter()
            .find(|entry| entry.key.as_str() == key)
            .map(|entry| SettingView {
                key: &entry.key,
                kind: entry.kind,
                value: &entry.value,
            })
    }

    fn put_int(&mut self, key: &str, value: i32) -> Result<(), SettingsError> {
        self.put(key, SettingKind::Int, format_args!("{}", value))
    }

    fn put_bool(&mut self, key: &str, value: bool) -> Result<(), SettingsError> {
        self.put(key, SettingKind::Bool, format_args!("{}", value))
    }

    fn put_str(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.put(key, SettingKind::Str, format_args!("{}", value))
    }

    fn save(&mut self) -> Result<(), SettingsError> {
        // No persistence medium fitted; acknowledge so the CLI flow works.
        info!("settings save requested (RAM store, nothing persisted)");
        Ok(())
    }

    fn erase(&mut self) -> Result<(), SettingsError> {
        *self = Self::with_defaults();
        Ok(())
    }

    fn for_each(&self, visit: &mut dyn FnMut(SettingView<'_>)) {
        for entry in &self.entries {
            visit(SettingView {
                key: &entry.key,
                kind: entry.kind,
                value: &entry.value,
            });
        }
    }
}
