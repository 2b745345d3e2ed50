//! Device status print and differential live refresh.
//!
//! `status` prints the full multi-line device status and records where the
//! three volatile lines (network identity, button, storage) landed. The
//! periodic refresh then rewrites only the lines whose text changed, using
//! direct-addressing escapes so the user's prompt cursor is restored
//! afterwards and their typing is not disturbed.

use core::fmt::Write as _;

use heapless::String;

use super::Env;
use crate::term::vt52;
use crate::term::Terminal;
use crate::traits::display::TermDisplay;

/// Longest rendered status line.
pub(crate) const LIVE_LINE_MAX: usize = 48;

/// Buffer for one differential update burst.
const LIVE_UPDATE_MAX: usize = 192;

type Line = String<LIVE_LINE_MAX>;

/// Cache of the previously rendered live lines.
pub struct LiveStatus {
    prev_ssid: Line,
    prev_button: Line,
    prev_storage: Line,
}

impl Default for LiveStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveStatus {
    pub const fn new() -> Self {
        Self {
            prev_ssid: String::new(),
            prev_button: String::new(),
            prev_storage: String::new(),
        }
    }

    /// Differentially redraw the live status lines.
    ///
    /// Returns true when anything was written to the terminal. A no-op
    /// until a full status print has established the line positions.
    pub fn refresh<D: TermDisplay>(&mut self, term: &mut Terminal<D>, env: &Env<'_>) -> bool {
        if !term.status.rows_valid {
            return false;
        }

        let ssid = ssid_line(env);
        let button = button_line(env);
        let storage = storage_line(env);

        let update_ssid = ssid != self.prev_ssid;
        let update_button = button != self.prev_button;
        let update_storage = storage != self.prev_storage;
        if !update_ssid && !update_button && !update_storage {
            return false;
        }

        let mut update: String<LIVE_UPDATE_MAX> = String::new();
        if update_ssid {
            append_move_and_clear(&mut update, term.status.ssid_row);
            let _ = update.push_str(&ssid);
        }
        if update_button {
            append_move_and_clear(&mut update, term.status.button_row);
            let _ = update.push_str(&button);
        }
        if update_storage {
            append_move_and_clear(&mut update, term.status.storage_row);
            let _ = update.push_str(&storage);
        }

        // Put the cursor back where the user's prompt was.
        if term.status.prompt_valid {
            vt52::encode_move_to(&mut update, term.status.prompt.col, term.status.prompt.row);
        }

        self.prev_ssid = ssid;
        self.prev_button = button;
        self.prev_storage = storage;

        term.print_str(&update);
        true
    }
}

/// Print the full device status and re-establish the live line rows.
pub fn print_status<D: TermDisplay>(term: &mut Terminal<D>, env: &Env<'_>) {
    term.status.rows_valid = false;

    let mut line: Line = String::new();
    let _ = write!(
        line,
        "Network : {} ({})\n",
        env.network.link_status(),
        env.network.wifi_mode()
    );
    term.print_str(&line);

    line.clear();
    match env.network.ipv4() {
        Some([a, b, c, d]) => {
            let _ = write!(line, "IP      : {}.{}.{}.{}\n", a, b, c, d);
        }
        None => {
            let _ = line.push_str("IP      : N/A\n");
        }
    }
    term.print_str(&line);

    line.clear();
    let hostname = env
        .settings
        .find("hostname")
        .map(|entry| entry.value)
        .filter(|value| !value.is_empty())
        .unwrap_or("N/A");
    let _ = write!(line, "Host    : {}\n", hostname);
    term.print_str(&line);

    let ssid_row = term.cursor().row;
    term.print_str(&ssid_line(env));
    term.print_str("\n");

    term.print_str("\n");
    let button_row = term.cursor().row;
    term.print_str(&button_line(env));
    term.print_str("\n");

    term.print_str("\n");
    let storage_row = term.cursor().row;
    term.print_str(&storage_line(env));
    term.print_str("\n");

    term.status.ssid_row = ssid_row;
    term.status.button_row = button_row;
    term.status.storage_row = storage_row;
    term.status.rows_valid = true;
}

fn ssid_line(env: &Env<'_>) -> Line {
    let mut line = String::new();
    let connected = env.network.has_ip();
    let ssid = if connected { env.network.ssid() } else { None };
    let rssi = if connected { env.network.rssi_dbm() } else { None };

    let _ = write!(line, "SSID    : {} (", ssid.unwrap_or("N/A"));
    match rssi {
        Some(dbm) => {
            let _ = write!(line, "{} dBm)", dbm);
        }
        None => {
            let _ = line.push_str("N/A)");
        }
    }
    line
}

fn button_line(env: &Env<'_>) -> Line {
    let mut line = String::new();
    let state = if env.button.is_pressed() {
        "Pressed"
    } else {
        "Released"
    };
    let _ = write!(line, "Button  : {}", state);
    line
}

fn storage_line(env: &Env<'_>) -> Line {
    let mut line = String::new();
    match env.storage.mounted_info() {
        Some(space) => {
            let _ = write!(
                line,
                "Storage : Mounted ({}/{} MB free)",
                space.free_mb, space.total_mb
            );
        }
        None if env.storage.is_mounted() => {
            let _ = line.push_str("Storage : Error (N/A)");
        }
        None => {
            let _ = line.push_str("Storage : Not mounted (N/A)");
        }
    }
    line
}

/// `ESC Y <row> 0` followed by `ESC K`: move to line start and blank it.
fn append_move_and_clear(update: &mut String<LIVE_UPDATE_MAX>, row: u8) {
    vt52::encode_move_to(update, 0, row);
    let _ = update.push(vt52::ESC as char);
    let _ = update.push('K');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::screen::CursorPos;
    use crate::testutil::{row_text, EnvFixture, FakeDisplay};
    use crate::traits::system::StorageSpace;

    fn terminal() -> Terminal<FakeDisplay> {
        Terminal::new(FakeDisplay::new())
    }

    #[test]
    fn test_refresh_is_noop_before_status_print() {
        let mut term = terminal();
        let mut fixture = EnvFixture::new();
        let mut live = LiveStatus::new();

        assert!(!live.refresh(&mut term, &fixture.env()));
    }

    #[test]
    fn test_first_refresh_emits_then_settles() {
        let mut term = terminal();
        let mut fixture = EnvFixture::new();
        let mut live = LiveStatus::new();

        print_status(&mut term, &fixture.env());

        // First refresh repaints (caches start stale), second is silent.
        assert!(live.refresh(&mut term, &fixture.env()));
        assert!(!live.refresh(&mut term, &fixture.env()));
    }

    #[test]
    fn test_change_rewrites_only_that_line() {
        let mut term = terminal();
        let mut fixture = EnvFixture::new();
        let mut live = LiveStatus::new();

        print_status(&mut term, &fixture.env());
        live.refresh(&mut term, &fixture.env());

        fixture.storage.mounted = true;
        fixture.storage.info = Some(StorageSpace {
            total_mb: 512,
            free_mb: 300,
        });

        assert!(live.refresh(&mut term, &fixture.env()));
        let storage_row = term.status.storage_row;
        assert_eq!(
            row_text(&mut term, storage_row),
            "Storage : Mounted (300/512 MB free)"
        );
        assert!(!live.refresh(&mut term, &fixture.env()));
    }

    #[test]
    fn test_refresh_restores_prompt_cursor() {
        let mut term = terminal();
        let mut fixture = EnvFixture::new();
        let mut live = LiveStatus::new();

        print_status(&mut term, &fixture.env());
        term.print_str("> ");
        term.mark_prompt_cursor();
        let prompt = term.cursor();

        fixture.button.pressed.set(true);
        assert!(live.refresh(&mut term, &fixture.env()));
        assert_eq!(term.cursor(), prompt);
    }

    #[test]
    fn test_status_rows_track_printed_lines() {
        let mut term = terminal();
        let mut fixture = EnvFixture::new();

        print_status(&mut term, &fixture.env());

        assert!(term.status.rows_valid);
        let ssid_row = term.status.ssid_row;
        assert_eq!(&row_text(&mut term, ssid_row)[..4], "SSID");
        assert_ne!(term.status.button_row, term.status.storage_row);
        assert_eq!(term.cursor(), CursorPos {
            col: 0,
            row: term.status.storage_row + 1,
        });
    }
}
