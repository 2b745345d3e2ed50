//! Terminal emulator.
//!
//! A character-grid terminal with a VT52-subset escape interpreter and a
//! block cursor. The grid and cursor live here; glyph rendering is pushed
//! through the [`TermDisplay`] collaborator. Scrolling shifts the character
//! grid and the display's pixel surface together - the two use different
//! units ([`screen::SCREEN_COLS`] cells vs [`screen::TILE_ROW_BYTES`]
//! bytes) and must stay consistent.

pub mod screen;
pub mod vt52;

use heapless::Vec;

use crate::traits::display::TermDisplay;
use screen::{CursorPos, ScreenBuffer, SCREEN_COLS, SCREEN_ROWS, TILE_ROW_BYTES};
use vt52::{sequence_len, Vt52Command, ESC, MAX_SEQUENCE};

/// Cached positions of the live status lines and the prompt cursor.
///
/// Invalidated by [`Terminal::clear_screen`]; the next full status print
/// re-establishes them.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct StatusRows {
    pub ssid_row: u8,
    pub button_row: u8,
    pub storage_row: u8,
    pub rows_valid: bool,
    pub prompt: CursorPos,
    pub prompt_valid: bool,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Normal,
    Escape,
}

/// The terminal: grid state plus a display handle.
pub struct Terminal<D: TermDisplay> {
    display: D,
    screen: ScreenBuffer,
    cursor: CursorPos,
    prev_cursor: CursorPos,
    pub(crate) status: StatusRows,
}

impl<D: TermDisplay> Terminal<D> {
    pub fn new(display: D) -> Self {
        Self {
            display,
            screen: ScreenBuffer::new(),
            cursor: CursorPos::default(),
            prev_cursor: CursorPos::default(),
            status: StatusRows::default(),
        }
    }

    /// Direct access to the display collaborator.
    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    /// Current cursor cell.
    pub fn cursor(&self) -> CursorPos {
        self.cursor
    }

    /// Character at a grid cell (0 = blank).
    pub fn char_at(&self, col: u8, row: u8) -> u8 {
        self.screen.char_at(col, row)
    }

    /// Ask the display for a terminal surface of our dimensions.
    pub fn start_surface(&mut self) {
        self.display
            .start_surface(SCREEN_COLS as u8, SCREEN_ROWS as u8);
    }

    /// Clear grid and display, home the cursor, drop cached status rows.
    pub fn clear_screen(&mut self) {
        self.screen.clear();
        self.cursor = CursorPos::default();
        self.status.rows_valid = false;
        self.status.prompt_valid = false;
        self.display.clear();
    }

    /// Remember the current cell as the prompt cursor for live refresh.
    pub fn mark_prompt_cursor(&mut self) {
        self.status.prompt = self.cursor;
        self.status.prompt_valid = true;
    }

    /// Push buffered drawing out to the host-visible surface.
    pub fn refresh(&mut self) {
        self.display.refresh();
    }

    /// Render a string, interpreting escape sequences.
    ///
    /// The escape accumulator is transient: a sequence left incomplete at
    /// the end of the text flushes as literal characters instead of
    /// spilling state into the next call.
    pub fn print_str(&mut self, text: &str) {
        let mut state = ScanState::Normal;
        let mut seq: Vec<u8, MAX_SEQUENCE> = Vec::new();

        for &ch in text.as_bytes() {
            match state {
                ScanState::Normal => {
                    if ch == ESC {
                        state = ScanState::Escape;
                        seq.clear();
                        let _ = seq.push(ch);
                    } else {
                        self.render_char(ch);
                    }
                }
                ScanState::Escape => {
                    let _ = seq.push(ch);
                    if seq.len() >= 2 && seq.len() == sequence_len(seq[1]) {
                        self.apply_escape(&seq);
                        state = ScanState::Normal;
                    } else if seq.is_full() {
                        // Overlong sequence degrades to literal text.
                        self.flush_literal(&seq);
                        state = ScanState::Normal;
                    }
                }
            }
        }

        if state == ScanState::Escape {
            self.flush_literal(&seq);
        }
        self.display.refresh();
    }

    /// Render one character with full cursor bookkeeping.
    ///
    /// Fixed order: restore the cell under the old cursor, move/write,
    /// draw the cursor at the new cell, remember it. Callers rely on this
    /// ordering for the block cursor to track correctly across calls.
    pub fn render_char(&mut self, ch: u8) {
        self.restore_prev_cell();

        match ch {
            b'\n' | b'\r' => {
                self.cursor.col = 0;
                self.advance_row();
            }
            // NUL moves the cursor without writing (escape handlers).
            0 => {}
            _ => self.put_char(ch),
        }

        self.display.draw_cursor(self.cursor.col, self.cursor.row);
        self.prev_cursor = self.cursor;
    }

    /// Handle a backspace keystroke.
    ///
    /// `erase_char` is true when the editor actually dropped a character;
    /// false redraws the cursor only. At the true origin this is a no-op
    /// with nothing redrawn.
    pub fn backspace(&mut self, erase_char: bool) {
        self.restore_prev_cell();

        if erase_char {
            if self.cursor.col == 0 {
                if self.cursor.row == 0 {
                    return;
                }
                self.cursor.row -= 1;
                self.cursor.col = (SCREEN_COLS - 1) as u8;
            } else {
                self.cursor.col -= 1;
            }
            self.screen.clear_char(self.cursor.col, self.cursor.row);
            self.display
                .draw_char(self.cursor.col, self.cursor.row, b' ');
        }

        self.display.draw_cursor(self.cursor.col, self.cursor.row);
        self.prev_cursor = self.cursor;
        self.display.refresh();
    }

    /// Redraw whatever the grid holds under the old cursor block.
    fn restore_prev_cell(&mut self) {
        let under = self.screen.char_at(self.prev_cursor.col, self.prev_cursor.row);
        let glyph = if under == 0 { b' ' } else { under };
        self.display
            .draw_char(self.prev_cursor.col, self.prev_cursor.row, glyph);
    }

    fn put_char(&mut self, ch: u8) {
        self.screen.set_char(self.cursor.col, self.cursor.row, ch);
        self.display.draw_char(self.cursor.col, self.cursor.row, ch);
        self.cursor.col += 1;
        if self.cursor.col as usize >= SCREEN_COLS {
            self.cursor.col = 0;
            self.advance_row();
        }
    }

    /// Move to the next row, scrolling when the bottom is reached.
    /// The cursor never wraps silently past the bottom row.
    fn advance_row(&mut self) {
        self.cursor.row += 1;
        if self.cursor.row as usize >= SCREEN_ROWS {
            self.scroll_up();
            self.cursor.row = (SCREEN_ROWS - 1) as u8;
        }
    }

    /// Shift the character grid and the pixel surface up one row together.
    fn scroll_up(&mut self) {
        self.screen.scroll_rows_up();

        let fb = self.display.framebuffer_mut();
        let len = fb.len();
        if len >= TILE_ROW_BYTES {
            fb.copy_within(TILE_ROW_BYTES.., 0);
            fb[len - TILE_ROW_BYTES..].fill(0);
        }
    }

    fn flush_literal(&mut self, seq: &[u8]) {
        let flush: Vec<u8, MAX_SEQUENCE> = Vec::from_slice(seq).unwrap_or_default();
        for &ch in &flush {
            self.render_char(ch);
        }
    }

    fn apply_escape(&mut self, seq: &[u8]) {
        let Some(command) = vt52::decode(seq) else {
            // Unrecognized sequence: consumed silently.
            return;
        };

        match command {
            Vt52Command::CursorUp => {
                self.cursor.row = self.cursor.row.saturating_sub(1);
                self.render_char(0);
            }
            Vt52Command::CursorDown => {
                if (self.cursor.row as usize) < SCREEN_ROWS - 1 {
                    self.cursor.row += 1;
                }
                self.render_char(0);
            }
            Vt52Command::CursorRight => {
                if (self.cursor.col as usize) < SCREEN_COLS - 1 {
                    self.cursor.col += 1;
                }
                self.render_char(0);
            }
            Vt52Command::CursorLeft => {
                self.cursor.col = self.cursor.col.saturating_sub(1);
                self.render_char(0);
            }
            Vt52Command::ClearHome => {
                self.erase_region(0, 0);
                self.cursor = CursorPos::default();
                self.render_char(0);
            }
            Vt52Command::Home => {
                self.cursor = CursorPos::default();
                self.render_char(0);
            }
            Vt52Command::EraseToEnd => {
                self.erase_region(self.cursor.col, self.cursor.row);
            }
            Vt52Command::EraseLine => {
                for col in self.cursor.col..SCREEN_COLS as u8 {
                    self.screen.clear_char(col, self.cursor.row);
                    self.display.draw_char(col, self.cursor.row, b' ');
                }
            }
            Vt52Command::MoveTo { col, row } => {
                self.cursor = CursorPos { col, row };
                self.render_char(0);
            }
            Vt52Command::NoOp => {
                self.render_char(0);
            }
        }
    }

    /// Blank row-major from `(col, row)` to the end of the screen.
    fn erase_region(&mut self, col: u8, row: u8) {
        for c in col..SCREEN_COLS as u8 {
            self.screen.clear_char(c, row);
            self.display.draw_char(c, row, b' ');
        }
        for r in row + 1..SCREEN_ROWS as u8 {
            for c in 0..SCREEN_COLS as u8 {
                self.screen.clear_char(c, r);
                self.display.draw_char(c, r, b' ');
            }
        }
    }
}
