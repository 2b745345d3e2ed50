//! Terminal display over the shared 1-bpp surface.
//!
//! The device does not drive a panel of its own: it stamps glyphs into a
//! page-organized monochrome framebuffer that the host blits to its screen.
//! One page (8 pixel rows) is exactly one character row, which is what lets
//! the terminal scroll the surface with a single byte shift.

use harken_core::term::screen::{CHAR_WIDTH, FRAMEBUFFER_SIZE, TILE_ROW_BYTES};
use harken_core::traits::display::{DisplayCommand, TermDisplay};

use crate::font::glyph;
use crate::platform::SharedExchange;

/// Framebuffer-backed [`TermDisplay`] implementation.
pub struct FrameDisplay {
    framebuffer: &'static mut [u8; FRAMEBUFFER_SIZE],
    exchange: &'static SharedExchange,
}

impl FrameDisplay {
    pub fn new(
        framebuffer: &'static mut [u8; FRAMEBUFFER_SIZE],
        exchange: &'static SharedExchange,
    ) -> Self {
        Self {
            framebuffer,
            exchange,
        }
    }

    /// Stamp an 8x8 bitmap at a cell. Rows are LSB-leftmost.
    fn stamp(&mut self, col: u8, row: u8, bitmap: &[u8; 8]) {
        let base = row as usize * TILE_ROW_BYTES + col as usize * CHAR_WIDTH;
        for x in 0..CHAR_WIDTH {
            // Gather column x of the bitmap into one page byte.
            let mut page = 0u8;
            for (y, bits) in bitmap.iter().enumerate() {
                if bits >> x & 1 != 0 {
                    page |= 1 << y;
                }
            }
            self.framebuffer[base + x] = page;
        }
    }
}

impl TermDisplay for FrameDisplay {
    fn start_surface(&mut self, _cols: u8, _rows: u8) {
        // Single fixed-geometry surface; bringing it up is a clear. The
        // host learns about the mode switch via send_command.
        self.framebuffer.fill(0);
    }

    fn clear(&mut self) {
        self.framebuffer.fill(0);
    }

    fn draw_char(&mut self, col: u8, row: u8, ch: u8) {
        self.stamp(col, row, glyph(ch));
    }

    fn draw_cursor(&mut self, col: u8, row: u8) {
        // Solid block.
        self.stamp(col, row, &[0xFF; 8]);
    }

    fn refresh(&mut self) {
        // The host reads the surface directly; bump the frame counter so it
        // knows there is something new to blit.
        self.exchange.bump_frame_counter();
    }

    fn send_command(&mut self, command: DisplayCommand) {
        self.exchange.publish_display_command(command);
    }

    fn framebuffer_mut(&mut self) -> &mut [u8] {
        self.framebuffer
    }
}
