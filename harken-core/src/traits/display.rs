//! Display surface trait for the terminal.
//!
//! The display collaborator owns glyph rendering and the transfer of the
//! surface to the host; the core owns the character grid and tells the
//! display what to draw where. All operations work on local memory and are
//! infallible - there is no bus to time out on.

/// Out-of-band commands for the display collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayCommand {
    /// Present the terminal surface to the host
    Terminal,
    /// Hand the screen back to the host desktop
    Resume,
}

/// Terminal rendering surface.
///
/// Coordinates are character cells, `(col, row)`, origin top-left.
pub trait TermDisplay {
    /// Prepare a terminal surface of the given character dimensions.
    fn start_surface(&mut self, cols: u8, rows: u8);

    /// Clear the whole surface.
    fn clear(&mut self);

    /// Draw one glyph at a cell.
    fn draw_char(&mut self, col: u8, row: u8, ch: u8);

    /// Draw the block cursor at a cell.
    fn draw_cursor(&mut self, col: u8, row: u8);

    /// Push any buffered drawing to the host-visible surface.
    fn refresh(&mut self);

    /// Send an out-of-band command to the display collaborator.
    fn send_command(&mut self, command: DisplayCommand);

    /// Raw 1-bpp pixel buffer backing the surface.
    ///
    /// The terminal shifts this directly when scrolling so the pixel
    /// content moves with the character grid.
    fn framebuffer_mut(&mut self) -> &mut [u8];
}
