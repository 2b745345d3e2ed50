//! Execution contexts.
//!
//! Core 0 runs the cooperative terminal loop; core 1 is dedicated to the
//! blocking button press-wait path.

pub mod button_watch;
pub mod terminal;
