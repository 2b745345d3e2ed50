//! Board-agnostic core logic for the Harken companion device
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Collaborator boundary traits (display, settings, storage, network)
//! - Terminal emulator (screen buffer, VT52-subset interpreter)
//! - Line editor and command dispatch
//! - Live status line refresh
//! - Button debounce and press-classification state machines

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod button;
pub mod shell;
pub mod term;
pub mod traits;

#[cfg(test)]
pub(crate) mod testutil;
