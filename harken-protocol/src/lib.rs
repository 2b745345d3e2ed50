//! Host-bus command frame protocol
//!
//! This crate defines the command protocol the host computer speaks to the
//! Harken device over the cartridge address bus. The host cannot write to
//! the cartridge port, so it encodes data in the addresses it *reads*:
//! hardware latches each strobed bus access and DMA hands the latched
//! address to the firmware, which recovers one 16-bit word per access.
//!
//! # Frame format (in bus words)
//!
//! ```text
//! ┌────────┬────────────┬──────────────┬─────────────┬──────────┐
//! │ SYNC   │ COMMAND ID │ PAYLOAD SIZE │ PAYLOAD     │ CHECKSUM │
//! │ 1 word │ 1 word     │ 1 word       │ 0–32 words  │ 1 word   │
//! └────────┴────────────┴──────────────┴─────────────┴──────────┘
//! ```
//!
//! The checksum is an XOR fold of the command id, the payload size and every
//! payload word. The first four payload bytes of every command carry an
//! opaque correlation token the device echoes back after processing.
//!
//! Everything here is allocation-free and bounded-time; the producer half
//! ([`bus_word`], [`FrameAssembler::feed`], [`CommandChannel::publish`]) is
//! safe to run from interrupt context.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod channel;
pub mod commands;
pub mod frame;

pub use channel::{CommandChannel, PolledFrame};
pub use commands::{correlation_token, Keystroke, CMD_TERMINAL_KEYSTROKE, CMD_TERMINAL_START};
pub use frame::{bus_word, ChecksumError, Frame, FrameAssembler, FRAME_SYNC, MAX_PAYLOAD_SIZE};
