//! Frame type and word-fed frame assembly.
//!
//! Bus accesses arrive as latched 32-bit addresses. [`bus_word`] recovers
//! the 16-bit data word from an address (or rejects accesses without the
//! strobe bit), and [`FrameAssembler`] turns the word stream back into
//! checksummed [`Frame`]s.

use heapless::Vec;

/// Frame synchronization word
pub const FRAME_SYNC: u16 = 0xA55A;

/// Maximum payload size in bytes
pub const MAX_PAYLOAD_SIZE: usize = 64;

/// Strobe bit in the latched bus address (set only for command accesses)
pub const STROBE_BIT: u32 = 0x0001_0000;

/// The address latch inverts the top address line; undo it here.
pub const ADDRESS_FLIP_BIT: u16 = 0x8000;

/// Recover the 16-bit data word from a latched bus address.
///
/// Returns `None` unless the strobe bit is set. Pure and bounded-time:
/// callable from interrupt context.
#[inline]
pub fn bus_word(addr: u32) -> Option<u16> {
    if addr & STROBE_BIT == 0 {
        return None;
    }
    Some((addr as u16) ^ ADDRESS_FLIP_BIT)
}

/// One complete, checksummed command frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Command identifier
    pub command_id: u16,
    /// Payload size in bytes, clamped to [`MAX_PAYLOAD_SIZE`]
    pub payload_size: u16,
    /// Payload data (first 4 bytes = correlation token)
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
    /// Checksum word as received on the wire
    pub checksum: u16,
}

impl Frame {
    /// Create an empty frame slot.
    pub const fn empty() -> Self {
        Self {
            command_id: 0,
            payload_size: 0,
            payload: Vec::new(),
            checksum: 0,
        }
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::empty()
    }
}

/// A frame whose wire checksum did not match.
///
/// Carries the header fields so the consumer can log what was discarded;
/// the payload is never delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChecksumError {
    /// Command id of the discarded frame
    pub command_id: u16,
    /// Claimed payload size of the discarded frame
    pub payload_size: u16,
}

/// State machine assembling frames from the bus word stream.
///
/// For any word sequence forming one complete frame, [`FrameAssembler::feed`]
/// produces exactly one of `Ok(Some(frame))` or `Err(ChecksumError)` at the
/// frame boundary - never both, never neither. Words outside a frame are
/// ignored until the next sync word.
#[derive(Debug, Clone)]
pub struct FrameAssembler {
    state: AssembleState,
    command_id: u16,
    /// Size claimed on the wire (may exceed capacity)
    claimed_size: u16,
    /// Payload bytes still expected from the wire
    bytes_remaining: u16,
    buffer: Vec<u8, MAX_PAYLOAD_SIZE>,
    /// Running XOR fold of command id, size and payload words
    accumulator: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssembleState {
    /// Waiting for the sync word
    Idle,
    /// Got sync, waiting for the command id
    CommandId,
    /// Got command id, waiting for the payload size
    PayloadSize,
    /// Reading payload words
    Payload,
    /// Waiting for the checksum word
    Checksum,
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameAssembler {
    /// Create a new assembler waiting for a sync word.
    pub const fn new() -> Self {
        Self {
            state: AssembleState::Idle,
            command_id: 0,
            claimed_size: 0,
            bytes_remaining: 0,
            buffer: Vec::new(),
            accumulator: 0,
        }
    }

    /// Reset to the idle state.
    pub fn reset(&mut self) {
        self.state = AssembleState::Idle;
        self.command_id = 0;
        self.claimed_size = 0;
        self.bytes_remaining = 0;
        self.buffer.clear();
        self.accumulator = 0;
    }

    /// Feed one bus word.
    ///
    /// Returns `Ok(Some(frame))` when a valid frame completes, `Ok(None)`
    /// while more words are needed, or `Err` when a frame completes with a
    /// bad checksum. Allocation-free and bounded-time per word.
    pub fn feed(&mut self, word: u16) -> Result<Option<Frame>, ChecksumError> {
        match self.state {
            AssembleState::Idle => {
                if word == FRAME_SYNC {
                    self.reset();
                    self.state = AssembleState::CommandId;
                }
                Ok(None)
            }
            AssembleState::CommandId => {
                self.command_id = word;
                self.accumulator ^= word;
                self.state = AssembleState::PayloadSize;
                Ok(None)
            }
            AssembleState::PayloadSize => {
                self.claimed_size = word;
                self.accumulator ^= word;
                self.bytes_remaining = word;
                self.state = if word == 0 {
                    AssembleState::Checksum
                } else {
                    AssembleState::Payload
                };
                Ok(None)
            }
            AssembleState::Payload => {
                self.accumulator ^= word;
                // Each word carries up to two payload bytes, low byte first.
                // Bytes past capacity are drained but not retained, so an
                // oversized claim cannot desync the stream.
                let [low, high] = word.to_le_bytes();
                if self.bytes_remaining >= 1 {
                    let _ = self.buffer.push(low);
                }
                if self.bytes_remaining >= 2 {
                    let _ = self.buffer.push(high);
                }
                self.bytes_remaining = self.bytes_remaining.saturating_sub(2);
                if self.bytes_remaining == 0 {
                    self.state = AssembleState::Checksum;
                }
                Ok(None)
            }
            AssembleState::Checksum => {
                let expected = self.accumulator;
                let command_id = self.command_id;
                let payload_size = self.claimed_size.min(self.buffer.len() as u16);
                let payload = self.buffer.clone();
                self.reset();

                if word != expected {
                    return Err(ChecksumError {
                        command_id,
                        payload_size,
                    });
                }

                Ok(Some(Frame {
                    command_id,
                    payload_size,
                    payload,
                    checksum: word,
                }))
            }
        }
    }

    /// Feed multiple words, returning the first completed frame if any.
    pub fn feed_words(&mut self, words: &[u16]) -> Result<Option<Frame>, ChecksumError> {
        for &word in words {
            if let Some(frame) = self.feed(word)? {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }
}
