//! Double-buffered hand-off between interrupt and main-loop contexts.
//!
//! The interrupt producer publishes completed frames into one of two slots
//! while the cooperative consumer drains the other. Publishing is an index
//! swap, never a copy of the consumer's slot, and never blocks: if the
//! consumer is late the previous frame is silently replaced and counted.
//!
//! The channel itself contains no locking. The two halves must be kept
//! from interleaving by the caller - the firmware wraps the channel in a
//! `CriticalSectionRawMutex` blocking mutex so `publish` (IRQ) and `take`
//! (main loop) each run in a short interrupt-masked section.

use crate::frame::{Frame, MAX_PAYLOAD_SIZE};

/// A frame snapshot handed to the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolledFrame {
    /// The consumed frame
    pub frame: Frame,
    /// Total frames replaced before consumption since startup
    pub overwrites: u32,
}

/// Two-slot last-write-wins frame channel.
#[derive(Debug, Clone)]
pub struct CommandChannel {
    slots: [Frame; 2],
    read_index: u8,
    write_index: u8,
    ready: bool,
    overwrite_count: u32,
}

impl Default for CommandChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandChannel {
    /// Create an empty channel.
    pub const fn new() -> Self {
        Self {
            slots: [Frame::empty(), Frame::empty()],
            read_index: 0,
            write_index: 1,
            ready: false,
            overwrite_count: 0,
        }
    }

    /// Publish a frame from the producer side.
    ///
    /// Copies the header and a size-clamped payload into the inactive slot,
    /// then swaps the slot roles and marks the channel ready. Replacing an
    /// unconsumed frame bumps the overwrite counter; it is an observability
    /// signal, not an error. Allocation-free and bounded-time.
    pub fn publish(&mut self, frame: &Frame) {
        let slot = &mut self.slots[self.write_index as usize];
        let size = (frame.payload_size as usize)
            .min(frame.payload.len())
            .min(MAX_PAYLOAD_SIZE);

        slot.command_id = frame.command_id;
        slot.payload_size = size as u16;
        slot.checksum = frame.checksum;
        slot.payload.clear();
        // Cannot fail: size is clamped to the slot capacity above.
        let _ = slot.payload.extend_from_slice(&frame.payload[..size]);

        if self.ready {
            self.overwrite_count = self.overwrite_count.wrapping_add(1);
        }

        core::mem::swap(&mut self.read_index, &mut self.write_index);
        self.ready = true;
    }

    /// Take the pending frame, if any.
    ///
    /// Snapshots the active slot by value and clears the ready flag, so each
    /// published frame is delivered at most once.
    pub fn take(&mut self) -> Option<PolledFrame> {
        if !self.ready {
            return None;
        }
        self.ready = false;
        Some(PolledFrame {
            frame: self.slots[self.read_index as usize].clone(),
            overwrites: self.overwrite_count,
        })
    }

    /// Frames replaced before consumption since startup.
    pub fn overwrites(&self) -> u32 {
        self.overwrite_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::Vec;

    fn frame(command_id: u16, payload: &[u8]) -> Frame {
        let mut vec = Vec::new();
        vec.extend_from_slice(payload).unwrap();
        Frame {
            command_id,
            payload_size: payload.len() as u16,
            payload: vec,
            checksum: 0,
        }
    }

    #[test]
    fn test_take_is_exactly_once() {
        let mut channel = CommandChannel::new();
        assert!(channel.take().is_none());

        channel.publish(&frame(0x0010, &[1, 2, 3, 4]));
        let polled = channel.take().unwrap();
        assert_eq!(polled.frame.command_id, 0x0010);
        assert_eq!(polled.overwrites, 0);

        assert!(channel.take().is_none());
    }

    #[test]
    fn test_last_write_wins_and_counts_overwrites() {
        let mut channel = CommandChannel::new();
        for n in 1..=5u8 {
            channel.publish(&frame(n as u16, &[n]));
        }

        let polled = channel.take().unwrap();
        assert_eq!(polled.frame.command_id, 5);
        assert_eq!(&polled.frame.payload[..], &[5]);
        assert_eq!(polled.overwrites, 4);
        assert!(channel.take().is_none());
    }

    #[test]
    fn test_inflated_size_claim_is_clamped() {
        let mut inflated = frame(0x0011, &[7, 7, 7, 7]);
        inflated.payload_size = u16::MAX;

        let mut channel = CommandChannel::new();
        channel.publish(&inflated);

        let polled = channel.take().unwrap();
        assert_eq!(polled.frame.payload_size, 4);
        assert!(polled.frame.payload_size as usize <= MAX_PAYLOAD_SIZE);
    }

    #[test]
    fn test_overwrite_does_not_disturb_consumed_data() {
        let mut channel = CommandChannel::new();
        channel.publish(&frame(1, &[1]));
        channel.publish(&frame(2, &[2]));

        // Overwritten frame 1 is simply gone; frame 2 arrives intact.
        let polled = channel.take().unwrap();
        assert_eq!(polled.frame.command_id, 2);
        assert_eq!(polled.overwrites, 1);

        channel.publish(&frame(3, &[3]));
        let polled = channel.take().unwrap();
        assert_eq!(polled.frame.command_id, 3);
        assert_eq!(polled.overwrites, 1);
    }
}
