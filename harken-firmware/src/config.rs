//! Board wiring and timing constants.

use embassy_time::Duration;

/// DMA channel the bus latch block completes into. The latch hardware owns
/// the channel configuration; we only service its completion interrupt.
pub const BUS_DMA_CHANNEL: usize = 3;

/// How often the cooperative loop polls the command channel.
pub const COMMAND_POLL: Duration = Duration::from_millis(5);

/// Live status line refresh cadence.
pub const STATUS_REFRESH: Duration = Duration::from_millis(500);

/// Polled reset check cadence.
pub const RESET_CHECK: Duration = Duration::from_millis(100);

/// Bytes in the shared exchange block the host polls.
pub const EXCHANGE_BLOCK_SIZE: usize = 16;

/// Stack size for the core-1 button watch context.
pub const CORE1_STACK_SIZE: usize = 4096;
