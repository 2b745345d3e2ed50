//! Interrupt-side bus receive path.
//!
//! The bus latch block samples strobed host accesses and completes a DMA
//! transfer per latched address; this module services that completion
//! interrupt. The handler must stay non-blocking, allocation-free and
//! bounded-time: it recovers the data word, feeds the frame assembler and
//! publishes completed frames into the double-buffered command channel.
//!
//! The `BUS_RX` mutex is the one true critical section in the firmware:
//! both the IRQ publish and the main-loop poll run under it, so the
//! consumer's snapshot can never interleave with a producer write.

use core::cell::RefCell;

use defmt::warn;
use embassy_rp::pac;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use harken_protocol::{bus_word, CommandChannel, FrameAssembler, PolledFrame};

use crate::config::BUS_DMA_CHANNEL;

/// Assembler plus channel, shared between IRQ and main loop.
pub struct BusRx {
    assembler: FrameAssembler,
    channel: CommandChannel,
    checksum_errors: u32,
}

impl BusRx {
    const fn new() -> Self {
        Self {
            assembler: FrameAssembler::new(),
            channel: CommandChannel::new(),
            checksum_errors: 0,
        }
    }
}

static BUS_RX: Mutex<CriticalSectionRawMutex, RefCell<BusRx>> =
    Mutex::new(RefCell::new(BusRx::new()));

/// Service one DMA completion. Interrupt context only.
pub fn on_dma_irq() {
    let dma = pac::DMA;

    // Acknowledge the channel interrupt and read the latched address once.
    dma.ints1().write(|w| w.0 = 1 << BUS_DMA_CHANNEL);
    let addr = dma.ch(BUS_DMA_CHANNEL).al3_read_addr_trig().read();

    // Accesses without the strobe bit are ordinary bus traffic.
    let Some(word) = bus_word(addr) else {
        return;
    };

    BUS_RX.lock(|rx| {
        let rx = &mut *rx.borrow_mut();
        match rx.assembler.feed(word) {
            Ok(Some(frame)) => rx.channel.publish(&frame),
            Ok(None) => {}
            Err(err) => {
                rx.checksum_errors = rx.checksum_errors.wrapping_add(1);
                warn!(
                    "checksum error (id={=u16}, size={=u16})",
                    err.command_id, err.payload_size
                );
            }
        }
    });
}

/// Snapshot the pending frame, if any. Main loop side.
pub fn poll() -> Option<PolledFrame> {
    BUS_RX.lock(|rx| rx.borrow_mut().channel.take())
}

/// Checksum failures observed since boot.
pub fn checksum_errors() -> u32 {
    BUS_RX.lock(|rx| rx.borrow().checksum_errors)
}
