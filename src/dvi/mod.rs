//! # DVI scan-out engine
//!
//! Ties the pieces together: a scan-list compiled once at start-up, two DMA
//! channels that replay it, and a once-per-frame interrupt that rewinds the
//! replay.
//!
//! The *data* (pixel) channel feeds the HSTX FIFO. It is configured once;
//! its transfer count and read address are rewritten before every transfer
//! by the *command* channel, which walks the scan-list descriptor pairs and
//! copies each one onto the data channel's trigger registers. When the
//! command channel reaches the sentinel it programs a null (zero-length)
//! trigger, which raises the frame interrupt instead of starting a
//! transfer. The handler here points the command channel back at the top of
//! the list and the next frame begins. No other software runs per frame.
//!
//! There is at most one live engine. Its identity lives in a single
//! process-wide slot, written during set-up (before the interrupt source is
//! enabled) and read by the handler; the handler treats an empty slot as a
//! spurious interrupt and does nothing, which is the only runtime guard on
//! the scan-out path.

// -----------------------------------------------------------------------------
// Licence Statement
// -----------------------------------------------------------------------------
// Copyright (c) The hstx-dvi developers, 2026
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later
// version.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more
// details.
//
// You should have received a copy of the GNU General Public License along with
// this program.  If not, see <https://www.gnu.org/licenses/>.
// -----------------------------------------------------------------------------

// -----------------------------------------------------------------------------
// Sub-modules
// -----------------------------------------------------------------------------

#[cfg(all(target_arch = "arm", target_os = "none"))]
mod hw;
pub mod scanlist;
pub mod timing;
pub mod tmds;

// -----------------------------------------------------------------------------
// Imports
// -----------------------------------------------------------------------------

use core::cell::Cell;
use core::sync::atomic::{AtomicBool, Ordering};
use critical_section::Mutex;

#[cfg(all(target_arch = "arm", target_os = "none"))]
pub use hw::{init, irq};
pub use scanlist::{Descriptor, ScanList, SCANLIST_ENTRIES, SCANLIST_WORDS};
pub use timing::{DviTiming, ScanlinePhase, VGA_TIMING};

// -----------------------------------------------------------------------------
// Types
// -----------------------------------------------------------------------------

/// Things that can go wrong during set-up.
///
/// Claiming the scan-list storage is the only fallible step; everything
/// else is either a compile-time contract or a fail-fast assert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(all(target_arch = "arm", target_os = "none"), derive(defmt::Format))]
pub enum Error {
	/// The scan-list storage has already been claimed. Only one engine can
	/// ever be brought up, and there is no teardown.
	AlreadyClaimed,
}

/// The identity of the one live engine: which channels it owns and where
/// its scan-list starts. Small enough for the frame handler to read out of
/// the active slot in O(1).
#[derive(Debug, Clone, Copy)]
#[cfg_attr(all(target_arch = "arm", target_os = "none"), derive(defmt::Format))]
pub struct DviEngine {
	/// DMA channel feeding the HSTX FIFO
	pub pixel_channel: u8,
	/// DMA channel walking the scan-list
	pub command_channel: u8,
	/// Bus address of the first scan-list descriptor
	pub scanlist_start: u32,
}

/// Board-specific output routing, supplied by the caller.
///
/// The HSTX owns GPIO 12-19 as eight single-ended outputs (HSTX bits 0-7);
/// which bit drives which differential pair of the DVI connector is a board
/// routing decision, not a property of this driver. Each field names the
/// bit carrying the *positive* half of a pair; the partner pin (`bit ^ 1`)
/// is driven with the same data, inverted.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(all(target_arch = "arm", target_os = "none"), derive(defmt::Format))]
pub struct OutputConfig {
	/// HSTX bit for the positive half of the TMDS clock pair
	pub clock_bit: u8,
	/// HSTX bits for the positive halves of TMDS lanes 0, 1 and 2
	pub lane_bits: [u8; 3],
	/// Output-shifter rotation applied by the TMDS expander on every lane.
	/// Opaque here: it depends on how the board's pixel format sits in the
	/// shift register (24 for this 1 bpp layout).
	pub tmds_rotate: u8,
}

/// The per-frame register operations the handler needs.
///
/// `hw` implements this against the real DMA block; tests implement it
/// against a simulated one.
pub trait FrameDma {
	/// Clear the pending frame-completion interrupt for the pixel channel.
	fn ack_frame_interrupt(&mut self, pixel_channel: u8);
	/// Point the command channel's read cursor at `read_addr` and trigger
	/// it, resuming scan-out from that descriptor.
	fn restart_command_list(&mut self, command_channel: u8, read_addr: u32);
}

// -----------------------------------------------------------------------------
// Static and Const Data
// -----------------------------------------------------------------------------

/// Framebuffer width in pixels.
pub const FRAME_WIDTH: usize = 640;

/// Framebuffer height in lines.
pub const FRAME_HEIGHT: usize = 480;

/// Bits per pixel. The framebuffer is monochrome, packed most-significant
/// pixel first within each (byte-swapped) word.
pub const BITS_PER_PIXEL: usize = 1;

/// Pixels carried by each 32-bit framebuffer word.
pub const PIXELS_PER_WORD: usize = 32 / BITS_PER_PIXEL;

/// 32-bit words per framebuffer row.
pub const WORDS_PER_ROW: usize = FRAME_WIDTH / PIXELS_PER_WORD;

/// 32-bit words in the whole framebuffer.
pub const FRAME_WORDS: usize = WORDS_PER_ROW * FRAME_HEIGHT;

/// The framebuffer type `init` accepts. Fixed size, so handing the driver
/// a buffer of the wrong resolution does not compile.
pub type FrameWords = [u32; FRAME_WORDS];

// The framebuffer geometry and the scan-out mode must agree.
const _: () = assert!(FRAME_WIDTH as u32 == timing::VGA_TIMING.h_active_pixels);
const _: () = assert!(FRAME_HEIGHT as u32 == timing::VGA_TIMING.v_active_lines);

/// The active-engine slot read by the frame handler.
///
/// Single-writer discipline: set by `register` during set-up, before the
/// interrupt source is enabled; cleared by `disable`. Never mutated
/// concurrently with itself, so the critical section only guards against
/// the handler observing a torn value.
static ACTIVE_ENGINE: Mutex<Cell<Option<DviEngine>>> = Mutex::new(Cell::new(None));

/// Claim flag for [`SCAN_LIST`].
static SCAN_LIST_CLAIMED: AtomicBool = AtomicBool::new(false);

/// Static storage for the one scan-list. Claimed (at most once) by `init`.
static mut SCAN_LIST: ScanList = ScanList::blank();

// -----------------------------------------------------------------------------
// Functions
// -----------------------------------------------------------------------------

/// Take the scan-list storage.
///
/// This is the single fallible step of engine set-up. It can only ever
/// succeed once per reset; there is no way to give the storage back.
pub fn claim_scan_list() -> Result<&'static mut ScanList, Error> {
	if SCAN_LIST_CLAIMED.swap(true, Ordering::AcqRel) {
		return Err(Error::AlreadyClaimed);
	}
	// Note (unsafe): the claim flag guarantees this is the only live
	// reference to the static.
	Ok(unsafe { &mut *core::ptr::addr_of_mut!(SCAN_LIST) })
}

/// Install `engine` as the active instance.
///
/// Must happen before the frame interrupt is enabled; the handler does
/// nothing until an engine is registered.
pub fn register(engine: DviEngine) {
	critical_section::with(|cs| ACTIVE_ENGINE.borrow(cs).set(Some(engine)));
}

/// Stop restarting frames.
///
/// Clears the active slot, so the handler ignores the next sentinel instead
/// of rewinding. This does *not* halt a transfer the hardware has already
/// been armed with; the current frame plays out and the signal then stops.
pub fn disable() {
	critical_section::with(|cs| ACTIVE_ENGINE.borrow(cs).set(None));
}

/// Read the active slot.
pub fn active_engine() -> Option<DviEngine> {
	critical_section::with(|cs| ACTIVE_ENGINE.borrow(cs).get())
}

/// The once-per-frame service routine.
///
/// Called when the data channel's null trigger (the sentinel) raises the
/// frame interrupt. Acknowledges it and rewinds the command channel to the
/// top of the scan-list. Bounded time, no allocation, no logging - the
/// first blanking line of the next frame is already on the clock.
pub fn service_frame_interrupt<D: FrameDma>(dma: &mut D) {
	let engine = match active_engine() {
		Some(engine) => engine,
		// Spurious, or fired after `disable` - nothing to do.
		None => return,
	};
	dma.ack_frame_interrupt(engine.pixel_channel);
	dma.restart_command_list(engine.command_channel, engine.scanlist_start);
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
	use super::*;

	/// A software stand-in for the two-channel DMA loop: fetches descriptor
	/// pairs in order and recognises the sentinel's null trigger.
	struct SimDma<'a> {
		list: &'a ScanList,
		cursor: usize,
		acks: u32,
		restarts: u32,
	}

	impl<'a> SimDma<'a> {
		fn new(list: &'a ScanList) -> SimDma<'a> {
			SimDma {
				list,
				cursor: 0,
				acks: 0,
				restarts: 0,
			}
		}

		/// Replay descriptors until the sentinel's null trigger, returning
		/// how many real transfers were started.
		fn run_until_sentinel(&mut self) -> usize {
			let mut transfers = 0;
			loop {
				let descriptor = self.list.entries()[self.cursor];
				self.cursor += 1;
				if descriptor.is_sentinel() {
					return transfers;
				}
				transfers += 1;
			}
		}
	}

	impl<'a> FrameDma for SimDma<'a> {
		fn ack_frame_interrupt(&mut self, _pixel_channel: u8) {
			self.acks += 1;
		}

		fn restart_command_list(&mut self, _command_channel: u8, read_addr: u32) {
			self.restarts += 1;
			self.cursor = read_addr.wrapping_sub(self.list.start_addr()) as usize / 8;
		}
	}

	#[test]
	fn frame_loop_restarts_at_descriptor_zero() {
		let mut list = ScanList::blank();
		list.compile(&VGA_TIMING, 0x2000_0000);
		let mut dma = SimDma::new(&list);

		// No engine registered yet: the handler must be a no-op.
		service_frame_interrupt(&mut dma);
		assert_eq!(dma.acks, 0);
		assert_eq!(dma.restarts, 0);
		assert_eq!(dma.cursor, 0);

		register(DviEngine {
			pixel_channel: 0,
			command_channel: 1,
			scanlist_start: list.start_addr(),
		});

		// One full frame, then the sentinel interrupt.
		let first_frame = dma.run_until_sentinel();
		assert_eq!(first_frame, SCANLIST_ENTRIES - 1);
		service_frame_interrupt(&mut dma);
		assert_eq!(dma.acks, 1);
		assert_eq!(dma.restarts, 1);

		// The next descriptor fetched is index 0 - no line skipped, none
		// repeated - and the second frame is identical in shape.
		assert_eq!(dma.cursor, 0);
		assert_eq!(dma.list.entries()[dma.cursor], list.entries()[0]);
		let second_frame = dma.run_until_sentinel();
		assert_eq!(second_frame, first_frame);
		service_frame_interrupt(&mut dma);
		assert_eq!(dma.cursor, 0);

		// After `disable`, the sentinel no longer rewinds anything.
		dma.run_until_sentinel();
		disable();
		let parked = dma.cursor;
		service_frame_interrupt(&mut dma);
		assert_eq!(dma.acks, 2);
		assert_eq!(dma.restarts, 2);
		assert_eq!(dma.cursor, parked);
		assert!(active_engine().is_none());
	}

	#[test]
	fn scan_list_storage_claims_exactly_once() {
		let list = claim_scan_list().unwrap();
		list.compile(&VGA_TIMING, 0x2000_0000);
		assert!(matches!(claim_scan_list(), Err(Error::AlreadyClaimed)));
	}
}

// -----------------------------------------------------------------------------
// End of file
// -----------------------------------------------------------------------------
