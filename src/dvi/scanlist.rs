//! # Scan-list compiler
//!
//! A scan-list is one frame's worth of DMA work, compiled once at start-up:
//! an ordered array of `(transfer_count, read_addr)` descriptors that the
//! command DMA channel replays into the data channel's trigger registers,
//! one descriptor per transfer. Covering the whole frame in one list means
//! the CPU never has to respond to a mid-frame interrupt.
//!
//! Blanking lines are one descriptor each, pointing at a shared command
//! template. Active lines are two: the shared active-line prefix, then the
//! framebuffer row itself. The list ends in a `{0, 0}` sentinel; the
//! zero-length transfer it programs is what raises the end-of-frame
//! interrupt.

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
// Imports
// -----------------------------------------------------------------------------

use super::timing::{DviTiming, ScanlinePhase, VGA_TIMING};
use super::tmds::{VACTIVE_LINE, VBLANK_LINE_VSYNC_OFF, VBLANK_LINE_VSYNC_ON};
use super::WORDS_PER_ROW;

// -----------------------------------------------------------------------------
// Types
// -----------------------------------------------------------------------------

/// One DMA transfer: how many 32-bit words to move, and where from.
///
/// `repr(C)` field order matters: the command channel copies descriptors
/// verbatim onto the data channel's `AL3` register pair, which is laid out
/// as transfer count followed by read address (the latter triggering the
/// transfer when written).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
	pub transfer_count: u32,
	pub read_addr: u32,
}

/// A compiled frame: `SCANLIST_ENTRIES` descriptors ending in the sentinel.
#[repr(C)]
pub struct ScanList {
	entries: [Descriptor; SCANLIST_ENTRIES],
}

// -----------------------------------------------------------------------------
// Static and Const Data
// -----------------------------------------------------------------------------

/// Descriptors in one frame's scan-list: one per blanking line, two per
/// active line, plus the sentinel.
pub const SCANLIST_ENTRIES: usize =
	(VGA_TIMING.blanking_lines() + 2 * VGA_TIMING.v_active_lines + 1) as usize;

/// 32-bit words in one frame's scan-list.
pub const SCANLIST_WORDS: usize = SCANLIST_ENTRIES * 2;

// -----------------------------------------------------------------------------
// Functions
// -----------------------------------------------------------------------------

impl Descriptor {
	/// The end-of-list marker. Its zero transfer count makes the data
	/// channel's trigger a null trigger, which raises the frame interrupt
	/// instead of starting a transfer.
	pub const SENTINEL: Descriptor = Descriptor {
		transfer_count: 0,
		read_addr: 0,
	};

	/// Does this descriptor terminate the list?
	pub fn is_sentinel(&self) -> bool {
		*self == Self::SENTINEL
	}

	/// A descriptor covering a whole command template.
	fn for_template(template: &'static [u32]) -> Descriptor {
		Descriptor {
			transfer_count: template.len() as u32,
			read_addr: template.as_ptr() as usize as u32,
		}
	}

	/// A descriptor covering one framebuffer row.
	fn for_row(framebuffer_base: u32, row: u32) -> Descriptor {
		Descriptor {
			transfer_count: WORDS_PER_ROW as u32,
			read_addr: framebuffer_base + row * (WORDS_PER_ROW as u32) * 4,
		}
	}
}

impl ScanList {
	/// An all-sentinel list, suitable for static storage before `compile`
	/// has run.
	pub const fn blank() -> ScanList {
		ScanList {
			entries: [Descriptor::SENTINEL; SCANLIST_ENTRIES],
		}
	}

	/// Compile one frame of DMA descriptors.
	///
	/// Walks every scan-line of `timing` in counter order and emits the
	/// descriptors described in the module docs. Deterministic, no I/O; the
	/// only side effect is filling `self`. `framebuffer_base` is the bus
	/// address of the first word of the frame.
	///
	/// Panics if the emitted count ever disagrees with `SCANLIST_ENTRIES` -
	/// that is a construction defect, not a runtime condition.
	pub fn compile(&mut self, timing: &DviTiming, framebuffer_base: u32) {
		let mut next = 0;
		for line in 0..timing.total_lines() {
			match timing.classify(line) {
				ScanlinePhase::VsyncPulse => {
					self.emit(&mut next, Descriptor::for_template(&VBLANK_LINE_VSYNC_ON));
				}
				ScanlinePhase::BackPorch | ScanlinePhase::FrontPorch => {
					self.emit(&mut next, Descriptor::for_template(&VBLANK_LINE_VSYNC_OFF));
				}
				ScanlinePhase::Active { row } => {
					self.emit(&mut next, Descriptor::for_template(&VACTIVE_LINE));
					self.emit(&mut next, Descriptor::for_row(framebuffer_base, row));
				}
			}
		}
		self.emit(&mut next, Descriptor::SENTINEL);
		assert_eq!(next, SCANLIST_ENTRIES);
	}

	fn emit(&mut self, next: &mut usize, descriptor: Descriptor) {
		assert!(*next < SCANLIST_ENTRIES);
		self.entries[*next] = descriptor;
		*next += 1;
	}

	/// The compiled descriptors, sentinel included.
	pub fn entries(&self) -> &[Descriptor] {
		&self.entries
	}

	/// Bus address of the first descriptor, for the command channel's read
	/// cursor.
	pub fn start_addr(&self) -> u32 {
		self.entries.as_ptr() as usize as u32
	}
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
	use super::*;

	fn compiled(base: u32) -> ScanList {
		let mut list = ScanList::blank();
		list.compile(&VGA_TIMING, base);
		list
	}

	#[test]
	fn list_length_matches_the_mode() {
		// 2*(front+sync+back) + 4*active + 2 words for 640x480.
		assert_eq!(SCANLIST_WORDS, 2 * (10 + 2 + 33) + 4 * 480 + 2);
		assert_eq!(SCANLIST_WORDS, 2012);
		assert_eq!(compiled(0x2000_0000).entries().len(), SCANLIST_ENTRIES);
	}

	#[test]
	fn compile_is_deterministic() {
		let a = compiled(0x2000_0000);
		let b = compiled(0x2000_0000);
		assert_eq!(a.entries(), b.entries());
	}

	#[test]
	fn sentinel_is_last_and_unique() {
		let list = compiled(0x2000_0000);
		let entries = list.entries();
		assert!(entries[entries.len() - 1].is_sentinel());
		for entry in &entries[..entries.len() - 1] {
			assert!(!entry.is_sentinel());
		}
	}

	#[test]
	fn active_rows_step_through_the_framebuffer() {
		let base = 0x2000_0000;
		let list = compiled(base);
		let row_bytes = (WORDS_PER_ROW * 4) as u32;
		let mut row = 0u32;
		for entry in list.entries() {
			if entry.transfer_count == WORDS_PER_ROW as u32 {
				// Strictly increasing, one row per active line, no repeats.
				assert_eq!(entry.read_addr, base + row * row_bytes);
				row += 1;
			}
		}
		assert_eq!(row, VGA_TIMING.v_active_lines);
	}

	#[test]
	fn blanking_lines_share_the_templates() {
		let list = compiled(0x2000_0000);
		let vsync_on = VBLANK_LINE_VSYNC_ON.as_ptr() as usize as u32;
		let vsync_off = VBLANK_LINE_VSYNC_OFF.as_ptr() as usize as u32;
		let on_count = list
			.entries()
			.iter()
			.filter(|e| e.read_addr == vsync_on)
			.count();
		let off_count = list
			.entries()
			.iter()
			.filter(|e| e.read_addr == vsync_off)
			.count();
		assert_eq!(on_count, VGA_TIMING.v_sync_width as usize);
		assert_eq!(
			off_count,
			(VGA_TIMING.v_back_porch + VGA_TIMING.v_front_porch) as usize
		);
	}
}

// -----------------------------------------------------------------------------
// End of file
// -----------------------------------------------------------------------------
