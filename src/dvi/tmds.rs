//! # TMDS symbols and HSTX line templates
//!
//! DVI blanking periods carry TMDS *control* symbols rather than pixel data.
//! There are only four of them, one per {v-sync, h-sync} level pair, and the
//! HSTX can emit them directly from RAW command words with the same 10-bit
//! symbol repeated on all three lanes.
//!
//! This module builds the three command-stream templates every scan-line of
//! a frame is assembled from: a blanking line with v-sync asserted, a
//! blanking line with v-sync deasserted, and the fixed prefix of an active
//! line (porches and sync pulse, ending in the pixel-transfer command). The
//! templates are immutable statics; the scan-list references them by address
//! and never copies them.
//!
//! Every word is byte-swapped at compile time, because the DMA channel that
//! feeds the HSTX FIFO runs with `BSWAP` set (see `dvi::hw`) so that 1 bpp
//! framebuffer words shift out most-significant pixel first.

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

use super::timing::VGA_TIMING;

// -----------------------------------------------------------------------------
// Static and Const Data
// -----------------------------------------------------------------------------

/// TMDS control symbol for {C1, C0} = {0, 0}
const TMDS_CTRL_00: u32 = 0x354;
/// TMDS control symbol for {C1, C0} = {0, 1}
const TMDS_CTRL_01: u32 = 0x0ab;
/// TMDS control symbol for {C1, C0} = {1, 0}
const TMDS_CTRL_10: u32 = 0x154;
/// TMDS control symbol for {C1, C0} = {1, 1}
const TMDS_CTRL_11: u32 = 0x2ab;

// Lane 0 carries the syncs (C0 = h-sync, C1 = v-sync); lanes 1 and 2 idle
// at control symbol 00 during blanking.
const SYNC_V0_H0: u32 = TMDS_CTRL_00 | (TMDS_CTRL_00 << 10) | (TMDS_CTRL_00 << 20);
const SYNC_V0_H1: u32 = TMDS_CTRL_01 | (TMDS_CTRL_00 << 10) | (TMDS_CTRL_00 << 20);
const SYNC_V1_H0: u32 = TMDS_CTRL_10 | (TMDS_CTRL_00 << 10) | (TMDS_CTRL_00 << 20);
const SYNC_V1_H1: u32 = TMDS_CTRL_11 | (TMDS_CTRL_00 << 10) | (TMDS_CTRL_00 << 20);

/// HSTX command: send the following raw words once each
pub const HSTX_CMD_RAW: u32 = 0x0 << 12;
/// HSTX command: repeat the following raw word N times
pub const HSTX_CMD_RAW_REPEAT: u32 = 0x1 << 12;
/// HSTX command: TMDS-encode the following N pixels
pub const HSTX_CMD_TMDS: u32 = 0x2 << 12;
/// HSTX command: repeat one TMDS-encoded pixel N times
pub const HSTX_CMD_TMDS_REPEAT: u32 = 0x3 << 12;
/// HSTX command: do nothing
pub const HSTX_CMD_NOP: u32 = 0xf << 12;

/// Pre-swap a command word for the byte-swapping data channel.
const fn swapped(word: u32) -> u32 {
	word.swap_bytes()
}

/// Number of command words in a blanking-line template.
pub const VBLANK_LINE_WORDS: usize = 6;

/// Number of command words in the active-line prefix template.
pub const VACTIVE_LINE_WORDS: usize = 9;

/// One whole blanking line with v-sync deasserted.
///
/// Shared by every back-porch and front-porch line of the frame.
pub static VBLANK_LINE_VSYNC_OFF: [u32; VBLANK_LINE_WORDS] = [
	swapped(HSTX_CMD_RAW_REPEAT | VGA_TIMING.h_front_porch),
	swapped(SYNC_V1_H1),
	swapped(HSTX_CMD_RAW_REPEAT | VGA_TIMING.h_sync_width),
	swapped(SYNC_V1_H0),
	swapped(HSTX_CMD_RAW_REPEAT | (VGA_TIMING.h_back_porch + VGA_TIMING.h_active_pixels)),
	swapped(SYNC_V1_H1),
];

/// One whole blanking line with v-sync asserted.
///
/// Shared by every line of the vertical sync pulse.
pub static VBLANK_LINE_VSYNC_ON: [u32; VBLANK_LINE_WORDS] = [
	swapped(HSTX_CMD_RAW_REPEAT | VGA_TIMING.h_front_porch),
	swapped(SYNC_V0_H1),
	swapped(HSTX_CMD_RAW_REPEAT | VGA_TIMING.h_sync_width),
	swapped(SYNC_V0_H0),
	swapped(HSTX_CMD_RAW_REPEAT | (VGA_TIMING.h_back_porch + VGA_TIMING.h_active_pixels)),
	swapped(SYNC_V0_H1),
];

/// The fixed prefix of an active line: porches and sync pulse, ending in
/// the pixel-transfer command. The pixel words themselves follow from a
/// separate DMA descriptor pointing into the framebuffer.
pub static VACTIVE_LINE: [u32; VACTIVE_LINE_WORDS] = [
	swapped(HSTX_CMD_RAW_REPEAT | VGA_TIMING.h_front_porch),
	swapped(SYNC_V1_H1),
	swapped(HSTX_CMD_NOP),
	swapped(HSTX_CMD_RAW_REPEAT | VGA_TIMING.h_sync_width),
	swapped(SYNC_V1_H0),
	swapped(HSTX_CMD_NOP),
	swapped(HSTX_CMD_RAW_REPEAT | VGA_TIMING.h_back_porch),
	swapped(SYNC_V1_H1),
	swapped(HSTX_CMD_TMDS | VGA_TIMING.h_active_pixels),
];

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
	use super::*;

	/// Sum the pixel clocks a template accounts for, undoing the byte swap.
	fn template_pixels(template: &[u32]) -> u32 {
		let mut total = 0;
		for &word in template {
			let word = word.swap_bytes();
			match word & 0xf000 {
				w if w == HSTX_CMD_RAW_REPEAT => total += word & 0xfff,
				w if w == HSTX_CMD_TMDS => total += word & 0xfff,
				_ => {}
			}
		}
		total
	}

	#[test]
	fn every_template_covers_a_full_scanline() {
		let line = VGA_TIMING.total_pixels();
		assert_eq!(template_pixels(&VBLANK_LINE_VSYNC_OFF), line);
		assert_eq!(template_pixels(&VBLANK_LINE_VSYNC_ON), line);
		assert_eq!(template_pixels(&VACTIVE_LINE), line);
	}

	#[test]
	fn vsync_templates_differ_only_in_sync_level() {
		// Same command structure, different control symbols on lane 0.
		for (index, (on, off)) in VBLANK_LINE_VSYNC_ON
			.iter()
			.zip(VBLANK_LINE_VSYNC_OFF.iter())
			.enumerate()
		{
			if index % 2 == 0 {
				assert_eq!(on, off);
			} else {
				assert_ne!(on, off);
			}
		}
	}
}

// -----------------------------------------------------------------------------
// End of file
// -----------------------------------------------------------------------------
