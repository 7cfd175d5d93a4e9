//! # DVI timing model
//!
//! Describes one video mode's horizontal and vertical structure, and maps an
//! absolute scan-line index within a frame to the phase of the vertical
//! timing it falls in.
//!
//! The phase ordering is fixed: vertical sync pulse first, then back porch,
//! then the active lines, then the front porch last. This is the order the
//! hardware line counter wraps in, and the scan-list compiler depends on it;
//! reordering would shift the picture against the monitor's notion of where
//! the frame starts.

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

use fugit::HertzU32;

// -----------------------------------------------------------------------------
// Types
// -----------------------------------------------------------------------------

/// The timing parameters of one video mode.
///
/// All counts are in pixel clocks (horizontal) or scan-lines (vertical).
/// `false` polarity means an active-low sync pulse.
pub struct DviTiming {
	pub h_sync_polarity: bool,
	pub h_front_porch: u32,
	pub h_sync_width: u32,
	pub h_back_porch: u32,
	pub h_active_pixels: u32,

	pub v_sync_polarity: bool,
	pub v_front_porch: u32,
	pub v_sync_width: u32,
	pub v_back_porch: u32,
	pub v_active_lines: u32,

	/// Nominal TMDS bit clock for this mode (10x the pixel clock)
	pub bit_clock: HertzU32,
}

/// Where a given scan-line sits in the vertical timing.
///
/// The two porches are merged from the scan-out point of view - both are
/// blanking lines with vertical sync deasserted, and both play the same
/// command template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanlinePhase {
	/// Vertical sync pulse is asserted
	VsyncPulse,
	/// Blanking line between the sync pulse and the picture
	BackPorch,
	/// A picture line; `row` is the offset into the framebuffer, starting
	/// at zero on the first active line
	Active { row: u32 },
	/// Blanking line between the picture and the next sync pulse
	FrontPorch,
}

// -----------------------------------------------------------------------------
// Static and Const Data
// -----------------------------------------------------------------------------

/// 640x480@60Hz, the one mode this driver scans out.
///
/// The 252 MHz bit clock is the DVI spec figure; in practice the serialiser
/// runs at whatever `clk_hstx` provides and a couple of percent off is fine
/// for most monitors.
pub const VGA_TIMING: DviTiming = DviTiming {
	h_sync_polarity: false,
	h_front_porch: 16,
	h_sync_width: 96,
	h_back_porch: 48,
	h_active_pixels: 640,

	v_sync_polarity: false,
	v_front_porch: 10,
	v_sync_width: 2,
	v_back_porch: 33,
	v_active_lines: 480,

	bit_clock: HertzU32::from_raw(252_000_000),
};

// -----------------------------------------------------------------------------
// Functions
// -----------------------------------------------------------------------------

impl DviTiming {
	/// Total scan-lines in one frame.
	pub const fn total_lines(&self) -> u32 {
		self.v_front_porch + self.v_sync_width + self.v_back_porch + self.v_active_lines
	}

	/// Total pixel clocks in one scan-line.
	pub const fn total_pixels(&self) -> u32 {
		self.h_front_porch + self.h_sync_width + self.h_back_porch + self.h_active_pixels
	}

	/// How many scan-lines of a frame are blanking (not picture).
	pub const fn blanking_lines(&self) -> u32 {
		self.v_front_porch + self.v_sync_width + self.v_back_porch
	}

	/// Classify an absolute scan-line index.
	///
	/// Valid over `0..self.total_lines()`. Passing an index outside that
	/// range is a programming error, not a runtime condition.
	pub const fn classify(&self, line: u32) -> ScanlinePhase {
		debug_assert!(line < self.total_lines());
		let vsync_end = self.v_sync_width;
		let back_porch_end = vsync_end + self.v_back_porch;
		let active_end = back_porch_end + self.v_active_lines;
		if line < vsync_end {
			ScanlinePhase::VsyncPulse
		} else if line < back_porch_end {
			ScanlinePhase::BackPorch
		} else if line < active_end {
			ScanlinePhase::Active {
				row: line - back_porch_end,
			}
		} else {
			ScanlinePhase::FrontPorch
		}
	}
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn totals_are_component_sums() {
		assert_eq!(VGA_TIMING.total_lines(), 10 + 2 + 33 + 480);
		assert_eq!(VGA_TIMING.total_pixels(), 16 + 96 + 48 + 640);
		assert_eq!(VGA_TIMING.blanking_lines(), 45);
	}

	#[test]
	fn classify_partitions_the_frame() {
		let t = &VGA_TIMING;
		let mut vsync = 0;
		let mut back = 0;
		let mut active = 0;
		let mut front = 0;
		for line in 0..t.total_lines() {
			match t.classify(line) {
				ScanlinePhase::VsyncPulse => vsync += 1,
				ScanlinePhase::BackPorch => back += 1,
				ScanlinePhase::Active { .. } => active += 1,
				ScanlinePhase::FrontPorch => front += 1,
			}
		}
		assert_eq!(vsync, t.v_sync_width);
		assert_eq!(back, t.v_back_porch);
		assert_eq!(active, t.v_active_lines);
		assert_eq!(front, t.v_front_porch);
	}

	#[test]
	fn classify_ordering_matches_the_line_counter() {
		let t = &VGA_TIMING;
		// Sync pulse leads the frame, front porch ends it.
		assert_eq!(t.classify(0), ScanlinePhase::VsyncPulse);
		assert_eq!(t.classify(t.v_sync_width), ScanlinePhase::BackPorch);
		assert_eq!(
			t.classify(t.v_sync_width + t.v_back_porch),
			ScanlinePhase::Active { row: 0 }
		);
		assert_eq!(
			t.classify(t.total_lines() - t.v_front_porch - 1),
			ScanlinePhase::Active {
				row: t.v_active_lines - 1
			}
		);
		assert_eq!(
			t.classify(t.total_lines() - t.v_front_porch),
			ScanlinePhase::FrontPorch
		);
		assert_eq!(t.classify(t.total_lines() - 1), ScanlinePhase::FrontPorch);
	}

	#[test]
	fn active_rows_count_up_from_zero() {
		let t = &VGA_TIMING;
		let mut expected_row = 0;
		for line in 0..t.total_lines() {
			if let ScanlinePhase::Active { row } = t.classify(line) {
				assert_eq!(row, expected_row);
				expected_row += 1;
			}
		}
		assert_eq!(expected_row, t.v_active_lines);
	}
}

// -----------------------------------------------------------------------------
// End of file
// -----------------------------------------------------------------------------
