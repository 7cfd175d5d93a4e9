//! # HSTX DVI driver
//!
//! Drives a 640x480@60Hz DVI signal out of the RP2350's HSTX serialiser,
//! straight from a 1 bpp framebuffer in RAM. Once configured, the whole of
//! active scan-out runs on two chained DMA channels with no CPU involvement;
//! software only runs once per frame, in a short interrupt handler that
//! rewinds the DMA command list for the next frame.
//!
//! The moving parts are:
//!
//! * [`dvi::timing`] - classifies each scan-line of the frame (vertical
//!   sync, back porch, active, front porch),
//! * [`dvi::tmds`] - the three shared HSTX command templates that encode
//!   the fixed (non-pixel) portion of every scan-line,
//! * [`dvi::scanlist`] - compiles the timing and the framebuffer base
//!   address into one frame's worth of DMA descriptors,
//! * `dvi::hw` - programs the HSTX and DMA registers and owns the
//!   `DMA_IRQ_2` service routine (target builds only).
//!
//! A typical target application looks like:
//!
//! ```ignore
//! static mut FRAMEBUFFER: hstx_dvi::dvi::FrameWords =
//! 	[0; hstx_dvi::dvi::FRAME_WORDS];
//!
//! // GPIO 12-19 carry the four differential pairs; which HSTX bit feeds
//! // which pair is a board property.
//! let config = hstx_dvi::dvi::OutputConfig {
//! 	clock_bit: 0,
//! 	lane_bits: [2, 4, 6],
//! 	tmds_rotate: 24,
//! };
//!
//! hstx_dvi::dvi::init(
//! 	pac.HSTX_CTRL,
//! 	pac.HSTX_FIFO,
//! 	pac.DMA,
//! 	&pac.IO_BANK0,
//! 	&pac.BUSCTRL,
//! 	&config,
//! 	unsafe { &FRAMEBUFFER },
//! )
//! .unwrap();
//!
//! #[interrupt]
//! fn DMA_IRQ_2() {
//! 	unsafe { hstx_dvi::dvi::irq() };
//! }
//! ```
//!
//! The HSTX bit clock is left at whatever the clock tree provides; with the
//! serialiser shifting two bits per cycle you want `clk_hstx` near 126 MHz
//! for the nominal 252 MHz DVI bit clock. Setting that up belongs to the
//! board support code, not to this driver.

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

#![no_std]

// -----------------------------------------------------------------------------
// Sub-modules
// -----------------------------------------------------------------------------

pub mod dvi;

// -----------------------------------------------------------------------------
// End of file
// -----------------------------------------------------------------------------
