//! # HSTX and DMA register bring-up
//!
//! The one-shot hardware configuration behind [`init`], plus the real
//! [`FrameDma`] implementation used by the `DMA_IRQ_2` service routine.
//!
//! Channel roles: channel 0 (pixel) moves command/pixel words into the
//! HSTX FIFO, paced by the HSTX DREQ; channel 1 (command) walks the
//! scan-list and copies each descriptor pair onto channel 0's `AL3`
//! transfer-count/read-address-trigger registers, its write address
//! wrapping on an 8-byte ring so every pair lands on the same two
//! registers. Channel 0 chains back to channel 1 on completion, closing
//! the loop. Channel 0 runs with `IRQ_QUIET`, so the only interrupt it
//! ever raises is the null trigger programmed by the sentinel - once per
//! frame.
//!
//! The HSTX bit clock is left alone: with the shifter moving two bits per
//! cycle, board code should park `clk_hstx` near 126 MHz for a 252 MHz
//! output, and DVI sinks tolerate the couple of percent of error that the
//! stock clock tree gives.

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
use super::{
	DviEngine, Error, FrameDma, FrameWords, OutputConfig, BITS_PER_PIXEL, PIXELS_PER_WORD,
};
use defmt::debug;
use rp235x_hal::pac;

// -----------------------------------------------------------------------------
// Types
// -----------------------------------------------------------------------------

/// [`FrameDma`] over the real DMA block.
struct DmaRegs<'a> {
	dma: &'a pac::dma::RegisterBlock,
}

// -----------------------------------------------------------------------------
// Static and Const Data
// -----------------------------------------------------------------------------

/// DMA channel that feeds the HSTX FIFO.
const PIXEL_DMA_CHAN: usize = 0;

/// DMA channel that walks the scan-list.
const COMMAND_DMA_CHAN: usize = 1;

/// DREQ raised by the HSTX FIFO.
const DREQ_HSTX: u8 = 52;

/// TREQ value for an unpaced (always-ready) channel.
const TREQ_PERMANENT: u8 = 0x3f;

/// First and last GPIO owned by the HSTX (function 0).
const HSTX_FIRST_PIN: usize = 12;
const HSTX_LAST_PIN: usize = 19;

// HSTX_CTRL_CSR fields
const CSR_EN: u32 = 1 << 0;
const CSR_EXPAND_EN: u32 = 1 << 1;
const CSR_SHIFT_LSB: u32 = 8;
const CSR_N_SHIFTS_LSB: u32 = 16;
const CSR_CLKDIV_LSB: u32 = 28;

// HSTX_CTRL_EXPAND_SHIFT fields
const EXPAND_SHIFT_RAW_SHIFT_LSB: u32 = 0;
const EXPAND_SHIFT_RAW_N_SHIFTS_LSB: u32 = 8;
const EXPAND_SHIFT_ENC_SHIFT_LSB: u32 = 16;
const EXPAND_SHIFT_ENC_N_SHIFTS_LSB: u32 = 24;

// HSTX_CTRL_EXPAND_TMDS fields
const EXPAND_TMDS_L0_ROT_LSB: u32 = 0;
const EXPAND_TMDS_L0_NBITS_LSB: u32 = 5;
const EXPAND_TMDS_L1_ROT_LSB: u32 = 8;
const EXPAND_TMDS_L1_NBITS_LSB: u32 = 13;
const EXPAND_TMDS_L2_ROT_LSB: u32 = 16;
const EXPAND_TMDS_L2_NBITS_LSB: u32 = 21;

// HSTX_CTRL_BITx fields
const BIT_SEL_P_LSB: u32 = 0;
const BIT_SEL_N_LSB: u32 = 8;
const BIT_INV: u32 = 1 << 16;
const BIT_CLK: u32 = 1 << 17;

// -----------------------------------------------------------------------------
// Functions
// -----------------------------------------------------------------------------

/// Bring up DVI scan-out from `framebuffer` and leave it free-running.
///
/// Claims the scan-list storage, compiles the frame, programs the HSTX and
/// both DMA channels, registers the engine, enables the frame interrupt and
/// arms the first frame. The framebuffer is only ever *read* by the
/// hardware; its type fixes the resolution, so a buffer of the wrong size
/// does not compile.
///
/// The caller must route `DMA_IRQ_2` to [`irq`]. There is no teardown: a
/// second call fails with [`Error::AlreadyClaimed`] before any register has
/// been touched.
pub fn init(
	hstx_ctrl: pac::HSTX_CTRL,
	hstx_fifo: pac::HSTX_FIFO,
	dma: pac::DMA,
	io_bank0: &pac::IO_BANK0,
	bus_ctrl: &pac::BUSCTRL,
	config: &OutputConfig,
	framebuffer: &'static FrameWords,
) -> Result<(), Error> {
	// The only fallible step. Fail here and no hardware has been touched.
	let scan_list = super::claim_scan_list()?;
	scan_list.compile(&VGA_TIMING, framebuffer.as_ptr() as usize as u32);

	debug!(
		"scan-list compiled: {} descriptors at {:08x}",
		scan_list.entries().len(),
		scan_list.start_addr()
	);

	// TMDS expander: 1 bpp on all three lanes, with the board-supplied
	// rotation placing the pixel bit in the encoder's line of sight.
	let rot = config.tmds_rotate as u32;
	let nbits = (BITS_PER_PIXEL as u32) - 1;
	hstx_ctrl.expand_tmds().write(|w| unsafe {
		w.bits(
			nbits << EXPAND_TMDS_L2_NBITS_LSB
				| rot << EXPAND_TMDS_L2_ROT_LSB
				| nbits << EXPAND_TMDS_L1_NBITS_LSB
				| rot << EXPAND_TMDS_L1_ROT_LSB
				| nbits << EXPAND_TMDS_L0_NBITS_LSB
				| rot << EXPAND_TMDS_L0_ROT_LSB,
		)
	});

	// Pixel words hold 32 pixels and shift one pixel per pop (a rotate of
	// 31 is a left-rotate by one, so the most-significant pixel leaves
	// first). RAW control words are consumed whole.
	hstx_ctrl.expand_shift().write(|w| unsafe {
		w.bits(
			((PIXELS_PER_WORD as u32) % 32) << EXPAND_SHIFT_ENC_N_SHIFTS_LSB
				| 31 << EXPAND_SHIFT_ENC_SHIFT_LSB
				| 1 << EXPAND_SHIFT_RAW_N_SHIFTS_LSB
				| 0 << EXPAND_SHIFT_RAW_SHIFT_LSB,
		)
	});

	// Serial output: clock period of 5 cycles, pop from the command
	// expander every 5 cycles, shift the output register by 2 each cycle.
	hstx_ctrl.csr().write(|w| unsafe { w.bits(0) });
	hstx_ctrl.csr().write(|w| unsafe {
		w.bits(
			CSR_EXPAND_EN
				| 5 << CSR_CLKDIV_LSB
				| 5 << CSR_N_SHIFTS_LSB
				| 2 << CSR_SHIFT_LSB
				| CSR_EN,
		)
	});

	// Route the clock pair and the three data lanes. The second pin of
	// each pair carries the same selection, inverted.
	hstx_ctrl
		.bit(config.clock_bit as usize)
		.write(|w| unsafe { w.bits(BIT_CLK) });
	hstx_ctrl
		.bit((config.clock_bit ^ 1) as usize)
		.write(|w| unsafe { w.bits(BIT_CLK | BIT_INV) });
	for (lane, &bit) in config.lane_bits.iter().enumerate() {
		let sel = ((lane as u32 * 10) << BIT_SEL_P_LSB) | ((lane as u32 * 10 + 1) << BIT_SEL_N_LSB);
		hstx_ctrl
			.bit(bit as usize)
			.write(|w| unsafe { w.bits(sel) });
		hstx_ctrl
			.bit((bit ^ 1) as usize)
			.write(|w| unsafe { w.bits(sel | BIT_INV) });
	}

	// HSTX is GPIO function 0 on its eight pins.
	for pin in HSTX_FIRST_PIN..=HSTX_LAST_PIN {
		io_bank0
			.gpio(pin)
			.gpio_ctrl()
			.write(|w| unsafe { w.funcsel().bits(0) });
	}

	// Pixel channel: paced by the HSTX FIFO, chained back to the command
	// channel, byte-swapping so framebuffer words go out MSB first. Its
	// transfer count and read address arrive later, per descriptor, from
	// the command channel; ctrl and write address never change again.
	// IRQ_QUIET turns the sentinel's null trigger into the one interrupt
	// this driver ever takes.
	dma.ch(PIXEL_DMA_CHAN).ch_al1_ctrl().write(|w| {
		w.data_size().size_word();
		w.incr_read().set_bit();
		unsafe { w.treq_sel().bits(DREQ_HSTX) };
		unsafe { w.chain_to().bits(COMMAND_DMA_CHAN as u8) };
		w.bswap().set_bit();
		w.irq_quiet().set_bit();
		w.en().set_bit();
		w
	});
	dma.ch(PIXEL_DMA_CHAN)
		.ch_al1_write_addr()
		.write(|w| unsafe { w.bits(hstx_fifo.fifo().as_ptr() as usize as u32) });

	// Command channel: unpaced two-word bursts from the scan-list into the
	// pixel channel's AL3 pair, write address wrapping on an 8-byte ring.
	// No chain - the frame interrupt reloads this channel instead.
	dma.ch(COMMAND_DMA_CHAN).ch_write_addr().write(|w| unsafe {
		w.bits(dma.ch(PIXEL_DMA_CHAN).ch_al3_trans_count().as_ptr() as usize as u32)
	});
	dma.ch(COMMAND_DMA_CHAN)
		.ch_read_addr()
		.write(|w| unsafe { w.bits(scan_list.start_addr()) });
	dma.ch(COMMAND_DMA_CHAN)
		.ch_trans_count()
		.write(|w| unsafe { w.bits(2) });
	dma.ch(COMMAND_DMA_CHAN).ch_al1_ctrl().write(|w| {
		w.data_size().size_word();
		w.incr_read().set_bit();
		w.incr_write().set_bit();
		w.ring_sel().set_bit();
		unsafe { w.ring_size().bits(3) };
		unsafe { w.treq_sel().bits(TREQ_PERMANENT) };
		unsafe { w.chain_to().bits(COMMAND_DMA_CHAN as u8) };
		w.en().set_bit();
		w
	});

	// Clear anything stale, then route the pixel channel's completion to
	// DMA_IRQ_2.
	dma.ints2()
		.write(|w| unsafe { w.bits(1 << PIXEL_DMA_CHAN) });
	dma.inte2()
		.write(|w| unsafe { w.bits(1 << PIXEL_DMA_CHAN) });

	// The HSTX FIFO must never run dry mid-line; give DMA first claim on
	// the bus.
	bus_ctrl.bus_priority().write(|w| {
		w.dma_r().set_bit();
		w.dma_w().set_bit();
		w
	});

	// The engine must be registered before the interrupt can fire, or the
	// handler will treat the first frame's sentinel as spurious.
	super::register(DviEngine {
		pixel_channel: PIXEL_DMA_CHAN as u8,
		command_channel: COMMAND_DMA_CHAN as u8,
		scanlist_start: scan_list.start_addr(),
	});
	unsafe {
		cortex_m::peripheral::NVIC::unmask(pac::Interrupt::DMA_IRQ_2);
	}

	debug!(
		"DVI scan-out running, nominal bit clock {} MHz",
		VGA_TIMING.bit_clock.to_MHz()
	);

	// Nothing starts the first frame by itself: run the handler once to
	// arm the command channel.
	unsafe { irq() };

	Ok(())
}

/// The `DMA_IRQ_2` service routine.
///
/// Acknowledges the frame interrupt and rewinds the command channel to the
/// top of the scan-list. Wire it up from the application:
///
/// ```ignore
/// #[interrupt]
/// fn DMA_IRQ_2() {
/// 	unsafe { hstx_dvi::dvi::irq() };
/// }
/// ```
///
/// # Safety
///
/// Only call this from the `DMA_IRQ_2` handler (or from `init`, which uses
/// it to arm the first frame).
#[link_section = ".data"]
#[inline(never)]
pub unsafe fn irq() {
	let mut dma = DmaRegs {
		dma: &*pac::DMA::ptr(),
	};
	super::service_frame_interrupt(&mut dma);
}

impl<'a> FrameDma for DmaRegs<'a> {
	fn ack_frame_interrupt(&mut self, pixel_channel: u8) {
		self.dma
			.ints2()
			.write(|w| unsafe { w.bits(1 << pixel_channel) });
	}

	fn restart_command_list(&mut self, command_channel: u8, read_addr: u32) {
		self.dma
			.ch(command_channel as usize)
			.ch_al3_read_addr_trig()
			.write(|w| unsafe { w.bits(read_addr) });
	}
}

// -----------------------------------------------------------------------------
// End of file
// -----------------------------------------------------------------------------
