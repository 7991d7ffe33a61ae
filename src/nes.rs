//! Top-level facade that wires CPU, PPU, APU, RAM, controllers and the
//! inserted cartridge into a single runnable console.
//!
//! This is the type frontends (GUI shells, test harnesses, headless tools)
//! actually hold on to; everything else in this crate is plumbing `Nes`
//! drives.

use std::path::Path;

use crate::{
    apu::Apu,
    audio::NesSoundMixer,
    bus::{OpenBus, cpu::CpuBus},
    cartridge::{self, Cartridge},
    controller::{Button, Controller, SerialLogger},
    cpu::Cpu,
    error::Error,
    mem_block::cpu as cpu_ram,
    ppu::{Ppu, buffer::ColorFormat, buffer::FrameBuffer},
    reset_kind::ResetKind,
};

/// CPU-side register snapshot exposed to debuggers and test harnesses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuSnapshot {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub s: u8,
    pub p: u8,
    pub pc: u16,
}

/// Builds a [`Nes`] with an explicit framebuffer (and, eventually, other
/// optional runtime knobs) instead of accepting `Nes`'s defaults.
#[derive(Default)]
pub struct NesBuilder {
    framebuffer: Option<FrameBuffer>,
    audio_enabled: bool,
}

impl NesBuilder {
    pub fn framebuffer(mut self, framebuffer: FrameBuffer) -> Self {
        self.framebuffer = Some(framebuffer);
        self
    }

    /// Enables audio sample production immediately, instead of lazily on
    /// the first `run_frame(true)` call.
    pub fn audio(mut self, enabled: bool) -> Self {
        self.audio_enabled = enabled;
        self
    }

    pub fn build(self) -> Nes {
        let color_format = self
            .framebuffer
            .as_ref()
            .map(|fb| fb.color_format())
            .unwrap_or(ColorFormat::Rgba8888);
        let mut nes = Nes::new(color_format);
        if let Some(fb) = self.framebuffer {
            *nes.ppu.framebuffer_mut() = fb;
        }
        if self.audio_enabled {
            nes.mixer = Some(NesSoundMixer::new());
        }
        nes
    }
}

/// A complete NES console: CPU, PPU, APU, RAM, controllers, and whatever
/// cartridge is currently inserted.
pub struct Nes {
    pub(crate) cpu: Cpu,
    pub(crate) ram: cpu_ram::Ram,
    pub(crate) ppu: Ppu,
    pub(crate) apu: Apu,
    pub(crate) cartridge: Option<Cartridge>,
    pub(crate) controllers: [Controller; 2],
    pub(crate) serial_log: SerialLogger,
    pub(crate) oam_dma_request: Option<u8>,
    pub(crate) open_bus: OpenBus,
    pub(crate) mixer: Option<NesSoundMixer>,
    pub(crate) cycles: u64,
    pub(crate) master_clock: u64,
    /// CPU/PPU phase offset, read/write half-cycle split, in master-clock
    /// units (12 per CPU cycle, 4 per PPU dot). See `CpuBus::bump_master_clock`.
    pub(crate) ppu_offset: u8,
    pub(crate) clock_start_count: u8,
    pub(crate) clock_end_count: u8,
}

impl Nes {
    pub fn new(color_format: ColorFormat) -> Self {
        let mut nes = Self {
            cpu: Cpu::new(),
            ram: cpu_ram::Ram::new(),
            ppu: Ppu::new(FrameBuffer::new(color_format)),
            apu: Apu::new(),
            cartridge: None,
            controllers: [Controller::new(), Controller::new()],
            serial_log: SerialLogger::new(),
            oam_dma_request: None,
            open_bus: OpenBus::new(),
            mixer: None,
            cycles: 0,
            master_clock: 0,
            ppu_offset: 0,
            clock_start_count: 6,
            clock_end_count: 6,
        };
        nes.reset(ResetKind::PowerOn);
        nes
    }

    pub fn builder() -> NesBuilder {
        NesBuilder::default()
    }

    /// Replaces the currently inserted cartridge, if any.
    pub fn insert_cartridge(&mut self, cartridge: Cartridge) {
        self.cartridge = Some(cartridge);
    }

    pub fn remove_cartridge(&mut self) {
        self.cartridge = None;
    }

    pub fn has_cartridge(&self) -> bool {
        self.cartridge.is_some()
    }

    /// Parses an iNES/NES 2.0 ROM image already in memory and inserts it.
    pub fn load_rom(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let cart = cartridge::load_cartridge(bytes)?;
        tracing::info!(mapper = cart.mapper().mapper_id(), "rom loaded");
        self.insert_cartridge(cart);
        Ok(())
    }

    /// Loads a ROM image from disk and inserts it.
    pub fn load_cartridge_from_file(&mut self, path: &Path) -> Result<(), Error> {
        let cart = cartridge::load_cartridge_from_file(path)?;
        self.insert_cartridge(cart);
        Ok(())
    }

    /// Resets the CPU/PPU/APU and the inserted cartridge's mapper.
    ///
    /// `ResetKind::PowerOn` additionally randomizes CPU RAM, matching real
    /// hardware's unpredictable power-on contents; `ResetKind::Soft` leaves
    /// RAM untouched.
    pub fn reset(&mut self, kind: ResetKind) {
        if kind.randomizes_ram() {
            crate::rng::SplitMix64::default().fill_bytes(self.ram.as_mut_slice());
        }
        self.ppu.reset(kind);
        self.apu.reset();
        self.open_bus.reset();
        self.oam_dma_request = None;
        self.master_clock = 0;
        if let Some(cart) = self.cartridge.as_mut() {
            cart.reset(kind);
        }
        let Self {
            cpu,
            ram,
            ppu,
            apu,
            cartridge,
            controllers,
            serial_log,
            oam_dma_request,
            open_bus,
            mixer,
            cycles,
            master_clock,
            ppu_offset,
            clock_start_count,
            clock_end_count,
        } = self;
        let mut bus = CpuBus::new(
            ram,
            ppu,
            apu,
            cartridge.as_mut(),
            controllers,
            Some(serial_log),
            oam_dma_request,
            open_bus,
            mixer.as_mut(),
            cycles,
            master_clock,
            *ppu_offset,
            *clock_start_count,
            *clock_end_count,
        );
        cpu.reset(&mut bus, kind);
        tracing::info!(?kind, "console reset");
    }

    fn make_bus(&mut self) -> CpuBus<'_> {
        CpuBus::new(
            &mut self.ram,
            &mut self.ppu,
            &mut self.apu,
            self.cartridge.as_mut(),
            &mut self.controllers,
            Some(&mut self.serial_log),
            &mut self.oam_dma_request,
            &mut self.open_bus,
            self.mixer.as_mut(),
            &mut self.cycles,
            &mut self.master_clock,
            self.ppu_offset,
            self.clock_start_count,
            self.clock_end_count,
        )
    }

    /// Runs the console forward until the PPU completes exactly one frame.
    ///
    /// `audio` controls whether samples are produced for this frame; pass
    /// `false` to skip mixing work entirely when nobody is listening.
    pub fn run_frame(&mut self, audio: bool) {
        if audio && self.mixer.is_none() {
            self.mixer = Some(NesSoundMixer::new());
        } else if !audio {
            self.mixer = None;
        }

        let target_frame = self.ppu.frame_count().wrapping_add(1);
        while self.ppu.frame_count() != target_frame {
            self.step_instruction();
        }
    }

    /// Executes exactly one CPU instruction (or interrupt sequence), driving
    /// the PPU/APU for the cycles it takes and servicing any OAM DMA request
    /// it raised along the way.
    fn step_instruction(&mut self) {
        {
            use crate::bus::Bus as _;
            let Self {
                cpu,
                ram,
                ppu,
                apu,
                cartridge,
                controllers,
                serial_log,
                oam_dma_request,
                open_bus,
                mixer,
                cycles,
                master_clock,
                ppu_offset,
                clock_start_count,
                clock_end_count,
            } = self;
            let mut bus = CpuBus::new(
                ram,
                ppu,
                apu,
                cartridge.as_mut(),
                controllers,
                Some(serial_log),
                oam_dma_request,
                open_bus,
                mixer.as_mut(),
                cycles,
                master_clock,
                *ppu_offset,
                *clock_start_count,
                *clock_end_count,
            );
            cpu.step(&mut bus);
            if let Some((stall_cycles, _fetched_addr)) = bus.take_pending_dmc_stall() {
                for _ in 0..stall_cycles {
                    bus.internal_cycle();
                }
            }
        }
        if let Some(page) = self.oam_dma_request.take() {
            self.run_oam_dma(page);
        }
    }

    /// Performs the 513/514-cycle OAM DMA transfer triggered by a `$4014` write.
    fn run_oam_dma(&mut self, page: u8) {
        use crate::bus::Bus as _;
        use crate::memory::ppu as ppu_mem;

        let mut bus = self.make_bus();
        let odd_cycle = bus.cpu_cycles() % 2 == 1;
        bus.internal_cycle();
        if odd_cycle {
            bus.internal_cycle();
        }
        let base = (page as u16) << 8;
        let oam_data_addr = ppu_mem::Register::OamData.addr();
        for offset in 0..256u16 {
            let value = bus.mem_read(base + offset);
            bus.mem_write(oam_data_addr, value);
        }
        tracing::debug!(page, odd_cycle, "oam dma transfer complete");
    }

    /// Returns every complete audio sample produced since the last drain.
    pub fn drain_audio(&mut self) -> Vec<f32> {
        match self.mixer.as_mut() {
            Some(mixer) => mixer.drain(),
            None => Vec::new(),
        }
    }

    /// Returns and clears bytes captured from the serial debug output port.
    pub fn take_serial_output(&mut self) -> Vec<u8> {
        self.serial_log.take()
    }

    pub fn render_buffer(&self) -> &[u8] {
        self.ppu.render_buffer()
    }

    pub fn render_index_buffer(&self) -> &[u8] {
        self.ppu.render_index_buffer()
    }

    /// Non-panicking variant of `render_buffer`: `None` for swapchain-backed framebuffers.
    pub fn try_render_buffer(&self) -> Option<&[u8]> {
        self.ppu.try_render_buffer()
    }

    /// Per-pixel emphasis plane for the most recently presented frame.
    pub fn render_emphasis_buffer(&self) -> Vec<u8> {
        self.ppu.render_emphasis_buffer()
    }

    pub fn frame_buffer(&self) -> &[u8] {
        self.render_buffer()
    }

    /// Number of frames presented to the framebuffer so far.
    pub fn frame_count(&self) -> u32 {
        self.ppu.frame_count()
    }

    /// Replaces the NES-to-RGB color table used when presenting frames.
    pub fn set_palette(&mut self, palette: crate::ppu::palette::Palette) {
        self.ppu.set_palette(palette);
    }

    /// Total CPU cycles executed since the last power-on/soft reset.
    pub fn cpu_cycles(&self) -> u64 {
        self.cycles
    }

    /// Reads a byte from CPU address space with bus side effects, the same
    /// way the CPU core itself would.
    pub fn peek_cpu_byte(&mut self, addr: u16) -> u8 {
        let mut bus = self.make_bus();
        use crate::bus::Bus as _;
        bus.peek(addr)
    }

    /// Fills `dst` with consecutive bytes from CPU address space, starting at `base`.
    pub fn peek_cpu_slice(&mut self, base: u16, dst: &mut [u8]) {
        for (i, slot) in dst.iter_mut().enumerate() {
            *slot = self.peek_cpu_byte(base.wrapping_add(i as u16));
        }
    }

    pub fn cpu_snapshot(&self) -> CpuSnapshot {
        CpuSnapshot {
            a: self.cpu.a,
            x: self.cpu.x,
            y: self.cpu.y,
            s: self.cpu.s,
            p: self.cpu.p.bits(),
            pc: self.cpu.pc,
        }
    }

    pub fn set_button(&mut self, port: usize, button: Button, pressed: bool) {
        if let Some(controller) = self.controllers.get_mut(port) {
            controller.set_button(button, pressed);
        }
    }
}

impl Default for Nes {
    fn default() -> Self {
        Self::new(ColorFormat::Rgba8888)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nrom_test_rom() -> Vec<u8> {
        let mut rom = vec![0u8; 16 + 16 * 1024 + 8 * 1024];
        rom[0..4].copy_from_slice(b"NES\x1a");
        rom[4] = 1; // 16 KiB PRG ROM
        rom[5] = 1; // 8 KiB CHR ROM
        let prg_start = 16;
        let reset_vector = prg_start + 0x7FFC;
        rom[reset_vector] = 0x00;
        rom[reset_vector + 1] = 0x80;
        rom
    }

    #[test]
    fn default_nes_has_no_cartridge() {
        let nes = Nes::default();
        assert!(!nes.has_cartridge());
    }

    #[test]
    fn loading_a_rom_inserts_a_cartridge() {
        let mut nes = Nes::default();
        nes.load_rom(&nrom_test_rom()).unwrap();
        assert!(nes.has_cartridge());
    }

    #[test]
    fn reset_after_loading_points_pc_at_the_reset_vector() {
        let mut nes = Nes::default();
        nes.load_rom(&nrom_test_rom()).unwrap();
        nes.reset(ResetKind::PowerOn);
        assert_eq!(nes.cpu_snapshot().pc, 0x8000);
    }

    #[test]
    fn run_frame_advances_the_ppu_frame_counter() {
        let mut nes = Nes::default();
        nes.load_rom(&nrom_test_rom()).unwrap();
        nes.reset(ResetKind::PowerOn);
        let before = nes.ppu.frame_count();
        nes.run_frame(false);
        assert_eq!(nes.ppu.frame_count(), before.wrapping_add(1));
    }

    #[test]
    fn builder_uses_the_provided_framebuffer_color_format() {
        let nes = Nes::builder()
            .framebuffer(FrameBuffer::new(ColorFormat::Rgb555))
            .build();
        assert!(!nes.has_cartridge());
    }

    #[test]
    fn set_button_updates_the_selected_port() {
        let mut nes = Nes::default();
        nes.set_button(0, Button::A, true);
        assert_eq!(nes.controllers[0].read() & 0x01, 0x01);
    }

    #[test]
    fn oam_dma_costs_513_cycles_from_an_even_cpu_cycle() {
        let mut nes = Nes::default();
        nes.cycles = 10;
        let before = nes.cpu_cycles();
        nes.run_oam_dma(0x02);
        assert_eq!(nes.cpu_cycles() - before, 513);
    }

    #[test]
    fn oam_dma_costs_514_cycles_from_an_odd_cpu_cycle() {
        let mut nes = Nes::default();
        nes.cycles = 11;
        let before = nes.cpu_cycles();
        nes.run_oam_dma(0x02);
        assert_eq!(nes.cpu_cycles() - before, 514);
    }
}
