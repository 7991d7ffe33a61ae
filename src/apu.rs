//! Audio Processing Unit (APU) emulation.
//!
//! The NES APU exposes a set of memory mapped registers between `0x4000` and
//! `0x4017`. The CPU configures the five sound channels through those
//! registers and polls the status register (`0x4015`) to detect frame IRQs
//! or DMC activity. This module owns the channel state machines, the frame
//! sequencer that clocks them, and the glue that turns per-cycle channel
//! outputs into mixed samples via [`crate::audio::NesSoundMixer`].

use core::fmt;

use crate::{
    audio::NesSoundMixer,
    memory::apu::{self as apu_mem},
};

mod dmc;
mod envelope;
mod expansion;
mod frame_counter;
mod length_counter;
mod noise;
mod pulse;
mod tables;
mod triangle;

use dmc::Dmc;
use frame_counter::FrameCounter;
use noise::Noise;
use pulse::{Pulse, PulseChannel};
use triangle::Triangle;

pub use expansion::ExpansionAudio;
pub use frame_counter::FrameCounterMode;

/// Interrupt flags latched by the frame sequencer and the DMC unit.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub(super) struct StatusFlags {
    pub(super) frame_interrupt: bool,
    pub(super) dmc_interrupt: bool,
}

/// The five-channel NES sound generator.
#[derive(Clone)]
pub struct Apu {
    pulse1: Pulse,
    pulse2: Pulse,
    triangle: Triangle,
    noise: Noise,
    dmc: Dmc,
    frame_counter: FrameCounter,
    status: StatusFlags,
    /// Alternates every CPU cycle; pulse/noise timers only tick on the low phase.
    apu_cycle_phase: bool,
    /// Stall cycles reported by the most recent DMC sample fetch.
    dmc_stall: u8,
}

impl fmt::Debug for Apu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Apu")
            .field("frame_counter", &self.frame_counter)
            .field("status", &self.status)
            .finish()
    }
}

impl Default for Apu {
    fn default() -> Self {
        Self::new()
    }
}

impl Apu {
    pub fn new() -> Self {
        Self {
            pulse1: Pulse::new(PulseChannel::Pulse1),
            pulse2: Pulse::new(PulseChannel::Pulse2),
            triangle: Triangle::default(),
            noise: Noise::default(),
            dmc: Dmc::default(),
            frame_counter: FrameCounter::default(),
            status: StatusFlags::default(),
            apu_cycle_phase: false,
            dmc_stall: 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Handles a CPU write to one of the `$4000-$4017` APU registers.
    pub fn cpu_write(&mut self, addr: u16, value: u8, cycle: u64) {
        match addr {
            0x4000 => self.pulse1.write_control(value),
            0x4001 => self.pulse1.write_sweep(value),
            0x4002 => self.pulse1.write_timer_low(value),
            0x4003 => self.pulse1.write_timer_high(value),
            0x4004 => self.pulse2.write_control(value),
            0x4005 => self.pulse2.write_sweep(value),
            0x4006 => self.pulse2.write_timer_low(value),
            0x4007 => self.pulse2.write_timer_high(value),
            0x4008 => self.triangle.write_control(value),
            0x4009 => {}
            0x400A => self.triangle.write_timer_low(value),
            0x400B => self.triangle.write_timer_high(value),
            0x400C => self.noise.write_control(value),
            0x400D => {}
            0x400E => self.noise.write_mode_and_period(value),
            0x400F => self.noise.write_length(value),
            0x4010 => self.dmc.write_control(value, &mut self.status),
            0x4011 => self.dmc.write_direct_load(value),
            0x4012 => self.dmc.write_sample_address(value),
            0x4013 => self.dmc.write_sample_length(value),
            apu_mem::STATUS => self.write_status(value),
            apu_mem::FRAME_COUNTER => {
                tracing::debug!(mode_bit = value & 0x80, cycle, "frame counter reconfigured via $4017");
                self.frame_counter.configure(value, cycle);
            }
            _ => {}
        }
    }

    fn write_status(&mut self, value: u8) {
        self.pulse1.set_enabled(value & 0b0000_0001 != 0);
        self.pulse2.set_enabled(value & 0b0000_0010 != 0);
        self.triangle.set_enabled(value & 0b0000_0100 != 0);
        self.noise.set_enabled(value & 0b0000_1000 != 0);
        self.dmc
            .set_enabled(value & 0b0001_0000 != 0, &mut self.status);
    }

    /// Handles a CPU read of `$4015`; clears the frame interrupt flag as a side effect.
    pub fn cpu_read(&mut self, addr: u16) -> u8 {
        match addr {
            apu_mem::STATUS => self.read_status(),
            _ => 0,
        }
    }

    fn read_status(&mut self) -> u8 {
        let mut value = 0u8;
        value |= self.pulse1.length.active() as u8;
        value |= (self.pulse2.length.active() as u8) << 1;
        value |= (self.triangle.length.active() as u8) << 2;
        value |= (self.noise.length.active() as u8) << 3;
        value |= (self.dmc.active() as u8) << 4;
        value |= (self.status.frame_interrupt as u8) << 6;
        value |= (self.status.dmc_interrupt as u8) << 7;
        self.status.frame_interrupt = false;
        value
    }

    /// `true` while the frame sequencer or the DMC hold an unacknowledged IRQ.
    pub fn irq_pending(&mut self) -> bool {
        self.status.frame_interrupt || self.status.dmc_interrupt
    }

    /// Clears the frame sequencer's IRQ line. The DMC interrupt is cleared by
    /// disabling the channel or re-enabling it via `$4015`.
    pub fn clear_irq(&mut self) {
        self.status.frame_interrupt = false;
    }

    fn apply_frame_tick(&mut self, tick: frame_counter::FrameTick) {
        if tick.quarter {
            self.pulse1.clock_envelope();
            self.pulse2.clock_envelope();
            self.noise.clock_envelope();
            self.triangle.clock_linear_counter();
        }
        if tick.half {
            self.pulse1.clock_length();
            self.pulse2.clock_length();
            self.triangle.clock_length();
            self.noise.clock_length();
            self.pulse1.clock_sweep();
            self.pulse2.clock_sweep();
        }
        if tick.frame_irq {
            self.status.frame_interrupt = true;
        }
        if tick.frame_irq_clear {
            self.status.frame_interrupt = false;
        }
    }

    /// Advances every channel and the frame sequencer by one CPU cycle.
    ///
    /// `reader` supplies bytes for DMC sample fetches from CPU address space.
    /// Returns `(stall_cycles, fetched_address)`: `stall_cycles` is non-zero on
    /// cycles where the DMC stole bus access from the CPU to fetch a byte, and
    /// `fetched_address` is the address that was read, for bus-level bookkeeping.
    pub fn clock<F>(&mut self, mut reader: F) -> (u8, Option<u16>)
    where
        F: FnMut(u16) -> u8,
    {
        self.triangle.step_timer();

        let fetched = self.dmc.clock(&mut reader, &mut self.status);
        self.dmc_stall = if fetched.is_some() { 4 } else { 0 };

        self.apu_cycle_phase = !self.apu_cycle_phase;
        if self.apu_cycle_phase {
            self.pulse1.clock_timer();
            self.pulse2.clock_timer();
            self.noise.clock_timer();
        }

        let tick = self.frame_counter.step();
        self.apply_frame_tick(tick);

        (self.dmc_stall, fetched)
    }

    /// Like [`Apu::clock`], but also mixes and pushes the resulting sample
    /// into `mixer`.
    pub fn clock_with_mixer<F>(&mut self, mixer: &mut NesSoundMixer, reader: F) -> (u8, Option<u16>)
    where
        F: FnMut(u16) -> u8,
    {
        let result = self.clock(reader);
        mixer.push_sample(
            self.pulse1.output(),
            self.pulse2.output(),
            self.triangle.output(),
            self.noise.output(),
            self.dmc.output(),
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn silent_reader(_addr: u16) -> u8 {
        0
    }

    #[test]
    fn enabling_a_channel_does_not_start_its_length_counter() {
        let mut apu = Apu::new();
        apu.cpu_write(0x4015, 0b0000_0001, 0);
        assert_eq!(apu.read_status() & 0b0000_0001, 0);
    }

    #[test]
    fn writing_pulse_timer_high_loads_length_counter_when_enabled() {
        let mut apu = Apu::new();
        apu.cpu_write(0x4015, 0b0000_0001, 0);
        apu.cpu_write(0x4003, 0b0000_1000, 0);
        assert_eq!(apu.read_status() & 0b0000_0001, 0b0000_0001);
    }

    #[test]
    fn disabling_a_channel_clears_its_length_counter() {
        let mut apu = Apu::new();
        apu.cpu_write(0x4015, 0b0000_0001, 0);
        apu.cpu_write(0x4003, 0b0000_1000, 0);
        apu.cpu_write(0x4015, 0b0000_0000, 0);
        assert_eq!(apu.read_status() & 0b0000_0001, 0);
    }

    #[test]
    fn frame_counter_mode_switches_on_4017_write() {
        let mut apu = Apu::new();
        apu.cpu_write(0x4017, 0b1000_0000, 0);
        assert_eq!(apu.frame_counter.mode(), FrameCounterMode::FourStep);
        for _ in 0..5 {
            apu.clock(silent_reader);
        }
        assert_eq!(apu.frame_counter.mode(), FrameCounterMode::FiveStep);
    }

    #[test]
    fn reading_status_clears_frame_interrupt_flag() {
        let mut apu = Apu::new();
        apu.status.frame_interrupt = true;
        let first = apu.cpu_read(0x4015);
        assert_eq!(first & 0b0100_0000, 0b0100_0000);
        let second = apu.cpu_read(0x4015);
        assert_eq!(second & 0b0100_0000, 0);
    }

    #[test]
    fn dmc_fetch_reports_the_address_it_read_from() {
        let mut apu = Apu::new();
        apu.cpu_write(0x4012, 0x00, 0); // sample address $C000
        apu.cpu_write(0x4013, 0x00, 0); // sample length 1 byte
        apu.cpu_write(0x4015, 0b0001_0000, 0); // enable DMC, triggers restart
        let (_, fetched) = apu.clock(|addr| {
            assert_eq!(addr, 0xC000);
            0xFF
        });
        assert_eq!(fetched, Some(0xC000));
    }

    #[test]
    fn clock_with_mixer_pushes_a_sample() {
        let mut apu = Apu::new();
        let mut mixer = NesSoundMixer::new();
        apu.clock_with_mixer(&mut mixer, silent_reader);
        assert_eq!(mixer.drain().len(), 1);
    }
}
