use crate::{
    apu::Apu, cartridge::Cartridge, controller::ControllerPorts, mem_block::cpu as cpu_ram, memory,
    ppu::Ppu,
};

pub mod cpu;
#[cfg(test)]
pub(crate) mod mock;
pub(crate) mod open_bus;
pub(crate) mod savestate;

pub use cpu::CpuBus;
pub(crate) use open_bus::OpenBus;

/// Expose the CPU stack page start address for stack helpers.
pub(crate) const STACK_ADDR: u16 = memory::cpu::STACK_PAGE_START;

/// Everything the CPU core needs from the system it is wired into.
///
/// Implemented by [`CpuBus`] for real emulation and by a `MockBus` in
/// instruction-level unit tests, so the `cpu` module never depends on
/// PPU/APU/cartridge types directly.
pub(crate) trait Bus {
    /// Reads a byte and advances any bus-visible side effects (PPU/APU
    /// clocking, open-bus latch, mapper IRQ state) that a real CPU read
    /// cycle would trigger.
    fn mem_read(&mut self, addr: u16) -> u8;

    fn mem_write(&mut self, addr: u16, data: u8);

    /// Reads a byte without any side effects, for debugger/disassembler use.
    fn peek(&mut self, addr: u16) -> u8 {
        self.mem_read(addr)
    }

    /// Consumes one CPU cycle without an associated memory access.
    fn internal_cycle(&mut self);

    /// Edge-triggered NMI line; returns `true` exactly once per assertion.
    fn nmi_line(&mut self) -> bool {
        false
    }

    fn irq_pending(&mut self) -> bool {
        false
    }

    fn clear_irq(&mut self) {}

    fn ppu_read(&mut self, addr: u16) -> u8 {
        self.mem_read(addr)
    }

    fn ppu_write(&mut self, addr: u16, value: u8) {
        self.mem_write(addr, value);
    }

    fn take_oam_dma_request(&mut self) -> Option<u8> {
        None
    }

    fn cycles(&self) -> u64 {
        0
    }
}

/// Immutable view of the hardware attached to the CPU bus.
pub struct BusDevices<'a> {
    pub ram: &'a cpu_ram::Ram,
    pub ppu: &'a Ppu,
    pub apu: &'a Apu,
    pub cartridge: Option<&'a Cartridge>,
    pub controllers: &'a ControllerPorts,
}

/// Mutable view of the hardware attached to the CPU bus.
pub struct BusDevicesMut<'a> {
    pub ram: &'a mut cpu_ram::Ram,
    pub ppu: &'a mut Ppu,
    pub apu: &'a mut Apu,
    pub cartridge: Option<&'a mut Cartridge>,
    pub controllers: &'a mut ControllerPorts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum DmcDmaEvent {
    Request { addr: u16 },
    Abort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct PendingDma {
    pub oam_page: Option<u8>,
    pub dmc: Option<DmcDmaEvent>,
}
