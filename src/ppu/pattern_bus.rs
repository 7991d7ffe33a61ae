use crate::cartridge::{Cartridge, header::Mirroring};

/// Temporary view that lets the PPU reach the cartridge CHR space without storing a raw pointer.
///
/// The bus creates one of these per PPU call, so lifetimes remain explicit and borrow-checked.
#[derive(Default)]
pub struct PpuBus<'a> {
    cartridge: Option<&'a mut Cartridge>,
    /// Snapshot of the current CPU bus cycle when this view was created.
    cpu_cycle: u64,
}

impl<'a> PpuBus<'a> {
    pub fn new(cartridge: Option<&'a mut Cartridge>, cpu_cycle: u64) -> Self {
        Self {
            cartridge,
            cpu_cycle,
        }
    }

    pub fn cpu_cycle(&self) -> u64 {
        self.cpu_cycle
    }

    /// CHR bus read ($0000-$1FFF). Returns `None` with no cartridge inserted.
    pub fn chr_read(&self, addr: u16) -> Option<u8> {
        self.cartridge.as_deref().and_then(|cart| cart.ppu_read(addr))
    }

    /// CHR bus write ($0000-$1FFF) for CHR RAM mappers. No-op with no cartridge inserted.
    pub fn chr_write(&mut self, addr: u16, value: u8) {
        if let Some(cart) = self.cartridge.as_deref_mut() {
            cart.ppu_write(addr, value);
        }
    }

    /// Nametable mirroring mode, defaulting to horizontal when no cartridge is inserted.
    pub fn mirroring(&self) -> Mirroring {
        self.cartridge
            .as_deref()
            .map(|cart| cart.mirroring())
            .unwrap_or(Mirroring::Horizontal)
    }
}
