//! Whole-console snapshot: clones every stateful component wholesale rather
//! than splitting them into per-field deltas. RAM, VRAM, the cartridge and
//! its mapper are all cheap enough to clone outright for a single console.

use std::fmt;

use crate::apu::Apu;
use crate::bus::OpenBus;
use crate::cartridge::Cartridge;
use crate::controller::{Controller, SerialLogger};
use crate::cpu::Cpu;
use crate::mem_block::cpu as cpu_ram;
use crate::nes::Nes;
use crate::ppu::Ppu;
use crate::state::{SaveState, Snapshot, SnapshotMeta};

/// Reasons a [`Nes`] snapshot can fail to load.
#[derive(Debug)]
pub enum NesSaveStateError {
    /// The snapshot's mapper doesn't match the cartridge currently inserted.
    MapperMismatch { expected: u16, found: u16 },
}

impl fmt::Display for NesSaveStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MapperMismatch { expected, found } => {
                write!(f, "snapshot mapper {expected} doesn't match loaded mapper {found}")
            }
        }
    }
}

impl std::error::Error for NesSaveStateError {}

/// Full console state: every component cloned as-is.
#[derive(Clone)]
pub struct NesState {
    cpu: Cpu,
    ram: cpu_ram::Ram,
    ppu: Ppu,
    apu: Apu,
    cartridge: Option<Cartridge>,
    controllers: [Controller; 2],
    serial_log: SerialLogger,
    oam_dma_request: Option<u8>,
    open_bus: OpenBus,
    cycles: u64,
    master_clock: u64,
}

impl SaveState for Nes {
    type State = NesState;
    type Error = NesSaveStateError;
    type Meta = SnapshotMeta;

    fn save(&self, meta: Self::Meta) -> Result<Snapshot<Self::State, Self::Meta>, Self::Error> {
        let data = NesState {
            cpu: self.cpu,
            ram: self.ram.clone(),
            ppu: self.ppu.clone(),
            apu: self.apu.clone(),
            cartridge: self.cartridge.clone(),
            controllers: self.controllers,
            serial_log: self.serial_log.clone(),
            oam_dma_request: self.oam_dma_request,
            open_bus: self.open_bus.clone(),
            cycles: self.cycles,
            master_clock: self.master_clock,
        };
        Ok(Snapshot { meta, data })
    }

    fn load(&mut self, snapshot: &Snapshot<Self::State, Self::Meta>) -> Result<(), Self::Error> {
        if let (Some(expected), Some(found)) = (
            snapshot.data.cartridge.as_ref().map(|c| c.header().mapper()),
            self.cartridge.as_ref().map(|c| c.header().mapper()),
        ) {
            if expected != found {
                return Err(NesSaveStateError::MapperMismatch { expected, found });
            }
        }

        let data = snapshot.data.clone();
        self.cpu = data.cpu;
        self.ram = data.ram;
        self.ppu = data.ppu;
        self.apu = data.apu;
        self.cartridge = data.cartridge;
        self.controllers = data.controllers;
        self.serial_log = data.serial_log;
        self.oam_dma_request = data.oam_dma_request;
        self.open_bus = data.open_bus;
        self.cycles = data.cycles;
        self.master_clock = data.master_clock;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reset_kind::ResetKind;

    fn nrom_test_rom() -> Vec<u8> {
        let mut rom = vec![0u8; 16 + 16 * 1024 + 8 * 1024];
        rom[0..4].copy_from_slice(b"NES\x1a");
        rom[4] = 1;
        rom[5] = 1;
        let reset_vector = 16 + 0x7FFC;
        rom[reset_vector] = 0x00;
        rom[reset_vector + 1] = 0x80;
        rom
    }

    #[test]
    fn save_then_load_restores_cpu_registers() {
        let mut nes = Nes::default();
        nes.load_rom(&nrom_test_rom()).unwrap();
        nes.reset(ResetKind::PowerOn);

        let snapshot = nes.save(SnapshotMeta::default()).unwrap();
        let pc_at_capture = nes.cpu_snapshot().pc;

        nes.run_frame(false);
        assert_ne!(nes.cpu_snapshot().pc, pc_at_capture, "sanity: the CPU actually moved");

        nes.load(&snapshot).unwrap();
        assert_eq!(nes.cpu_snapshot().pc, pc_at_capture);
    }

    /// Builds a cartridge whose header reports `mapper_id`, regardless of
    /// which mapper implementation actually backs it. Good enough to
    /// exercise the header-comparison in [`Nes::load`] without needing a
    /// second real mapper implementation.
    fn cartridge_tagged_as_mapper(mapper_id: u8) -> Cartridge {
        let mut rom = nrom_test_rom();
        rom[6] = (rom[6] & 0x0F) | (mapper_id << 4);
        let header = crate::cartridge::header::Header::parse(&rom[..16]).unwrap();
        let prg_rom = std::borrow::Cow::Owned(rom[16..16 + 16 * 1024].to_vec());
        let chr_rom = std::borrow::Cow::Owned(rom[16 + 16 * 1024..].to_vec());
        let mapper = Box::new(crate::cartridge::mapper::mapper0::Mapper0::new(
            header, prg_rom, chr_rom, None,
        ));
        Cartridge::new(header, mapper)
    }

    #[test]
    fn loading_a_snapshot_with_a_different_mapper_fails() {
        let mut nes = Nes::default();
        nes.insert_cartridge(cartridge_tagged_as_mapper(0));
        let snapshot = nes.save(SnapshotMeta::default()).unwrap();

        let mut other = Nes::default();
        other.insert_cartridge(cartridge_tagged_as_mapper(1));

        assert!(matches!(
            other.load(&snapshot),
            Err(NesSaveStateError::MapperMismatch { .. })
        ));
    }
}
