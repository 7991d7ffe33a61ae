//! Shared length counter used by the pulse, triangle, and noise channels.

use super::tables::LENGTH_TABLE;

#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub(super) struct LengthCounter {
    value: u8,
    halt: bool,
}

impl LengthCounter {
    pub(super) fn clear(&mut self) {
        self.value = 0;
    }

    pub(super) fn active(&self) -> bool {
        self.value > 0
    }

    pub(super) fn load(&mut self, index: u8, enabled: bool) {
        if enabled {
            self.value = LENGTH_TABLE[index as usize];
        }
    }

    /// The halt flag is the channel's own control-register bit (loop flag for
    /// pulse/noise, the control flag for triangle); it takes effect immediately.
    pub(super) fn set_halt(&mut self, halt: bool) {
        self.halt = halt;
    }

    pub(super) fn clock(&mut self) {
        if self.value > 0 && !self.halt {
            self.value -= 1;
        }
    }
}
