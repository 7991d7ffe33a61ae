use std::convert::Infallible;

use crate::cpu::Cpu;
use crate::state::{SaveState, Snapshot};

/// `SaveState` for the CPU just clones the whole (small, `Copy`) struct.
impl SaveState for Cpu {
    type State = Cpu;
    type Error = Infallible;
    type Meta = crate::state::SnapshotMeta;

    fn save(&self, meta: Self::Meta) -> Result<Snapshot<Self::State, Self::Meta>, Self::Error> {
        Ok(Snapshot { meta, data: *self })
    }

    fn load(&mut self, snapshot: &Snapshot<Self::State, Self::Meta>) -> Result<(), Self::Error> {
        *self = snapshot.data;
        Ok(())
    }
}
