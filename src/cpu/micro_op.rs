use crate::bus::Bus;
use crate::cpu::Cpu;

/// A single atomic CPU action executed during one clock step of an instruction.
pub(crate) type MicroFn = fn(&mut Cpu, &mut dyn Bus);

/// One step of an instruction's execution, as dispatched by [`crate::cpu::mnemonic::Mnemonic::micro_ops`].
#[derive(Clone, Copy)]
pub(crate) struct MicroOp {
    pub(crate) name: &'static str,
    pub(crate) micro_fn: MicroFn,
}

/// Shared no-op step for mnemonics (and addressing modes) with nothing left to do.
pub(crate) fn empty_micro_fn(_cpu: &mut Cpu, _bus: &mut dyn Bus) {}
