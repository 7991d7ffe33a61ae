use crate::cpu::{
    micro_op::{MicroOp, empty_micro_fn},
    mnemonic::Mnemonic,
};

impl Mnemonic {
    /// NOP - consumes its cycles and touches nothing else.
    pub(crate) const fn nop() -> &'static [MicroOp] {
        const OP1: MicroOp = MicroOp {
            name: "nop",
            micro_fn: empty_micro_fn,
        };
        &[OP1]
    }

    /// JAM/KIL - the illegal opcode family that locks hardware up by
    /// re-fetching itself forever. `CYCLE_TABLE` maps every JAM opcode to
    /// zero cycles, so the micro-op body itself does nothing; the driver
    /// re-executing the same PC indefinitely is what reproduces the lockup,
    /// with no dedicated halt flag on `Cpu`.
    pub(crate) const fn jam() -> &'static [MicroOp] {
        const OP1: MicroOp = MicroOp {
            name: "jam",
            micro_fn: empty_micro_fn,
        };
        &[OP1]
    }
}
