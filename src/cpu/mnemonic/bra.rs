use crate::cpu::{micro_op::MicroOp, mnemonic::Mnemonic, status::Status};

/// Defines a single-micro-op conditional branch: `cpu.branch()` fires iff
/// `flag`'s presence in the status register equals `branch_when_set`. All
/// eight 6502 branch mnemonics differ only in which flag they test and
/// which polarity they test for, so they share this one shape instead of
/// each re-deriving the same `if cpu.p.contains(...) { cpu.branch() }` body.
macro_rules! branch_on_flag {
    ($name:ident, $op_name:literal, $flag:expr, $branch_when_set:literal) => {
        pub(crate) const fn $name() -> &'static [MicroOp] {
            const OP1: MicroOp = MicroOp {
                name: $op_name,
                micro_fn: |cpu, _| {
                    if cpu.p.contains($flag) == $branch_when_set {
                        cpu.branch();
                    }
                },
            };
            &[OP1]
        }
    };
}

impl Mnemonic {
    // BCC/BCS - branch on the Carry flag clear/set.
    branch_on_flag!(bcc, "bcc", Status::CARRY, false);
    branch_on_flag!(bcs, "bcs", Status::CARRY, true);

    // BNE/BEQ - branch on the Zero flag clear/set.
    branch_on_flag!(bne, "bne", Status::ZERO, false);
    branch_on_flag!(beq, "beq", Status::ZERO, true);

    // BPL/BMI - branch on the Negative flag clear/set.
    branch_on_flag!(bpl, "bpl", Status::NEGATIVE, false);
    branch_on_flag!(bmi, "bmi", Status::NEGATIVE, true);

    // BVC/BVS - branch on the Overflow flag clear/set.
    branch_on_flag!(bvc, "bvc", Status::OVERFLOW, false);
    branch_on_flag!(bvs, "bvs", Status::OVERFLOW, true);
}
