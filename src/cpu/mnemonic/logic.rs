use crate::cpu::{
    micro_op::MicroOp,
    mnemonic::Mnemonic,
    status::{BIT_6, BIT_7},
};

/// Defines a single-micro-op bitwise accumulator op: read `M`, fold it into
/// `A` with `op`, set N/Z from the result. `AND`/`EOR`/`ORA` differ only in
/// which bitwise operator they apply.
macro_rules! bitwise_accumulator_op {
    ($name:ident, $op_name:literal, $op:tt) => {
        pub(crate) const fn $name() -> &'static [MicroOp] {
            const OP1: MicroOp = MicroOp {
                name: $op_name,
                micro_fn: |cpu, bus| {
                    let m = bus.mem_read(cpu.effective_addr);
                    cpu.a $op m;
                    cpu.p.set_zn(cpu.a);
                },
            };
            &[OP1]
        }
    };
}

impl Mnemonic {
    // AND - bitwise AND of the accumulator with memory (A & M -> A).
    bitwise_accumulator_op!(and, "and", &=);
    // EOR - bitwise exclusive-OR of the accumulator with memory (A ^ M -> A).
    bitwise_accumulator_op!(eor, "eor", ^=);
    // ORA - bitwise inclusive-OR of the accumulator with memory (A | M -> A).
    bitwise_accumulator_op!(ora, "ora", |=);

    /// BIT - tests bits in memory against the accumulator without storing a
    /// result: Z from `A & M`, N from bit 7 of `M`, V from bit 6 of `M`.
    pub(crate) const fn bit() -> &'static [MicroOp] {
        &[MicroOp {
            name: "bit",
            micro_fn: |cpu, bus| {
                let m = bus.mem_read(cpu.effective_addr);
                let and = cpu.a & m;
                cpu.p.set_z(and == 0);
                cpu.p.set_n(m & BIT_7 != 0);
                cpu.p.set_v(m & BIT_6 != 0);
            },
        }]
    }
}

#[cfg(test)]
mod logic_tests {
    use crate::cpu::{
        mnemonic::{Mnemonic, tests::InstrTest},
        status::{BIT_6, BIT_7},
    };

    #[test]
    fn test_and() {
        InstrTest::new(Mnemonic::AND).test(|verify, cpu, _| {
            let v = verify.cpu.a & verify.m;
            assert_eq!(cpu.a, v);
            verify.check_nz(cpu.p, v);
        });
    }

    #[test]
    fn test_eor() {
        InstrTest::new(Mnemonic::EOR).test(|verify, cpu, _| {
            let v = verify.cpu.a ^ verify.m;
            assert_eq!(cpu.a, v);
            verify.check_nz(cpu.p, v);
        });
    }

    #[test]
    fn test_ora() {
        InstrTest::new(Mnemonic::ORA).test(|verify, cpu, _| {
            let v = verify.cpu.a | verify.m;
            assert_eq!(cpu.a, v);
            verify.check_nz(cpu.p, v);
        });
    }

    #[test]
    fn test_bit() {
        InstrTest::new(Mnemonic::BIT).test(|verify, cpu, _| {
            // Z flag is set if (A & M) == 0
            let z = (verify.cpu.a & verify.m) == 0;
            assert_eq!(cpu.p.z(), z);

            // N flag = bit 7 of memory operand
            assert_eq!(cpu.p.n(), verify.m & BIT_7 != 0);

            // V flag = bit 6 of memory operand
            assert_eq!(cpu.p.v(), verify.m & BIT_6 != 0);
        });
    }
}
