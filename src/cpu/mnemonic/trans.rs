use crate::cpu::micro_op::MicroOp;
use crate::cpu::mnemonic::Mnemonic;

impl Mnemonic {
    /// NV-BDIZC
    /// --------
    ///
    /// SHS - Transfer Accumulator "AND" Index Register X to Stack Pointer then Store Stack Pointer "AND" Hi-Byte In Memory
    /// Operation: A ∧ X → S, S ∧ (H + 1) → M
    ///
    /// The undocumented SHS instruction performs a bit-by-bit AND operation of the
    /// value of the accumulator and the value of the index register X and stores
    /// the result in the stack pointer. It then performs a bit-by-bit AND operation
    /// of the resulting stack pointer and the upper 8 bits of the given address
    /// (ignoring the addressing mode's Y offset), plus 1, and transfers the result
    /// to the addressed memory location.
    ///
    /// No flags or registers in the microprocessor are affected by the store
    /// operation.
    ///
    /// Addressing Mode     | Assembly Language Form | Opcode | No. Bytes | No. Cycles
    /// ------------------- | ------------------------ | ------ | --------- | ----------
    /// Y-Indexed Absolute  | SHS $nnnn,Y              | $9B*   | 3         | 5
    ///
    /// *Undocumented.
    pub(crate) const fn shs() -> &'static [MicroOp] {
        &[MicroOp {
            name: "shs",
            micro_fn: |cpu, bus| {
                let s = cpu.a & cpu.x;
                cpu.s = s;
                let m = s & cpu.base.wrapping_add(1);
                bus.mem_write(cpu.effective_addr, m);
            },
        }]
    }

    /// NV-BDIZC
    /// ✓-----✓-
    ///
    /// TAX - Transfer Accumulator To Index X
    /// Operation: A → X
    ///
    /// Addressing Mode | Assembly Language Form | Opcode | No. Bytes | No. Cycles
    /// --------------- | ------------------------ | ------ | --------- | ----------
    /// Implied         | TAX                      | $AA    | 1         | 2
    pub(crate) const fn tax() -> &'static [MicroOp] {
        &[MicroOp {
            name: "tax",
            micro_fn: |cpu, bus| {
                bus.internal_cycle();
                cpu.x = cpu.a;
                cpu.p.set_zn(cpu.x);
            },
        }]
    }

    /// NV-BDIZC
    /// ✓-----✓-
    ///
    /// TAY - Transfer Accumulator To Index Y
    /// Operation: A → Y
    ///
    /// Addressing Mode | Assembly Language Form | Opcode | No. Bytes | No. Cycles
    /// --------------- | ------------------------ | ------ | --------- | ----------
    /// Implied         | TAY                      | $A8    | 1         | 2
    pub(crate) const fn tay() -> &'static [MicroOp] {
        &[MicroOp {
            name: "tay",
            micro_fn: |cpu, bus| {
                bus.internal_cycle();
                cpu.y = cpu.a;
                cpu.p.set_zn(cpu.y);
            },
        }]
    }

    /// NV-BDIZC
    /// ✓-----✓-
    ///
    /// TSX - Transfer Stack Pointer To Index X
    /// Operation: S → X
    ///
    /// Addressing Mode | Assembly Language Form | Opcode | No. Bytes | No. Cycles
    /// --------------- | ------------------------ | ------ | --------- | ----------
    /// Implied         | TSX                      | $BA    | 1         | 2
    pub(crate) const fn tsx() -> &'static [MicroOp] {
        &[MicroOp {
            name: "tsx",
            micro_fn: |cpu, bus| {
                bus.internal_cycle();
                cpu.x = cpu.s;
                cpu.p.set_zn(cpu.x);
            },
        }]
    }

    /// NV-BDIZC
    /// ✓-----✓-
    ///
    /// TXA - Transfer Index X To Accumulator
    /// Operation: X → A
    ///
    /// Addressing Mode | Assembly Language Form | Opcode | No. Bytes | No. Cycles
    /// --------------- | ------------------------ | ------ | --------- | ----------
    /// Implied         | TXA                      | $8A    | 1         | 2
    pub(crate) const fn txa() -> &'static [MicroOp] {
        &[MicroOp {
            name: "txa",
            micro_fn: |cpu, bus| {
                bus.internal_cycle();
                cpu.a = cpu.x;
                cpu.p.set_zn(cpu.a);
            },
        }]
    }

    /// NV-BDIZC
    /// --------
    ///
    /// TXS - Transfer Index X To Stack Pointer
    /// Operation: X → S
    ///
    /// TXS changes only the stack pointer. It does not affect any of the flags.
    ///
    /// Addressing Mode | Assembly Language Form | Opcode | No. Bytes | No. Cycles
    /// --------------- | ------------------------ | ------ | --------- | ----------
    /// Implied         | TXS                      | $9A    | 1         | 2
    pub(crate) const fn txs() -> &'static [MicroOp] {
        &[MicroOp {
            name: "txs",
            micro_fn: |cpu, bus| {
                bus.internal_cycle();
                cpu.s = cpu.x;
            },
        }]
    }

    /// NV-BDIZC
    /// ✓-----✓-
    ///
    /// TYA - Transfer Index Y To Accumulator
    /// Operation: Y → A
    ///
    /// Addressing Mode | Assembly Language Form | Opcode | No. Bytes | No. Cycles
    /// --------------- | ------------------------ | ------ | --------- | ----------
    /// Implied         | TYA                      | $98    | 1         | 2
    pub(crate) const fn tya() -> &'static [MicroOp] {
        &[MicroOp {
            name: "tya",
            micro_fn: |cpu, bus| {
                bus.internal_cycle();
                cpu.a = cpu.y;
                cpu.p.set_zn(cpu.a);
            },
        }]
    }
}

#[cfg(test)]
mod trans_tests {
    use crate::cpu::mnemonic::{Mnemonic, tests::InstrTest};

    #[test]
    fn test_shs() {
        InstrTest::new(Mnemonic::SHS).test(|verify, cpu, bus| {
            let v = verify.cpu.a & verify.cpu.x;
            assert_eq!(cpu.s, v);
            let v = v & verify.addr_hi.wrapping_add(1);
            let m = bus.mem_read(verify.addr);
            assert_eq!(v, m);
        });
    }

    #[test]
    fn test_tax() {
        InstrTest::new(Mnemonic::TAX).test(|verify, cpu, _| {
            let v = verify.cpu.a;
            assert_eq!(cpu.x, v);
            verify.check_nz(cpu.p, v);
        });
    }

    #[test]
    fn test_tay() {
        InstrTest::new(Mnemonic::TAY).test(|verify, cpu, _| {
            let v = verify.cpu.a;
            assert_eq!(cpu.y, v);
            verify.check_nz(cpu.p, v);
        });
    }

    #[test]
    fn test_tsx() {
        InstrTest::new(Mnemonic::TSX).test(|verify, cpu, _| {
            let v = verify.cpu.s;
            assert_eq!(cpu.x, v);
            verify.check_nz(cpu.p, v);
        });
    }

    #[test]
    fn test_txa() {
        InstrTest::new(Mnemonic::TXA).test(|verify, cpu, _| {
            let v = verify.cpu.x;
            assert_eq!(cpu.a, v);
            verify.check_nz(cpu.p, v);
        });
    }

    #[test]
    fn test_txs() {
        InstrTest::new(Mnemonic::TXS).test(|verify, cpu, _| {
            let v = verify.cpu.x;
            assert_eq!(cpu.s, v);
        });
    }

    #[test]
    fn test_tya() {
        InstrTest::new(Mnemonic::TYA).test(|verify, cpu, _| {
            let v = verify.cpu.y;
            assert_eq!(cpu.a, v);
            verify.check_nz(cpu.p, v);
        });
    }
}
