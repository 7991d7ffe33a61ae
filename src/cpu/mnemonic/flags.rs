use crate::cpu::{micro_op::MicroOp, mnemonic::Mnemonic};

/// Defines a single-micro-op status-flag set/clear: `CLC`/`CLD`/`CLV`/`SEC`/
/// `SED` each just write one literal bool into one `Status` bit and touch
/// nothing else. `CLI`/`SEI` are intentionally not part of this family: the
/// 6502's one-instruction IRQ-servicing delay around an I-flag change means
/// they also need to stage `irq_inhibit_next`/`allow_irq_once`.
macro_rules! set_flag {
    ($name:ident, $op_name:literal, $setter:ident, $value:literal) => {
        pub(crate) const fn $name() -> &'static [MicroOp] {
            const OP1: MicroOp = MicroOp {
                name: $op_name,
                micro_fn: |cpu, _| cpu.p.$setter($value),
            };
            &[OP1]
        }
    };
}

impl Mnemonic {
    // CLC - clears the Carry flag.
    set_flag!(clc, "clc_clear_carry", set_c, false);
    // CLD - clears the Decimal Mode flag (indeterminate after reset on real hardware).
    set_flag!(cld, "cld_clear_decimal", set_d, false);
    // CLV - clears the Overflow flag.
    set_flag!(clv, "clv_clear_overflow", set_v, false);
    // SEC - sets the Carry flag.
    set_flag!(sec, "sec_set_carry", set_c, true);
    // SED - sets the Decimal Mode flag.
    set_flag!(sed, "sed_set_decimal", set_d, true);

    /// CLI - clears the Interrupt Disable flag. When interrupts were
    /// previously disabled, the 6502 delays servicing a pending IRQ until
    /// after the next instruction completes; modeled with a one-boundary
    /// suppression flag plus an I-flag pipeline update.
    pub(crate) const fn cli() -> &'static [MicroOp] {
        &[MicroOp {
            name: "cli_clear_interrupt",
            micro_fn: |cpu, _| {
                let was_disabled = cpu.p.i();
                cpu.queue_i_update(false);
                if was_disabled {
                    cpu.irq_inhibit_next = true;
                }
            },
        }]
    }

    /// SEI - sets the Interrupt Disable flag. If interrupts were previously
    /// enabled when SEI executes, a pending IRQ is still allowed to fire
    /// just after SEI; approximated with a one-shot override that permits a
    /// single IRQ even though I is now set.
    pub(crate) const fn sei() -> &'static [MicroOp] {
        &[MicroOp {
            name: "sei_set_interrupt",
            micro_fn: |cpu, _| {
                let was_enabled = !cpu.p.i();
                cpu.queue_i_update(true);
                if was_enabled {
                    cpu.allow_irq_once = true;
                }
            },
        }]
    }
}

#[cfg(test)]
mod flags_test {
    use crate::cpu::mnemonic::{Mnemonic, tests::InstrTest};

    #[test]
    fn test_clc() {
        InstrTest::new(Mnemonic::CLC).test(|_, cpu, _| {
            assert!(!cpu.p.c(), "Carry flag should be cleared");
        });
    }

    #[test]
    fn test_cld() {
        InstrTest::new(Mnemonic::CLD).test(|_, cpu, _| {
            assert!(!cpu.p.d(), "Decimal Mode flag should be cleared");
        });
    }

    #[test]
    fn test_cli() {
        InstrTest::new(Mnemonic::CLI).test(|_, cpu, _| {
            assert!(!cpu.p.i(), "Interrupt Disable flag should be cleared");
        });
    }

    #[test]
    fn test_clv() {
        InstrTest::new(Mnemonic::CLV).test(|_, cpu, _| {
            assert!(!cpu.p.v(), "Overflow flag should be cleared");
        });
    }

    #[test]
    fn test_sec() {
        InstrTest::new(Mnemonic::SEC).test(|_, cpu, _| {
            assert!(cpu.p.c(), "Carry flag should be set");
        });
    }

    #[test]
    fn test_sed() {
        InstrTest::new(Mnemonic::SED).test(|_, cpu, _| {
            assert!(cpu.p.d(), "Decimal Mode flag should be set");
        });
    }

    #[test]
    fn test_sei() {
        InstrTest::new(Mnemonic::SEI).test(|_, cpu, _| {
            assert!(cpu.p.i(), "Interrupt Disable flag should be set");
        });
    }
}
