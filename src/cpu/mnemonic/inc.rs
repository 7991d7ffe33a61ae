use crate::cpu::{micro_op::MicroOp, mnemonic::Mnemonic};

/// Defines a single-micro-op `INX`/`INY`/`DEX`/`DEY`-shaped register bump:
/// read the register, apply `wrapping_add`/`wrapping_sub` by one, set N/Z.
/// None of the four touch the carry or overflow flags.
macro_rules! bump_register {
    ($name:ident, $op_name:literal, $field:ident, $step:ident) => {
        pub(crate) const fn $name() -> &'static [MicroOp] {
            const OP1: MicroOp = MicroOp {
                name: $op_name,
                micro_fn: |cpu, _| {
                    cpu.$field = cpu.$field.$step(1);
                    cpu.p.set_zn(cpu.$field);
                },
            };
            &[OP1]
        }
    };
}

/// Defines the three-micro-op `INC`/`DEC` read-modify-write sequence against
/// memory: read the old value, dummy-write it back (the extra RMW cycle real
/// 6502 hardware burns), then write the incremented/decremented value and
/// update N/Z. Carry and overflow are untouched.
macro_rules! bump_memory {
    ($name:ident, $read:literal, $calc:literal, $write:literal, $step:ident) => {
        pub(crate) const fn $name() -> &'static [MicroOp] {
            &[
                MicroOp {
                    name: $read,
                    micro_fn: |cpu, bus| {
                        cpu.base = bus.mem_read(cpu.effective_addr);
                    },
                },
                MicroOp {
                    name: $calc,
                    micro_fn: |cpu, bus| {
                        bus.mem_write(cpu.effective_addr, cpu.base);
                        cpu.base = cpu.base.$step(1);
                    },
                },
                MicroOp {
                    name: $write,
                    micro_fn: |cpu, bus| {
                        let new_value = cpu.base;
                        bus.mem_write(cpu.effective_addr, new_value);
                        cpu.p.set_zn(new_value);
                    },
                },
            ]
        }
    };
}

impl Mnemonic {
    // DEC - decrements the addressed memory location by one (Absolute,
    // X-Indexed Absolute, Zero Page, X-Indexed Zero Page).
    bump_memory!(
        dec,
        "dec_read_old",
        "dec_dummy_write_calc",
        "dec_final_write_flags",
        wrapping_sub
    );

    // DEX/DEY - decrement the X/Y index register by one.
    bump_register!(dex, "dex", x, wrapping_sub);
    bump_register!(dey, "dey", y, wrapping_sub);

    // INC - increments the addressed memory location by one (same
    // addressing modes as DEC).
    bump_memory!(
        inc,
        "inc_read_old",
        "inc_dummy_write_calc",
        "inc_final_write_flags",
        wrapping_add
    );

    // INX/INY - increment the X/Y index register by one.
    bump_register!(inx, "inx", x, wrapping_add);
    bump_register!(iny, "iny", y, wrapping_add);
}

#[cfg(test)]
mod inc_tests {
    use crate::cpu::{
        mnemonic::{Mnemonic, tests::InstrTest},
        status::BIT_7,
    };

    #[test]
    fn test_dec() {
        InstrTest::new(Mnemonic::DEC).test(|verify, cpu, bus| {
            let expected_value = verify.m.wrapping_sub(1);

            assert_eq!(
                bus.mem_read(verify.addr),
                expected_value,
                "Memory was not decremented correctly"
            );

            assert_eq!(cpu.p.z(), expected_value == 0, "Zero flag mismatch");
            assert_eq!(
                cpu.p.n(),
                expected_value & BIT_7 != 0,
                "Negative flag mismatch"
            );

            verify.check_nz(cpu.p, expected_value);
        });
    }

    #[test]
    fn test_dex() {
        InstrTest::new(Mnemonic::DEX).test(|verify, cpu, _| {
            let expected_x = verify.cpu.x.wrapping_sub(1);

            assert_eq!(
                cpu.x, expected_x,
                "X register was not decremented correctly"
            );

            assert_eq!(cpu.p.z(), expected_x == 0, "Zero flag mismatch");
            assert_eq!(cpu.p.n(), expected_x & BIT_7 != 0, "Negative flag mismatch");

            verify.check_nz(cpu.p, expected_x);
        });
    }

    #[test]
    fn test_dey() {
        InstrTest::new(Mnemonic::DEY).test(|verify, cpu, _| {
            let expected_y = verify.cpu.y.wrapping_sub(1);

            assert_eq!(
                cpu.y, expected_y,
                "Y register was not decremented correctly"
            );

            assert_eq!(cpu.p.z(), expected_y == 0, "Zero flag mismatch");
            assert_eq!(cpu.p.n(), expected_y & BIT_7 != 0, "Negative flag mismatch");

            verify.check_nz(cpu.p, expected_y);
        });
    }

    #[test]
    fn test_inc() {
        InstrTest::new(Mnemonic::INC).test(|verify, cpu, bus| {
            let expected_value = verify.m.wrapping_add(1);

            assert_eq!(
                bus.mem_read(verify.addr),
                expected_value,
                "Memory was not incremented correctly"
            );

            assert_eq!(cpu.p.z(), expected_value == 0, "Zero flag mismatch");
            assert_eq!(
                cpu.p.n(),
                expected_value & BIT_7 != 0,
                "Negative flag mismatch"
            );

            verify.check_nz(cpu.p, expected_value);
        });
    }

    #[test]
    fn test_inx() {
        InstrTest::new(Mnemonic::INX).test(|verify, cpu, _| {
            let expected_x = verify.cpu.x.wrapping_add(1);

            assert_eq!(
                cpu.x, expected_x,
                "X register was not incremented correctly"
            );

            assert_eq!(cpu.p.z(), expected_x == 0, "Zero flag mismatch");
            assert_eq!(cpu.p.n(), expected_x & BIT_7 != 0, "Negative flag mismatch");

            verify.check_nz(cpu.p, expected_x);
        });
    }

    #[test]
    fn test_iny() {
        InstrTest::new(Mnemonic::INY).test(|verify, cpu, _| {
            let expected_y = verify.cpu.y.wrapping_add(1);

            assert_eq!(
                cpu.y, expected_y,
                "Y register was not incremented correctly"
            );

            assert_eq!(cpu.p.z(), expected_y == 0, "Zero flag mismatch");
            assert_eq!(cpu.p.n(), expected_y & BIT_7 != 0, "Negative flag mismatch");

            verify.check_nz(cpu.p, expected_y);
        });
    }
}
