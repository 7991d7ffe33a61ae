use crate::cpu::{
    micro_op::MicroOp,
    mnemonic::Mnemonic,
    status::{BIT_0, BIT_7},
};

/// Shifts/rotates a single byte left by one bit, returning `(new_value,
/// carry_out)`. `carry_in` is unused (ASL always shifts in 0).
const fn shift_left(v: u8, _carry_in: bool) -> (u8, bool) {
    (v << 1, v & BIT_7 != 0)
}

/// Shifts a single byte right by one bit. `carry_in` is unused (LSR always
/// shifts in 0); the result's bit 7 is always clear, so folding N/Z through
/// `Status::set_zn` afterward already reproduces LSR's "N is always reset".
const fn shift_right(v: u8, _carry_in: bool) -> (u8, bool) {
    (v >> 1, v & BIT_0 != 0)
}

/// Rotates a single byte left by one bit through the carry flag.
const fn rotate_left(v: u8, carry_in: bool) -> (u8, bool) {
    ((v << 1) | carry_in as u8, v & BIT_7 != 0)
}

/// Rotates a single byte right by one bit through the carry flag.
const fn rotate_right(v: u8, carry_in: bool) -> (u8, bool) {
    (
        (v >> 1) | if carry_in { BIT_7 } else { 0 },
        v & BIT_0 != 0,
    )
}

/// Defines the three-micro-op `ASL`/`LSR`/`ROL`/`ROR` sequence, which is
/// shared between Accumulator and memory addressing: the decode phase always
/// runs all three micro-ops, and the last one branches on
/// `cpu.opcode_in_flight` to tell which. Accumulator mode burns its read/
/// dummy-write pair on a dummy read of `cpu.pc` instead of `effective_addr`
/// (which is unset for Implied/Accumulator addressing); memory mode performs
/// the classic read-dummy_write-final_write read-modify-write.
macro_rules! shift_or_rotate {
    ($name:ident, $acc_opcode:literal, $prefix:literal, $op:expr) => {
        pub(crate) const fn $name() -> &'static [MicroOp] {
            &[
                MicroOp {
                    name: concat!($prefix, "_read"),
                    micro_fn: |cpu, bus| {
                        cpu.base = bus.mem_read(cpu.effective_addr);
                    },
                },
                MicroOp {
                    name: concat!($prefix, "_dummy_write"),
                    micro_fn: |cpu, bus| {
                        bus.mem_write(cpu.effective_addr, cpu.base);
                    },
                },
                MicroOp {
                    name: concat!($prefix, "_shift"),
                    micro_fn: |cpu, bus| {
                        if cpu.opcode_in_flight == Some($acc_opcode) {
                            let _ = bus.mem_read(cpu.pc);
                            let (new_value, carry_out) = $op(cpu.a, cpu.p.c());
                            cpu.a = new_value;
                            cpu.p.set_c(carry_out);
                            cpu.p.set_zn(cpu.a);
                        } else {
                            let (new_value, carry_out) = $op(cpu.base, cpu.p.c());
                            cpu.base = new_value;
                            cpu.p.set_c(carry_out);
                            cpu.p.set_zn(cpu.base);
                            bus.mem_write(cpu.effective_addr, cpu.base);
                        }
                    },
                },
            ]
        }
    };
}

impl Mnemonic {
    // ASL - arithmetic shift left (Accumulator, Absolute, X-Indexed
    // Absolute, Zero Page, X-Indexed Zero Page). Carry <- bit 7, bit 0 <- 0.
    shift_or_rotate!(asl, 0x0A, "asl", shift_left);
    // LSR - logical shift right (same addressing modes as ASL). Carry <-
    // bit 0, bit 7 <- 0.
    shift_or_rotate!(lsr, 0x4A, "lsr", shift_right);
    // ROL - rotate left through carry (same addressing modes as ASL).
    shift_or_rotate!(rol, 0x2A, "rol", rotate_left);
    // ROR - rotate right through carry (same addressing modes as ASL).
    shift_or_rotate!(ror, 0x6A, "ror", rotate_right);
}

#[cfg(test)]
mod shift_tests {
    use crate::cpu::{
        mnemonic::{Mnemonic, tests::InstrTest},
        status::{BIT_0, BIT_7},
    };

    #[test]
    fn test_asl() {
        InstrTest::new(Mnemonic::ASL).test(|verify, cpu, bus| {
            if cpu.opcode_in_flight == Some(0x0A) {
                let c = verify.cpu.a & BIT_7 != 0;
                assert_eq!(cpu.p.c(), c);
                let v = verify.cpu.a << 1;
                verify.check_nz(cpu.p, v);
            } else {
                let c = verify.m & BIT_7 != 0;
                assert_eq!(cpu.p.c(), c);
                let v = verify.m << 1;
                let m = bus.mem_read(verify.addr);
                assert_eq!(v, m);
                verify.check_nz(cpu.p, v);
            }
        });
    }

    #[test]
    fn test_lsr() {
        InstrTest::new(Mnemonic::LSR).test(|verify, cpu, bus| {
            if cpu.opcode_in_flight == Some(0x4A) {
                // Accumulator mode
                let c = verify.cpu.a & BIT_0 != 0;
                assert_eq!(cpu.p.c(), c);
                let v = verify.cpu.a >> 1;
                verify.check_nz(cpu.p, v);
            } else {
                // Memory mode
                let c = verify.m & BIT_0 != 0;
                assert_eq!(cpu.p.c(), c);
                let v = verify.m >> 1;
                let m = bus.mem_read(verify.addr);
                assert_eq!(v, m);
                verify.check_nz(cpu.p, v);
            }
        });
    }

    #[test]
    fn test_rol() {
        InstrTest::new(Mnemonic::ROL).test(|verify, cpu, bus| {
            if cpu.opcode_in_flight == Some(0x2A) {
                // Accumulator mode
                let c_in = verify.cpu.p.c() as u8;
                let c_out = verify.cpu.a & BIT_7 != 0;
                assert_eq!(cpu.p.c(), c_out);
                let v = (verify.cpu.a << 1) | c_in;
                verify.check_nz(cpu.p, v);
            } else {
                // Memory mode
                let c_in = verify.cpu.p.c() as u8;
                let c_out = verify.m & BIT_7 != 0;
                assert_eq!(cpu.p.c(), c_out);
                let v = (verify.m << 1) | c_in;
                let m = bus.mem_read(verify.addr);
                assert_eq!(v, m);
                verify.check_nz(cpu.p, v);
            }
        });
    }

    #[test]
    fn test_ror() {
        InstrTest::new(Mnemonic::ROR).test(|verify, cpu, bus| {
            if cpu.opcode_in_flight == Some(0x6A) {
                // Accumulator mode
                let c_in = (verify.cpu.p.c() as u8) << 7;
                let c_out = verify.cpu.a & BIT_0 != 0;
                assert_eq!(cpu.p.c(), c_out);
                let v = (verify.cpu.a >> 1) | c_in;
                verify.check_nz(cpu.p, v);
            } else {
                // Memory mode
                let c_in = (verify.cpu.p.c() as u8) << 7;
                let c_out = verify.m & BIT_0 != 0;
                assert_eq!(cpu.p.c(), c_out);
                let v = (verify.m >> 1) | c_in;
                let m = bus.mem_read(verify.addr);
                assert_eq!(v, m);
                verify.check_nz(cpu.p, v);
            }
        });
    }
}
