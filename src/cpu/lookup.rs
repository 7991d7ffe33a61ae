use crate::cpu::addressing::Addressing as A;
use crate::cpu::instruction::Instruction as I;

// Short aliases for addressing modes (to keep the 16x16 table readable)
const IMP: A = A::Implied;
const ACC: A = A::Accumulator;
const IMM: A = A::Immediate;
const REL: A = A::Relative;
const ZP: A = A::ZeroPage;
const ZPX: A = A::ZeroPageX;
const ZPY: A = A::ZeroPageY;
const ABS: A = A::Absolute;
const ABX: A = A::AbsoluteX;
const ABY: A = A::AbsoluteY;
const IND: A = A::Indirect;
const INX: A = A::IndirectX;
const INY: A = A::IndirectY;

macro_rules! op {
    ($ins:ident, $addr:ident, $opcode:expr) => {
        I::$ins($addr, $opcode)
    };
}

#[rustfmt::skip]
pub(crate) static LOOKUP_TABLE: [I; 256] = [
    op!(brk, IMP, 0x00), op!(ora, INX, 0x01), op!(jam, IMP, 0x02), op!(slo, INX, 0x03),
    op!(nop, ZP, 0x04), op!(ora, ZP, 0x05), op!(asl, ZP, 0x06), op!(slo, ZP, 0x07),
    op!(php, IMP, 0x08), op!(ora, IMM, 0x09), op!(asl, ACC, 0x0A), op!(anc, IMM, 0x0B),
    op!(nop, ABS, 0x0C), op!(ora, ABS, 0x0D), op!(asl, ABS, 0x0E), op!(slo, ABS, 0x0F),
    op!(bpl, REL, 0x10), op!(ora, INY, 0x11), op!(jam, IMP, 0x12), op!(slo, INY, 0x13),
    op!(nop, ZPX, 0x14), op!(ora, ZPX, 0x15), op!(asl, ZPX, 0x16), op!(slo, ZPX, 0x17),
    op!(clc, IMP, 0x18), op!(ora, ABY, 0x19), op!(nop, IMP, 0x1A), op!(slo, ABY, 0x1B),
    op!(nop, ABX, 0x1C), op!(ora, ABX, 0x1D), op!(asl, ABX, 0x1E), op!(slo, ABX, 0x1F),
    op!(jsr, ABS, 0x20), op!(and, INX, 0x21), op!(jam, IMP, 0x22), op!(rla, INX, 0x23),
    op!(bit, ZP, 0x24), op!(and, ZP, 0x25), op!(rol, ZP, 0x26), op!(rla, ZP, 0x27),
    op!(plp, IMP, 0x28), op!(and, IMM, 0x29), op!(rol, ACC, 0x2A), op!(anc, IMM, 0x2B),
    op!(bit, ABS, 0x2C), op!(and, ABS, 0x2D), op!(rol, ABS, 0x2E), op!(rla, ABS, 0x2F),
    op!(bmi, REL, 0x30), op!(and, INY, 0x31), op!(jam, IMP, 0x32), op!(rla, INY, 0x33),
    op!(nop, ZPX, 0x34), op!(and, ZPX, 0x35), op!(rol, ZPX, 0x36), op!(rla, ZPX, 0x37),
    op!(sec, IMP, 0x38), op!(and, ABY, 0x39), op!(nop, IMP, 0x3A), op!(rla, ABY, 0x3B),
    op!(nop, ABX, 0x3C), op!(and, ABX, 0x3D), op!(rol, ABX, 0x3E), op!(rla, ABX, 0x3F),
    op!(rti, IMP, 0x40), op!(eor, INX, 0x41), op!(jam, IMP, 0x42), op!(sre, INX, 0x43),
    op!(nop, ZP, 0x44), op!(eor, ZP, 0x45), op!(lsr, ZP, 0x46), op!(sre, ZP, 0x47),
    op!(pha, IMP, 0x48), op!(eor, IMM, 0x49), op!(lsr, ACC, 0x4A), op!(asr, IMM, 0x4B),
    op!(jmp, ABS, 0x4C), op!(eor, ABS, 0x4D), op!(lsr, ABS, 0x4E), op!(sre, ABS, 0x4F),
    op!(bvc, REL, 0x50), op!(eor, INY, 0x51), op!(jam, IMP, 0x52), op!(sre, INY, 0x53),
    op!(nop, ZPX, 0x54), op!(eor, ZPX, 0x55), op!(lsr, ZPX, 0x56), op!(sre, ZPX, 0x57),
    op!(cli, IMP, 0x58), op!(eor, ABY, 0x59), op!(nop, IMP, 0x5A), op!(sre, ABY, 0x5B),
    op!(nop, ABX, 0x5C), op!(eor, ABX, 0x5D), op!(lsr, ABX, 0x5E), op!(sre, ABX, 0x5F),
    op!(rts, IMP, 0x60), op!(adc, INX, 0x61), op!(jam, IMP, 0x62), op!(rra, INX, 0x63),
    op!(nop, ZP, 0x64), op!(adc, ZP, 0x65), op!(ror, ZP, 0x66), op!(rra, ZP, 0x67),
    op!(pla, IMP, 0x68), op!(adc, IMM, 0x69), op!(ror, ACC, 0x6A), op!(arr, IMM, 0x6B),
    op!(jmp, IND, 0x6C), op!(adc, ABS, 0x6D), op!(ror, ABS, 0x6E), op!(rra, ABS, 0x6F),
    op!(bvs, REL, 0x70), op!(adc, INY, 0x71), op!(jam, IMP, 0x72), op!(rra, INY, 0x73),
    op!(nop, ZPX, 0x74), op!(adc, ZPX, 0x75), op!(ror, ZPX, 0x76), op!(rra, ZPX, 0x77),
    op!(sei, IMP, 0x78), op!(adc, ABY, 0x79), op!(nop, IMP, 0x7A), op!(rra, ABY, 0x7B),
    op!(nop, ABX, 0x7C), op!(adc, ABX, 0x7D), op!(ror, ABX, 0x7E), op!(rra, ABX, 0x7F),
    op!(nop, IMM, 0x80), op!(sta, INX, 0x81), op!(nop, IMM, 0x82), op!(sax, INX, 0x83),
    op!(sty, ZP, 0x84), op!(sta, ZP, 0x85), op!(stx, ZP, 0x86), op!(sax, ZP, 0x87),
    op!(dey, IMP, 0x88), op!(nop, IMM, 0x89), op!(txa, IMP, 0x8A), op!(xaa, IMM, 0x8B),
    op!(sty, ABS, 0x8C), op!(sta, ABS, 0x8D), op!(stx, ABS, 0x8E), op!(sax, ABS, 0x8F),
    op!(bcc, REL, 0x90), op!(sta, INY, 0x91), op!(jam, IMP, 0x92), op!(sha, INY, 0x93),
    op!(sty, ZPX, 0x94), op!(sta, ZPX, 0x95), op!(stx, ZPY, 0x96), op!(sax, ZPY, 0x97),
    op!(tya, IMP, 0x98), op!(sta, ABY, 0x99), op!(txs, IMP, 0x9A), op!(shs, ABY, 0x9B),
    op!(shy, ABX, 0x9C), op!(sta, ABX, 0x9D), op!(shx, ABY, 0x9E), op!(sha, ABY, 0x9F),
    op!(ldy, IMM, 0xA0), op!(lda, INX, 0xA1), op!(ldx, IMM, 0xA2), op!(lax, INX, 0xA3),
    op!(ldy, ZP, 0xA4), op!(lda, ZP, 0xA5), op!(ldx, ZP, 0xA6), op!(lax, ZP, 0xA7),
    op!(tay, IMP, 0xA8), op!(lda, IMM, 0xA9), op!(tax, IMP, 0xAA), op!(lax, IMM, 0xAB),
    op!(ldy, ABS, 0xAC), op!(lda, ABS, 0xAD), op!(ldx, ABS, 0xAE), op!(lax, ABS, 0xAF),
    op!(bcs, REL, 0xB0), op!(lda, INY, 0xB1), op!(jam, IMP, 0xB2), op!(lax, INY, 0xB3),
    op!(ldy, ZPX, 0xB4), op!(lda, ZPX, 0xB5), op!(ldx, ZPY, 0xB6), op!(lax, ZPY, 0xB7),
    op!(clv, IMP, 0xB8), op!(lda, ABY, 0xB9), op!(tsx, IMP, 0xBA), op!(las, ABY, 0xBB),
    op!(ldy, ABX, 0xBC), op!(lda, ABX, 0xBD), op!(ldx, ABY, 0xBE), op!(lax, ABY, 0xBF),
    op!(cpy, IMM, 0xC0), op!(cmp, INX, 0xC1), op!(nop, IMM, 0xC2), op!(dcp, INX, 0xC3),
    op!(cpy, ZP, 0xC4), op!(cmp, ZP, 0xC5), op!(dec, ZP, 0xC6), op!(dcp, ZP, 0xC7),
    op!(iny, IMP, 0xC8), op!(cmp, IMM, 0xC9), op!(dex, IMP, 0xCA), op!(sbx, IMM, 0xCB),
    op!(cpy, ABS, 0xCC), op!(cmp, ABS, 0xCD), op!(dec, ABS, 0xCE), op!(dcp, ABS, 0xCF),
    op!(bne, REL, 0xD0), op!(cmp, INY, 0xD1), op!(jam, IMP, 0xD2), op!(dcp, INY, 0xD3),
    op!(nop, ZPX, 0xD4), op!(cmp, ZPX, 0xD5), op!(dec, ZPX, 0xD6), op!(dcp, ZPX, 0xD7),
    op!(cld, IMP, 0xD8), op!(cmp, ABY, 0xD9), op!(nop, IMP, 0xDA), op!(dcp, ABY, 0xDB),
    op!(nop, ABX, 0xDC), op!(cmp, ABX, 0xDD), op!(dec, ABX, 0xDE), op!(dcp, ABX, 0xDF),
    op!(cpx, IMM, 0xE0), op!(sbc, INX, 0xE1), op!(nop, IMM, 0xE2), op!(isc, INX, 0xE3),
    op!(cpx, ZP, 0xE4), op!(sbc, ZP, 0xE5), op!(inc, ZP, 0xE6), op!(isc, ZP, 0xE7),
    op!(inx, IMP, 0xE8), op!(sbc, IMM, 0xE9), op!(nop, IMP, 0xEA), op!(sbc, IMM, 0xEB),
    op!(cpx, ABS, 0xEC), op!(sbc, ABS, 0xED), op!(inc, ABS, 0xEE), op!(isc, ABS, 0xEF),
    op!(beq, REL, 0xF0), op!(sbc, INY, 0xF1), op!(jam, IMP, 0xF2), op!(isc, INY, 0xF3),
    op!(nop, ZPX, 0xF4), op!(sbc, ZPX, 0xF5), op!(inc, ZPX, 0xF6), op!(isc, ZPX, 0xF7),
    op!(sed, IMP, 0xF8), op!(sbc, ABY, 0xF9), op!(nop, IMP, 0xFA), op!(isc, ABY, 0xFB),
    op!(nop, ABX, 0xFC), op!(sbc, ABX, 0xFD), op!(inc, ABX, 0xFE), op!(isc, ABX, 0xFF),
];
