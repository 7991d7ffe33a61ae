use std::fmt::{self, Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Addressing {
    Implied,
    Accumulator,
    Immediate,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    IndirectX,
    IndirectY,
    Relative,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
}

impl Display for Addressing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Addressing::Implied => "implied",
            Addressing::Accumulator => "accumulator",
            Addressing::Immediate => "immediate",
            Addressing::Absolute => "absolute",
            Addressing::AbsoluteX => "absolute,x",
            Addressing::AbsoluteY => "absolute,y",
            Addressing::Indirect => "indirect",
            Addressing::IndirectX => "(indirect,x)",
            Addressing::IndirectY => "(indirect),y",
            Addressing::Relative => "relative",
            Addressing::ZeroPage => "zeropage",
            Addressing::ZeroPageX => "zeropage,x",
            Addressing::ZeroPageY => "zeropage,y",
        };
        f.write_str(name)
    }
}
