use crate::bus::{Bus, STACK_ADDR};
use crate::cpu::addressing::Addressing;
use crate::cpu::instruction::Instruction;
use crate::cpu::lookup::LOOKUP_TABLE;
use crate::cpu::mnemonic::Mnemonic;
use crate::cpu::status::Status;
use crate::reset_kind::ResetKind;

pub(crate) mod addressing;
pub(crate) mod cycle;
pub(crate) mod instruction;
pub(crate) mod lookup;
pub(crate) mod micro_op;
pub(crate) mod mnemonic;
pub(crate) mod status;

/// Ricoh 2A03 integer core: registers plus the handful of latches the
/// micro-op sequencer needs to carry state between cycles of a single
/// instruction.
#[cfg_attr(feature = "savestate-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Cpu {
    pub(crate) a: u8,
    pub(crate) x: u8,
    pub(crate) y: u8,
    pub(crate) s: u8,
    pub(crate) p: Status,
    pub(crate) pc: u16,

    /// Scratch byte shared by several mnemonics: the unindexed high byte of
    /// an Absolute,X/Absolute,Y/(Indirect),Y base address (read by SHA/SHS),
    /// and the in-flight memory operand for read-modify-write instructions.
    pub(crate) base: u8,
    pub(crate) effective_addr: u16,

    /// Opcode byte of the instruction currently executing, so a handful of
    /// mnemonics that share micro-ops across opcodes (JMP, shift/rotate) can
    /// branch on exactly which addressing mode dispatched them.
    pub(crate) opcode_in_flight: Option<u8>,

    /// One-shot interrupt-polling gates set by CLI/SEI: the 6502 delays the
    /// effect of an I-flag update by one instruction.
    pub(crate) irq_inhibit_next: bool,
    pub(crate) allow_irq_once: bool,
}

impl Cpu {
    pub(crate) fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            s: 0xFD,
            p: Status::new(),
            pc: 0,
            base: 0,
            effective_addr: 0,
            opcode_in_flight: None,
            irq_inhibit_next: false,
            allow_irq_once: false,
        }
    }

    pub(crate) fn incr_pc(&mut self) {
        self.pc = self.pc.wrapping_add(1);
    }

    pub(crate) fn push(&mut self, bus: &mut dyn Bus, value: u8) {
        bus.mem_write(STACK_ADDR + self.s as u16, value);
        self.s = self.s.wrapping_sub(1);
    }

    pub(crate) fn pull(&mut self, bus: &mut dyn Bus) -> u8 {
        self.s = self.s.wrapping_add(1);
        bus.mem_read(STACK_ADDR + self.s as u16)
    }

    /// Commits a taken branch: the Relative decode phase already resolved
    /// `effective_addr` to the branch target.
    pub(crate) fn branch(&mut self) {
        self.pc = self.effective_addr;
    }

    pub(crate) fn queue_i_update(&mut self, value: bool) {
        self.p.set_i(value);
    }

    pub(crate) fn reset(&mut self, bus: &mut dyn Bus, kind: ResetKind) {
        match kind {
            ResetKind::PowerOn => {
                self.a = 0;
                self.x = 0;
                self.y = 0;
                self.s = 0xFD;
                self.p = Status::new();
            }
            ResetKind::Soft => {
                self.s = self.s.wrapping_sub(3);
                self.p.set_i(true);
            }
        }
        self.base = 0;
        self.effective_addr = 0;
        self.opcode_in_flight = None;
        self.irq_inhibit_next = false;
        self.allow_irq_once = false;

        let lo = bus.mem_read(0xFFFC) as u16;
        let hi = bus.mem_read(0xFFFD) as u16;
        self.pc = (hi << 8) | lo;
    }

    /// Services a pending NMI or IRQ ahead of the next opcode fetch, returning
    /// the cycle cost of the interrupt sequence (0 if none was serviced).
    pub(crate) fn poll_interrupts<B: Bus>(&mut self, bus: &mut B) -> u8 {
        // CLI/SEI delay the effect of an I-flag change by one instruction
        // boundary; these one-shot gates from the just-executed instruction
        // apply to exactly this poll and are then cleared.
        let suppress_irq = self.irq_inhibit_next;
        let allow_irq_once = self.allow_irq_once;
        self.irq_inhibit_next = false;
        self.allow_irq_once = false;

        let nmi = bus.nmi_line();
        let irq = bus.irq_pending() && !suppress_irq && (allow_irq_once || !self.p.i());
        if !nmi && !irq {
            return 0;
        }

        let vector = if nmi { 0xFFFA } else { 0xFFFE };
        self.push(bus, (self.pc >> 8) as u8);
        self.push(bus, (self.pc & 0xFF) as u8);
        let p = (self.p | Status::UNUSED) & !Status::BREAK;
        self.push(bus, p.bits());
        self.p.set_i(true);
        if !nmi {
            bus.clear_irq();
        }

        let lo = bus.mem_read(vector) as u16;
        let hi = bus.mem_read(vector + 1) as u16;
        self.pc = (hi << 8) | lo;
        7
    }

    /// Fetches and runs one instruction, servicing a pending interrupt first.
    /// Returns the number of cycles the real hardware would have spent.
    pub(crate) fn step<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let interrupt_cycles = self.poll_interrupts(bus);
        if interrupt_cycles != 0 {
            return interrupt_cycles;
        }

        let opcode = bus.mem_read(self.pc);
        self.incr_pc();
        let instr = &LOOKUP_TABLE[opcode as usize];
        self.opcode_in_flight = Some(opcode);
        self.execute(bus, instr)
    }

    fn execute(&mut self, bus: &mut dyn Bus, instr: &Instruction) -> u8 {
        let crossed_page = if Self::skips_decode(instr.mnemonic) {
            false
        } else {
            self.decode(bus, instr.addressing)
        };

        let branch_taken = Self::evaluate_branch(instr.mnemonic, self.p);

        let ops = instr.mnemonic.micro_ops();
        if Self::is_accumulator_shift(instr.mnemonic, instr.addressing) {
            let last = ops.last().expect("shift mnemonics have at least one micro-op");
            (last.micro_fn)(self, bus);
        } else {
            for op in ops {
                (op.micro_fn)(self, bus);
            }
        }

        instr.cycle().total_cycle(crossed_page, branch_taken)
    }

    fn skips_decode(mnemonic: Mnemonic) -> bool {
        matches!(
            mnemonic,
            Mnemonic::JMP | Mnemonic::JSR | Mnemonic::BRK | Mnemonic::RTI | Mnemonic::RTS
        )
    }

    fn is_accumulator_shift(mnemonic: Mnemonic, addressing: Addressing) -> bool {
        matches!(
            mnemonic,
            Mnemonic::ASL | Mnemonic::LSR | Mnemonic::ROL | Mnemonic::ROR
        ) && addressing == Addressing::Accumulator
    }

    fn evaluate_branch(mnemonic: Mnemonic, p: Status) -> bool {
        match mnemonic {
            Mnemonic::BCC => !p.c(),
            Mnemonic::BCS => p.c(),
            Mnemonic::BEQ => p.z(),
            Mnemonic::BNE => !p.z(),
            Mnemonic::BPL => !p.n(),
            Mnemonic::BMI => p.n(),
            Mnemonic::BVC => !p.v(),
            Mnemonic::BVS => p.v(),
            _ => false,
        }
    }

    /// Resolves `effective_addr` (and, for a few modes, `base`) for every
    /// addressing mode except the ones control-flow mnemonics decode
    /// themselves. Returns whether a page boundary was crossed.
    fn decode(&mut self, bus: &mut dyn Bus, addressing: Addressing) -> bool {
        match addressing {
            Addressing::Implied | Addressing::Accumulator => false,
            Addressing::Immediate => {
                self.effective_addr = self.pc;
                self.incr_pc();
                false
            }
            Addressing::ZeroPage => {
                let addr = bus.mem_read(self.pc) as u16;
                self.incr_pc();
                self.effective_addr = addr;
                false
            }
            Addressing::ZeroPageX => {
                let base = bus.mem_read(self.pc);
                self.incr_pc();
                bus.internal_cycle();
                self.effective_addr = base.wrapping_add(self.x) as u16;
                false
            }
            Addressing::ZeroPageY => {
                let base = bus.mem_read(self.pc);
                self.incr_pc();
                bus.internal_cycle();
                self.effective_addr = base.wrapping_add(self.y) as u16;
                false
            }
            Addressing::Absolute => {
                let lo = bus.mem_read(self.pc) as u16;
                self.incr_pc();
                let hi = bus.mem_read(self.pc) as u16;
                self.incr_pc();
                self.effective_addr = (hi << 8) | lo;
                false
            }
            Addressing::AbsoluteX => self.decode_absolute_indexed(bus, self.x),
            Addressing::AbsoluteY => self.decode_absolute_indexed(bus, self.y),
            Addressing::Indirect => false,
            Addressing::IndirectX => {
                let zp = bus.mem_read(self.pc);
                self.incr_pc();
                bus.internal_cycle();
                let ptr = zp.wrapping_add(self.x);
                let lo = bus.mem_read(ptr as u16) as u16;
                let hi = bus.mem_read(ptr.wrapping_add(1) as u16) as u16;
                self.effective_addr = (hi << 8) | lo;
                false
            }
            Addressing::IndirectY => {
                let zp = bus.mem_read(self.pc);
                self.incr_pc();
                let lo = bus.mem_read(zp as u16) as u16;
                let hi = bus.mem_read(zp.wrapping_add(1) as u16) as u16;
                let base = (hi << 8) | lo;
                let effective = base.wrapping_add(self.y as u16);
                self.base = hi as u8;
                self.effective_addr = effective;
                (base & 0xFF00) != (effective & 0xFF00)
            }
            Addressing::Relative => {
                let offset = bus.mem_read(self.pc) as i8;
                self.incr_pc();
                let fallthrough = self.pc;
                let target = fallthrough.wrapping_add(offset as i16 as u16);
                self.effective_addr = target;
                (fallthrough & 0xFF00) != (target & 0xFF00)
            }
        }
    }

    fn decode_absolute_indexed(&mut self, bus: &mut dyn Bus, index: u8) -> bool {
        let lo = bus.mem_read(self.pc) as u16;
        self.incr_pc();
        let hi = bus.mem_read(self.pc) as u16;
        self.incr_pc();
        let base = (hi << 8) | lo;
        let effective = base.wrapping_add(index as u16);
        self.base = hi as u8;
        self.effective_addr = effective;
        (base & 0xFF00) != (effective & 0xFF00)
    }

    /// Test-only driver used by the per-mnemonic `InstrTest` harness: unlike
    /// [`Cpu::step`], it never polls interrupts and the caller supplies the
    /// already-decoded [`Instruction`] rather than fetching from `LOOKUP_TABLE`.
    #[cfg(test)]
    pub(crate) fn test_clock<B: Bus>(&mut self, bus: &mut B, instr: &Instruction) -> u8 {
        let opcode = bus.mem_read(self.pc);
        self.incr_pc();
        self.opcode_in_flight = Some(opcode);
        self.execute(bus, instr)
    }
}
