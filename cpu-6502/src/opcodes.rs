use crate::cpu::Cpu;
use crate::instructions::{jump_ops, logical_ops, move_ops};

/// The thirteen 6502 addressing modes this core supports.
///
/// The source for the comments on the modes is
/// http://www.emulator101.com/6502-addressing-modes.html
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// No operand bytes; the instruction itself carries all the meaning.
    Implied,
    /// No operand bytes; the instruction operates on the accumulator.
    Accumulator,
    /// One operand byte; the byte itself is the value.
    Immediate,
    /// One operand byte addressing the first 256 bytes of memory.
    ZeroPage,
    /// One operand byte; effective address is `(operand + X) mod 256`.
    ZeroPageX,
    /// One operand byte; effective address is `(operand + Y) mod 256`.
    ZeroPageY,
    /// Two operand bytes, little-endian, used directly as the address.
    Absolute,
    /// Two operand bytes plus X, wrapping modulo 65,536.
    AbsoluteX,
    /// Two operand bytes plus Y, wrapping modulo 65,536.
    AbsoluteY,
    /// Two operand bytes are a pointer to the effective address. Only used
    /// by JMP, and only this mode reproduces the page-wrap bug (see
    /// `Cpu::indirect_jump_target`).
    Indirect,
    /// One operand byte; `base = (operand + X) mod 256` is a zero-page
    /// pointer to the effective address.
    IndirectX,
    /// One operand byte is a zero-page pointer; Y is added to the pointed-to
    /// address to get the effective address.
    IndirectY,
    /// One operand byte: a signed displacement added to PC. Only used by
    /// branch instructions, which resolve it directly rather than through
    /// `Cpu::operand`.
    Relative,
}

/// Either the accumulator or a resolved memory address. This lets
/// read-modify-write instructions (ASL, LSR, ROL, ROR, INC, DEC) share one
/// body across their accumulator and memory forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Accumulator,
    Address(u16),
}

impl Operand {
    pub fn read(self, cpu: &Cpu) -> u8 {
        match self {
            Operand::Accumulator => cpu.a,
            Operand::Address(address) => cpu.memory.read(address),
        }
    }

    pub fn write(self, cpu: &mut Cpu, value: u8) {
        match self {
            Operand::Accumulator => cpu.a = value,
            Operand::Address(address) => cpu.memory.write(address, value),
        }
    }
}

/// One row of the opcode table: what addressing mode to resolve, which
/// handler implements the instruction's effect, and how many cycles it
/// costs (page-cross penalties are not modeled, per spec Non-goals).
pub struct OpcodeEntry {
    pub mnemonic: &'static str,
    pub mode: Mode,
    pub cycles: u64,
    pub handler: fn(&mut Cpu, Mode),
}

macro_rules! op {
    ($mnemonic:literal, $mode:expr, $cycles:expr, $handler:expr) => {
        Some(OpcodeEntry {
            mnemonic: $mnemonic,
            mode: $mode,
            cycles: $cycles,
            handler: $handler,
        })
    };
}

/// Decodes one opcode byte into its table entry. Returns `None` for any of
/// the 105 undocumented bytes; dispatch on those is reported as
/// `UnknownOpcode`, never a panic.
///
/// This is the exhaustive map from spec section 4.E: 151 documented
/// opcodes in, everything else out. Grouped by mnemonic family so
/// completeness can be checked family-by-family against a 6502 reference.
#[rustfmt::skip]
pub fn decode(opcode: u8) -> Option<OpcodeEntry> {
    use Mode::*;
    match opcode {
        // LDA
        0xA9 => op!("LDA", Immediate, 2, move_ops::lda),
        0xA5 => op!("LDA", ZeroPage,  3, move_ops::lda),
        0xB5 => op!("LDA", ZeroPageX, 4, move_ops::lda),
        0xAD => op!("LDA", Absolute,  4, move_ops::lda),
        0xBD => op!("LDA", AbsoluteX, 4, move_ops::lda),
        0xB9 => op!("LDA", AbsoluteY, 4, move_ops::lda),
        0xA1 => op!("LDA", IndirectX, 6, move_ops::lda),
        0xB1 => op!("LDA", IndirectY, 5, move_ops::lda),

        // LDX
        0xA2 => op!("LDX", Immediate, 2, move_ops::ldx),
        0xA6 => op!("LDX", ZeroPage,  3, move_ops::ldx),
        0xB6 => op!("LDX", ZeroPageY, 4, move_ops::ldx),
        0xAE => op!("LDX", Absolute,  4, move_ops::ldx),
        0xBE => op!("LDX", AbsoluteY, 4, move_ops::ldx),

        // LDY
        0xA0 => op!("LDY", Immediate, 2, move_ops::ldy),
        0xA4 => op!("LDY", ZeroPage,  3, move_ops::ldy),
        0xB4 => op!("LDY", ZeroPageX, 4, move_ops::ldy),
        0xAC => op!("LDY", Absolute,  4, move_ops::ldy),
        0xBC => op!("LDY", AbsoluteX, 4, move_ops::ldy),

        // STA
        0x85 => op!("STA", ZeroPage,  3, move_ops::sta),
        0x95 => op!("STA", ZeroPageX, 4, move_ops::sta),
        0x8D => op!("STA", Absolute,  4, move_ops::sta),
        0x9D => op!("STA", AbsoluteX, 5, move_ops::sta),
        0x99 => op!("STA", AbsoluteY, 5, move_ops::sta),
        0x81 => op!("STA", IndirectX, 6, move_ops::sta),
        0x91 => op!("STA", IndirectY, 6, move_ops::sta),

        // STX
        0x86 => op!("STX", ZeroPage,  3, move_ops::stx),
        0x96 => op!("STX", ZeroPageY, 4, move_ops::stx),
        0x8E => op!("STX", Absolute,  4, move_ops::stx),

        // STY
        0x84 => op!("STY", ZeroPage,  3, move_ops::sty),
        0x94 => op!("STY", ZeroPageX, 4, move_ops::sty),
        0x8C => op!("STY", Absolute,  4, move_ops::sty),

        // Register transfers and stack
        0xAA => op!("TAX", Implied, 2, move_ops::tax),
        0xA8 => op!("TAY", Implied, 2, move_ops::tay),
        0x8A => op!("TXA", Implied, 2, move_ops::txa),
        0x98 => op!("TYA", Implied, 2, move_ops::tya),
        0xBA => op!("TSX", Implied, 2, move_ops::tsx),
        0x9A => op!("TXS", Implied, 2, move_ops::txs),
        0x48 => op!("PHA", Implied, 3, move_ops::pha),
        0x68 => op!("PLA", Implied, 4, move_ops::pla),
        0x08 => op!("PHP", Implied, 3, move_ops::php),
        0x28 => op!("PLP", Implied, 4, move_ops::plp),

        // ADC
        0x69 => op!("ADC", Immediate, 2, logical_ops::adc),
        0x65 => op!("ADC", ZeroPage,  3, logical_ops::adc),
        0x75 => op!("ADC", ZeroPageX, 4, logical_ops::adc),
        0x6D => op!("ADC", Absolute,  4, logical_ops::adc),
        0x7D => op!("ADC", AbsoluteX, 4, logical_ops::adc),
        0x79 => op!("ADC", AbsoluteY, 4, logical_ops::adc),
        0x61 => op!("ADC", IndirectX, 6, logical_ops::adc),
        0x71 => op!("ADC", IndirectY, 5, logical_ops::adc),

        // SBC
        0xE9 => op!("SBC", Immediate, 2, logical_ops::sbc),
        0xE5 => op!("SBC", ZeroPage,  3, logical_ops::sbc),
        0xF5 => op!("SBC", ZeroPageX, 4, logical_ops::sbc),
        0xED => op!("SBC", Absolute,  4, logical_ops::sbc),
        0xFD => op!("SBC", AbsoluteX, 4, logical_ops::sbc),
        0xF9 => op!("SBC", AbsoluteY, 4, logical_ops::sbc),
        0xE1 => op!("SBC", IndirectX, 6, logical_ops::sbc),
        0xF1 => op!("SBC", IndirectY, 5, logical_ops::sbc),

        // AND
        0x29 => op!("AND", Immediate, 2, logical_ops::and),
        0x25 => op!("AND", ZeroPage,  3, logical_ops::and),
        0x35 => op!("AND", ZeroPageX, 4, logical_ops::and),
        0x2D => op!("AND", Absolute,  4, logical_ops::and),
        0x3D => op!("AND", AbsoluteX, 4, logical_ops::and),
        0x39 => op!("AND", AbsoluteY, 4, logical_ops::and),
        0x21 => op!("AND", IndirectX, 6, logical_ops::and),
        0x31 => op!("AND", IndirectY, 5, logical_ops::and),

        // ORA
        0x09 => op!("ORA", Immediate, 2, logical_ops::ora),
        0x05 => op!("ORA", ZeroPage,  3, logical_ops::ora),
        0x15 => op!("ORA", ZeroPageX, 4, logical_ops::ora),
        0x0D => op!("ORA", Absolute,  4, logical_ops::ora),
        0x1D => op!("ORA", AbsoluteX, 4, logical_ops::ora),
        0x19 => op!("ORA", AbsoluteY, 4, logical_ops::ora),
        0x01 => op!("ORA", IndirectX, 6, logical_ops::ora),
        0x11 => op!("ORA", IndirectY, 5, logical_ops::ora),

        // EOR
        0x49 => op!("EOR", Immediate, 2, logical_ops::eor),
        0x45 => op!("EOR", ZeroPage,  3, logical_ops::eor),
        0x55 => op!("EOR", ZeroPageX, 4, logical_ops::eor),
        0x4D => op!("EOR", Absolute,  4, logical_ops::eor),
        0x5D => op!("EOR", AbsoluteX, 4, logical_ops::eor),
        0x59 => op!("EOR", AbsoluteY, 4, logical_ops::eor),
        0x41 => op!("EOR", IndirectX, 6, logical_ops::eor),
        0x51 => op!("EOR", IndirectY, 5, logical_ops::eor),

        // CMP
        0xC9 => op!("CMP", Immediate, 2, logical_ops::cmp),
        0xC5 => op!("CMP", ZeroPage,  3, logical_ops::cmp),
        0xD5 => op!("CMP", ZeroPageX, 4, logical_ops::cmp),
        0xCD => op!("CMP", Absolute,  4, logical_ops::cmp),
        0xDD => op!("CMP", AbsoluteX, 4, logical_ops::cmp),
        0xD9 => op!("CMP", AbsoluteY, 4, logical_ops::cmp),
        0xC1 => op!("CMP", IndirectX, 6, logical_ops::cmp),
        0xD1 => op!("CMP", IndirectY, 5, logical_ops::cmp),

        // CPX / CPY
        0xE0 => op!("CPX", Immediate, 2, logical_ops::cpx),
        0xE4 => op!("CPX", ZeroPage,  3, logical_ops::cpx),
        0xEC => op!("CPX", Absolute,  4, logical_ops::cpx),
        0xC0 => op!("CPY", Immediate, 2, logical_ops::cpy),
        0xC4 => op!("CPY", ZeroPage,  3, logical_ops::cpy),
        0xCC => op!("CPY", Absolute,  4, logical_ops::cpy),

        // INC / DEC
        0xE6 => op!("INC", ZeroPage,  5, logical_ops::inc),
        0xF6 => op!("INC", ZeroPageX, 6, logical_ops::inc),
        0xEE => op!("INC", Absolute,  6, logical_ops::inc),
        0xFE => op!("INC", AbsoluteX, 7, logical_ops::inc),
        0xC6 => op!("DEC", ZeroPage,  5, logical_ops::dec),
        0xD6 => op!("DEC", ZeroPageX, 6, logical_ops::dec),
        0xCE => op!("DEC", Absolute,  6, logical_ops::dec),
        0xDE => op!("DEC", AbsoluteX, 7, logical_ops::dec),
        0xE8 => op!("INX", Implied, 2, logical_ops::inx),
        0xC8 => op!("INY", Implied, 2, logical_ops::iny),
        0xCA => op!("DEX", Implied, 2, logical_ops::dex),
        0x88 => op!("DEY", Implied, 2, logical_ops::dey),

        // Shifts and rotates
        0x0A => op!("ASL", Accumulator, 2, logical_ops::asl),
        0x06 => op!("ASL", ZeroPage,   5, logical_ops::asl),
        0x16 => op!("ASL", ZeroPageX,  6, logical_ops::asl),
        0x0E => op!("ASL", Absolute,   6, logical_ops::asl),
        0x1E => op!("ASL", AbsoluteX,  7, logical_ops::asl),
        0x4A => op!("LSR", Accumulator, 2, logical_ops::lsr),
        0x46 => op!("LSR", ZeroPage,   5, logical_ops::lsr),
        0x56 => op!("LSR", ZeroPageX,  6, logical_ops::lsr),
        0x4E => op!("LSR", Absolute,   6, logical_ops::lsr),
        0x5E => op!("LSR", AbsoluteX,  7, logical_ops::lsr),
        0x2A => op!("ROL", Accumulator, 2, logical_ops::rol),
        0x26 => op!("ROL", ZeroPage,   5, logical_ops::rol),
        0x36 => op!("ROL", ZeroPageX,  6, logical_ops::rol),
        0x2E => op!("ROL", Absolute,   6, logical_ops::rol),
        0x3E => op!("ROL", AbsoluteX,  7, logical_ops::rol),
        0x6A => op!("ROR", Accumulator, 2, logical_ops::ror),
        0x66 => op!("ROR", ZeroPage,   5, logical_ops::ror),
        0x76 => op!("ROR", ZeroPageX,  6, logical_ops::ror),
        0x6E => op!("ROR", Absolute,   6, logical_ops::ror),
        0x7E => op!("ROR", AbsoluteX,  7, logical_ops::ror),

        // BIT
        0x24 => op!("BIT", ZeroPage, 3, logical_ops::bit),
        0x2C => op!("BIT", Absolute, 4, logical_ops::bit),

        // Branches
        0x90 => op!("BCC", Relative, 2, jump_ops::bcc),
        0xB0 => op!("BCS", Relative, 2, jump_ops::bcs),
        0xF0 => op!("BEQ", Relative, 2, jump_ops::beq),
        0xD0 => op!("BNE", Relative, 2, jump_ops::bne),
        0x30 => op!("BMI", Relative, 2, jump_ops::bmi),
        0x10 => op!("BPL", Relative, 2, jump_ops::bpl),
        0x50 => op!("BVC", Relative, 2, jump_ops::bvc),
        0x70 => op!("BVS", Relative, 2, jump_ops::bvs),

        // Flag instructions
        0x18 => op!("CLC", Implied, 2, jump_ops::clc),
        0x38 => op!("SEC", Implied, 2, jump_ops::sec),
        0x58 => op!("CLI", Implied, 2, jump_ops::cli),
        0x78 => op!("SEI", Implied, 2, jump_ops::sei),
        0xB8 => op!("CLV", Implied, 2, jump_ops::clv),
        0xD8 => op!("CLD", Implied, 2, jump_ops::cld),
        0xF8 => op!("SED", Implied, 2, jump_ops::sed),

        // Jumps, calls, returns, system
        0x4C => op!("JMP", Absolute, 3, jump_ops::jmp),
        0x6C => op!("JMP", Indirect, 5, jump_ops::jmp),
        0x20 => op!("JSR", Absolute, 6, jump_ops::jsr),
        0x60 => op!("RTS", Implied,  6, jump_ops::rts),
        0x00 => op!("BRK", Implied,  7, jump_ops::brk),
        0x40 => op!("RTI", Implied,  6, jump_ops::rti),
        0xEA => op!("NOP", Implied,  2, jump_ops::nop),

        _ => None,
    }
}
