use crate::error::UnknownOpcode;
use crate::memory::Memory;
use crate::opcodes::{decode, Mode, Operand};

/// Bit positions of the processor status register. `Unused` never reflects
/// anything the running program did; it reads back as 1 any time the
/// status byte is materialized (PHP, BRK) and is forced to 1 any time it is
/// restored (PLP, RTI).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFlag {
    Negative = 0b1000_0000,
    Overflow = 0b0100_0000,
    Unused = 0b0010_0000,
    Break = 0b0001_0000,
    Decimal = 0b0000_1000,
    InterruptDisable = 0b0000_0100,
    Zero = 0b0000_0010,
    Carry = 0b0000_0001,
}

/// The two states a caller can observe the dispatcher in. BRK never halts
/// the core -- it's a software interrupt with ordinary successor state --
/// so `HaltedUnknownOpcode` is the only way `step`/`run` stop making
/// progress on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuState {
    Running,
    HaltedUnknownOpcode(UnknownOpcode),
}

/// A bit-faithful interpreter for the 151 documented MOS 6502 opcodes.
///
/// `Cpu` owns its `Memory` outright: there is no bus, no mapper, and no
/// side channel for memory-mapped I/O. Everything the processor can see
/// lives in the flat 64 KiB array.
pub struct Cpu {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub status: u8,
    pub cycles: u64,
    pub memory: Memory,
    last_state: CpuState,
}

impl Cpu {
    /// The stack pointer's value immediately after a reset, matching real
    /// hardware: three phantom pushes during power-on leave SP at 0xFD
    /// rather than 0xFF.
    const RESET_SP: u8 = 0xFD;

    pub fn new(memory: Memory) -> Cpu {
        Cpu {
            a: 0,
            x: 0,
            y: 0,
            sp: Cpu::RESET_SP,
            pc: 0,
            status: StatusFlag::Unused as u8 | StatusFlag::InterruptDisable as u8,
            cycles: 0,
            memory,
            last_state: CpuState::Running,
        }
    }

    /// Restores power-on register state and loads PC from the reset
    /// vector, without touching memory contents.
    pub fn reset(&mut self) {
        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.sp = Cpu::RESET_SP;
        self.status = StatusFlag::Unused as u8 | StatusFlag::InterruptDisable as u8;
        self.cycles = 0;
        self.pc = self.memory.read_word(Memory::RESET_VECTOR);
        self.last_state = CpuState::Running;
    }

    /// The dispatcher's state as of the most recent `step`/`run` call.
    pub fn state(&self) -> CpuState {
        self.last_state
    }

    pub fn get_flag(&self, flag: StatusFlag) -> bool {
        self.status & (flag as u8) != 0
    }

    pub fn set_flag(&mut self, flag: StatusFlag, value: bool) {
        if value {
            self.status |= flag as u8;
        } else {
            self.status &= !(flag as u8);
        }
    }

    /// Sets Zero and Negative from `value`, as almost every load, transfer,
    /// and arithmetic instruction does.
    pub fn update_zero_and_negative(&mut self, value: u8) {
        self.set_flag(StatusFlag::Zero, value == 0);
        self.set_flag(StatusFlag::Negative, value & 0x80 != 0);
    }

    fn fetch_byte(&mut self) -> u8 {
        let byte = self.memory.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        byte
    }

    fn fetch_word(&mut self) -> u16 {
        let word = self.memory.read_word(self.pc);
        self.pc = self.pc.wrapping_add(2);
        word
    }

    /// Reads a little-endian word from a zero-page pointer, wrapping the
    /// high-byte fetch within page zero rather than spilling into page
    /// one. Used by the indexed-indirect and indirect-indexed modes.
    fn read_word_zero_page(&self, pointer: u8) -> u16 {
        let lo = self.memory.read(pointer as u16) as u16;
        let hi = self.memory.read(pointer.wrapping_add(1) as u16) as u16;
        lo | (hi << 8)
    }

    /// Resolves `pointer` to a JMP target, reproducing the 6502's
    /// indirect-JMP page-wrap bug: if `pointer` sits on the last byte of a
    /// page, the high byte of the target is fetched from the start of that
    /// same page instead of the first byte of the next one.
    fn indirect_jump_target(&self, pointer: u16) -> u16 {
        let lo = self.memory.read(pointer) as u16;
        let hi_address = if pointer & 0x00FF == 0x00FF {
            pointer & 0xFF00
        } else {
            pointer.wrapping_add(1)
        };
        let hi = self.memory.read(hi_address) as u16;
        lo | (hi << 8)
    }

    /// Resolves `mode` against the current PC, advancing PC past any
    /// operand bytes and returning where the instruction should read or
    /// write. Never called with `Mode::Implied` or `Mode::Relative`;
    /// branches and implied-operand instructions handle themselves.
    pub fn resolve(&mut self, mode: Mode) -> Operand {
        match mode {
            Mode::Implied | Mode::Relative => {
                unreachable!("{:?} operands are resolved by their own handlers", mode)
            }
            Mode::Accumulator => Operand::Accumulator,
            Mode::Immediate => {
                let address = self.pc;
                self.pc = self.pc.wrapping_add(1);
                Operand::Address(address)
            }
            Mode::ZeroPage => {
                let zp = self.fetch_byte();
                Operand::Address(zp as u16)
            }
            Mode::ZeroPageX => {
                let zp = self.fetch_byte().wrapping_add(self.x);
                Operand::Address(zp as u16)
            }
            Mode::ZeroPageY => {
                let zp = self.fetch_byte().wrapping_add(self.y);
                Operand::Address(zp as u16)
            }
            Mode::Absolute => Operand::Address(self.fetch_word()),
            Mode::AbsoluteX => {
                let base = self.fetch_word();
                Operand::Address(base.wrapping_add(self.x as u16))
            }
            Mode::AbsoluteY => {
                let base = self.fetch_word();
                Operand::Address(base.wrapping_add(self.y as u16))
            }
            Mode::Indirect => {
                let pointer = self.fetch_word();
                Operand::Address(self.indirect_jump_target(pointer))
            }
            Mode::IndirectX => {
                let pointer = self.fetch_byte().wrapping_add(self.x);
                Operand::Address(self.read_word_zero_page(pointer))
            }
            Mode::IndirectY => {
                let pointer = self.fetch_byte();
                let base = self.read_word_zero_page(pointer);
                Operand::Address(base.wrapping_add(self.y as u16))
            }
        }
    }

    /// Convenience for instructions that only ever read their operand
    /// (loads, arithmetic, comparisons, logical ops).
    pub fn read_operand(&mut self, mode: Mode) -> u8 {
        let operand = self.resolve(mode);
        operand.read(self)
    }

    pub fn push_u8(&mut self, value: u8) {
        self.memory.write(Memory::STACK_PAGE + self.sp as u16, value);
        self.sp = self.sp.wrapping_sub(1);
    }

    pub fn pull_u8(&mut self) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        self.memory.read(Memory::STACK_PAGE + self.sp as u16)
    }

    /// Pushes high byte then low byte, so that `pull_u16` (which pulls low
    /// then high) reconstructs the same word.
    pub fn push_u16(&mut self, value: u16) {
        self.push_u8((value >> 8) as u8);
        self.push_u8(value as u8);
    }

    pub fn pull_u16(&mut self) -> u16 {
        let lo = self.pull_u8() as u16;
        let hi = self.pull_u8() as u16;
        lo | (hi << 8)
    }

    /// Fetches the branch's signed displacement byte and, if `condition`
    /// holds, applies it to PC and charges the extra cycle real hardware
    /// spends on a taken branch. Page-cross penalties are not modeled.
    pub fn branch(&mut self, condition: bool) {
        let offset = self.fetch_byte() as i8;
        if condition {
            self.pc = self.pc.wrapping_add(offset as i16 as u16);
            self.cycles = self.cycles.wrapping_add(1);
        }
    }

    /// Decodes and executes one instruction, returning the number of
    /// cycles it took. Fails without any side effect beyond having
    /// consumed the opcode byte if it isn't one of the 151 documented
    /// opcodes.
    pub fn step(&mut self) -> Result<u64, UnknownOpcode> {
        let pc_at_fetch = self.pc;
        let opcode = self.fetch_byte();
        let entry = match decode(opcode) {
            Some(entry) => entry,
            None => {
                let err = UnknownOpcode {
                    opcode,
                    pc: pc_at_fetch,
                };
                log::warn!("{}", err);
                self.last_state = CpuState::HaltedUnknownOpcode(err);
                return Err(err);
            }
        };
        self.last_state = CpuState::Running;
        log::trace!(
            "{:#06x}: {} ({:?}) a={:#04x} x={:#04x} y={:#04x} sp={:#04x} status={:#010b}",
            pc_at_fetch,
            entry.mnemonic,
            entry.mode,
            self.a,
            self.x,
            self.y,
            self.sp,
            self.status
        );
        (entry.handler)(self, entry.mode);
        self.cycles = self.cycles.wrapping_add(entry.cycles);
        Ok(entry.cycles)
    }

    /// Executes instructions until at least `budget_cycles` have elapsed,
    /// returning the total number of cycles actually spent (which may
    /// overshoot the budget by the cost of the final instruction). Stops
    /// immediately, without executing a partial instruction, if `step`
    /// hits an undocumented opcode.
    pub fn run(&mut self, budget_cycles: u64) -> Result<u64, UnknownOpcode> {
        let mut consumed = 0u64;
        while consumed < budget_cycles {
            consumed += self.step()?;
        }
        Ok(consumed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Loads `bytes` at 0x0200, points the reset vector at 0x0200, and
    /// resets so `pc` actually lands there -- `new()` alone leaves `pc` at
    /// 0 and never touches the vector.
    fn cpu_with_program(bytes: &[u8]) -> Cpu {
        let mut memory = Memory::new();
        memory.load(0x0200, bytes);
        memory.write(Memory::RESET_VECTOR, 0x00);
        memory.write(Memory::RESET_VECTOR + 1, 0x02);
        let mut cpu = Cpu::new(memory);
        cpu.reset();
        cpu
    }

    #[test]
    fn new_leaves_pc_at_zero_and_never_reads_the_vector() {
        let mut memory = Memory::new();
        memory.write(Memory::RESET_VECTOR, 0x34);
        memory.write(Memory::RESET_VECTOR + 1, 0x12);
        let cpu = Cpu::new(memory);
        assert_eq!(cpu.pc, 0);
        assert_eq!(cpu.sp, 0xFD);
        assert!(cpu.get_flag(StatusFlag::InterruptDisable));
        assert!(cpu.get_flag(StatusFlag::Unused));
    }

    #[test]
    fn reset_loads_pc_from_vector_and_sets_i_and_u() {
        let mut cpu = cpu_with_program(&[0xEA]);
        assert_eq!(cpu.pc, 0x0200);
        assert_eq!(cpu.sp, 0xFD);
        assert!(cpu.get_flag(StatusFlag::InterruptDisable));
        assert!(cpu.get_flag(StatusFlag::Unused));

        // Mutate everything reset() is responsible for restoring, point
        // the vector somewhere else, and confirm reset() actually does it.
        cpu.memory.write(Memory::RESET_VECTOR, 0x00);
        cpu.memory.write(Memory::RESET_VECTOR + 1, 0x05);
        cpu.sp = 0x12;
        cpu.status = 0x00;
        cpu.cycles = 999;
        cpu.reset();
        assert_eq!(cpu.pc, 0x0500);
        assert_eq!(cpu.sp, 0xFD);
        assert_eq!(cpu.cycles, 0);
        assert!(cpu.get_flag(StatusFlag::InterruptDisable));
        assert!(cpu.get_flag(StatusFlag::Unused));
    }

    #[test]
    fn reset_leaves_a_x_y_untouched() {
        let mut cpu = cpu_with_program(&[]);
        cpu.a = 0x11;
        cpu.x = 0x22;
        cpu.y = 0x33;
        cpu.reset();
        assert_eq!(cpu.a, 0x11);
        assert_eq!(cpu.x, 0x22);
        assert_eq!(cpu.y, 0x33);
    }

    #[test]
    fn stack_push_pull_u8_roundtrip() {
        let mut cpu = cpu_with_program(&[]);
        cpu.push_u8(0x42);
        assert_eq!(cpu.sp, 0xFC);
        assert_eq!(cpu.pull_u8(), 0x42);
        assert_eq!(cpu.sp, 0xFD);
    }

    #[test]
    fn stack_push_pull_u16_roundtrip() {
        let mut cpu = cpu_with_program(&[]);
        cpu.push_u16(0xBEEF);
        assert_eq!(cpu.pull_u16(), 0xBEEF);
    }

    #[test]
    fn indirect_jump_target_reproduces_page_wrap_bug() {
        let mut cpu = cpu_with_program(&[]);
        cpu.memory.write(0x02FF, 0x00);
        cpu.memory.write(0x0300, 0x03);
        cpu.memory.write(0x0200, 0x01);
        assert_eq!(cpu.indirect_jump_target(0x02FF), 0x0100);
    }

    #[test]
    fn indirect_jump_target_normal_case() {
        let mut cpu = cpu_with_program(&[]);
        cpu.memory.write(0x0300, 0x34);
        cpu.memory.write(0x0301, 0x12);
        assert_eq!(cpu.indirect_jump_target(0x0300), 0x1234);
    }

    #[test]
    fn step_on_unknown_opcode_reports_pc_before_the_byte() {
        let mut cpu = cpu_with_program(&[0xFF]);
        let err = cpu.step().unwrap_err();
        assert_eq!(err.opcode, 0xFF);
        assert_eq!(err.pc, 0x0200);
        assert_eq!(cpu.state(), CpuState::HaltedUnknownOpcode(err));
    }

    #[test]
    fn state_is_running_after_an_ordinary_step() {
        let mut cpu = cpu_with_program(&[0xEA]);
        cpu.step().unwrap();
        assert_eq!(cpu.state(), CpuState::Running);
    }

    #[test]
    fn run_stops_exactly_on_budget_with_two_cycle_nops() {
        let mut cpu = cpu_with_program(&[0xEA, 0xEA, 0xEA]);
        let spent = cpu.run(4).unwrap();
        assert_eq!(spent, 4);
        assert_eq!(cpu.pc, 0x0202);
    }
}
