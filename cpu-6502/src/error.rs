use thiserror::Error;

/// The dispatcher encountered a byte that isn't one of the 151 documented
/// opcodes. Non-fatal: the program counter has already advanced past the
/// byte and the cycle counter is left untouched for this step.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("unknown opcode {opcode:#04x} at pc={pc:#06x}")]
pub struct UnknownOpcode {
    pub opcode: u8,
    pub pc: u16,
}
