use colored::Colorize;
use cpu_6502::{Cpu, StatusFlag};

/// Renders the status byte as the eight flag letters, dimmed when clear
/// -- `N V - B D I Z C` order, matching the register layout everyone
/// learns the 6502 from.
fn format_flags(status: u8) -> String {
    const LETTERS: [(u8, char); 8] = [
        (StatusFlag::Negative as u8, 'N'),
        (StatusFlag::Overflow as u8, 'V'),
        (StatusFlag::Unused as u8, '-'),
        (StatusFlag::Break as u8, 'B'),
        (StatusFlag::Decimal as u8, 'D'),
        (StatusFlag::InterruptDisable as u8, 'I'),
        (StatusFlag::Zero as u8, 'Z'),
        (StatusFlag::Carry as u8, 'C'),
    ];
    LETTERS
        .iter()
        .map(|&(mask, letter)| if status & mask != 0 { letter } else { '.' })
        .collect()
}

/// Prints one line of a post-step trace: the address the instruction was
/// fetched from, the register file afterward, and cycles spent so far.
pub fn print_step(pc: u16, cpu: &Cpu, cycles_spent: u64) {
    println!(
        "{} a={} x={} y={} sp={} p={} cyc={}",
        format!("{:#06x}", pc).blue().bold(),
        format!("{:#04x}", cpu.a).yellow(),
        format!("{:#04x}", cpu.x).yellow(),
        format!("{:#04x}", cpu.y).yellow(),
        format!("{:#04x}", cpu.sp).yellow(),
        format_flags(cpu.status).green(),
        cycles_spent
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_flags_renders_set_and_clear_positions() {
        // N=1 V=0 U=1 B=0 D=0 I=1 Z=0 C=1
        let rendered = format_flags(0b1010_0101);
        assert_eq!(rendered, "N.-..I.C");
    }
}
