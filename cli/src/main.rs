mod error;
mod loader;
mod trace;

use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use cpu_6502::{Cpu, Memory};

use error::CliError;

/// A hard backstop on unbounded runs (no `--steps`/`--cycles` given and the
/// program never hits BRK), so a runaway loop doesn't spin forever. Chosen
/// as a generous multiple of the 1,000-step cap the reference loader used.
const DEFAULT_STEP_SAFETY_CAP: u64 = 1_000_000;

#[derive(Parser, Debug)]
#[command(
    name = "mos6502",
    about = "Loads a binary 6502 program into memory and runs it"
)]
struct Args {
    /// Binary file to load into memory before execution starts.
    #[arg(long)]
    load: PathBuf,

    /// Address to load the file at and start execution from. Accepts hex
    /// (`0x2000`) or decimal (`8192`).
    #[arg(long, default_value = "0x0000")]
    offset: String,

    /// Stop after this many instructions, in addition to any BRK.
    #[arg(long)]
    steps: Option<u64>,

    /// Stop once at least this many cycles have elapsed, in addition to
    /// any BRK.
    #[arg(long)]
    cycles: Option<u64>,

    /// Print a register/flag trace line after every instruction.
    #[arg(long)]
    trace: bool,

    /// Increase log verbosity; repeat for more (-v, -vv, -vvv).
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();

    let default_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if let Err(err) = run(args) {
        eprintln!("{} {}", "error:".red().bold(), err);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let offset = loader::parse_offset(&args.offset)?;

    let mut memory = Memory::new();
    let loaded = loader::load_binary_file(&args.load, offset, &mut memory)?;
    log::info!(
        "loaded {} bytes from {} at {:#06x}",
        loaded,
        args.load.display(),
        offset
    );

    let mut cpu = Cpu::new(memory);
    cpu.pc = offset;
    cpu.cycles = 0;

    let step_budget = args.steps.unwrap_or(DEFAULT_STEP_SAFETY_CAP);
    let cycle_budget = args.cycles.unwrap_or(u64::MAX);

    let mut steps_run = 0u64;
    let mut cycles_run = 0u64;
    loop {
        if steps_run >= step_budget || cycles_run >= cycle_budget {
            break;
        }

        let pc_before = cpu.pc;
        let opcode_at_pc = cpu.memory.read(pc_before);
        let cycles = cpu.step()?;

        steps_run += 1;
        cycles_run += cycles;

        if args.trace {
            trace::print_step(pc_before, &cpu, cpu.cycles);
        }

        if opcode_at_pc == 0x00 {
            log::info!("halted on BRK at {:#06x}", pc_before);
            break;
        }
    }

    println!("{}", "final state:".bold());
    trace::print_step(cpu.pc, &cpu, cpu.cycles);
    println!("instructions executed: {}", steps_run);

    Ok(())
}
