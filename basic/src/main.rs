use std::io::Write as _;
use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use mos6502_basic::Interpreter;

const ARITHMETIC_DEMO: &str = include_str!("../demos/arithmetic_demo.bas");
const INTERACTIVE_DEMO: &str = include_str!("../demos/interactive_demo.bas");

#[derive(Parser, Debug)]
#[command(
    name = "mos6502-basic",
    about = "A line-numbered BASIC-like interpreter"
)]
struct Args {
    /// BASIC source file to load and run. Omit to pick from the bundled
    /// demos via an interactive menu.
    file: Option<PathBuf>,

    /// Increase log verbosity; repeat for more (-v, -vv, -vvv).
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();

    let default_level = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match args.file {
        Some(path) => run_file(&path),
        None => run_menu(),
    }
}

fn run_file(path: &PathBuf) {
    match std::fs::read_to_string(path) {
        Ok(source) => run_source(&source),
        Err(err) => {
            eprintln!(
                "{} cannot open '{}': {}",
                "error:".red().bold(),
                path.display(),
                err
            );
            std::process::exit(1);
        }
    }
}

fn run_source(source: &str) {
    let mut interpreter = Interpreter::new();
    interpreter.load_program(source);
    if let Err(err) = interpreter.run() {
        eprintln!("{} {}", "error:".red().bold(), err);
        std::process::exit(1);
    }
}

/// Reproduces `main_basic.c`'s numbered menu when no script file is given
/// on the command line.
fn run_menu() {
    let stdin = std::io::stdin();
    loop {
        println!();
        println!("{}", "6502 BASIC INTERPRETER".bold());
        println!("======================");
        println!("1. Run arithmetic/loop/Fibonacci demo");
        println!("2. Run interactive demo (reads your name and two numbers)");
        println!("3. Exit");
        print!("\nSelect option: ");
        let _ = std::io::stdout().flush();

        let mut choice = String::new();
        if stdin.read_line(&mut choice).is_err() {
            break;
        }

        match choice.trim() {
            "1" => {
                println!();
                run_source(ARITHMETIC_DEMO);
            }
            "2" => {
                println!();
                run_source(INTERACTIVE_DEMO);
            }
            "3" => {
                println!("Goodbye!");
                break;
            }
            _ => println!("Invalid option"),
        }
    }
}
