//! A line-numbered BASIC-like interpreter: tokenizer, recursive-descent
//! expression evaluator, and statement executor for PRINT, LET, INPUT, IF,
//! FOR/NEXT, GOTO, and END.
//!
//! This is a secondary, optional front-end with no relationship to the
//! 6502 core in `cpu_6502` -- it is a tree-walking interpreter that runs
//! entirely in the host process and never compiles down to machine code.

pub mod error;
pub mod interpreter;
pub mod lexer;

pub use error::BasicError;
pub use interpreter::Interpreter;
