//! The program store, expression evaluator, and statement executor.
//!
//! Grounded on `examples/original_source/basic.c`: a flat table of
//! line-numbered source, 26 integer variables (A-Z), and a tree-walking
//! executor that re-tokenizes a line every time it runs it. This
//! interpreter never reads or writes `cpu_6502::Memory` or `Cpu` -- the
//! source it's modeled on runs entirely in the host process.

use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};

use colored::Colorize;

use crate::error::BasicError;
use crate::lexer::{tokenize, Token};

/// What should happen after one statement runs.
enum Flow {
    /// Fall through to the next line in program order.
    Next,
    /// Jump to the line at this index into `Interpreter::lines`.
    Jump(usize),
    /// `END` was reached; stop the run loop.
    End,
}

/// Bookkeeping for one active `FOR` loop. Loop limit and step are
/// captured once, at `FOR` time, rather than re-evaluated from source on
/// every `NEXT` the way `basic.c` does -- a program that mutates the
/// bound mid-loop is vanishingly rare and capturing it once is the less
/// surprising behavior for anyone actually writing these programs.
struct ForFrame {
    variable: usize,
    for_line_index: usize,
    limit: i64,
    step: i64,
}

/// A loaded, runnable BASIC program plus its 26 integer variables.
pub struct Interpreter {
    lines: Vec<(i64, String)>,
    variables: [i64; 26],
    for_stack: Vec<ForFrame>,
}

impl Interpreter {
    pub fn new() -> Interpreter {
        Interpreter {
            lines: Vec::new(),
            variables: [0; 26],
            for_stack: Vec::new(),
        }
    }

    /// Reads `source` a line at a time, keeping only lines that start with
    /// a line number (blank lines and comments-before-a-number are
    /// dropped). Lines are stored and later executed in ascending
    /// line-number order; re-entering a line number overwrites it, the way
    /// a line-number editor would.
    pub fn load_program(&mut self, source: &str) {
        let mut by_number: BTreeMap<i64, String> = BTreeMap::new();

        for raw_line in source.lines() {
            let trimmed = raw_line.trim_start();
            if trimmed.is_empty() || !trimmed.chars().next().unwrap().is_ascii_digit() {
                continue;
            }
            let digits_end = trimmed
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(trimmed.len());
            let line_num: i64 = trimmed[..digits_end].parse().unwrap_or(0);
            let text = trimmed[digits_end..].trim_start().to_string();
            by_number.insert(line_num, text);
        }

        self.lines = by_number.into_iter().collect();
    }

    pub fn variable(&self, letter: char) -> i64 {
        self.variables[(letter.to_ascii_uppercase() as u8 - b'A') as usize]
    }

    /// Runs the whole program from its first line to `END` or the last
    /// line, whichever comes first. A statement error is reported to
    /// stderr with its source line and execution continues at the next
    /// line -- a typo in one line shouldn't crash the rest of the run.
    pub fn run(&mut self) -> io::Result<()> {
        let mut index = 0usize;
        while index < self.lines.len() {
            let (line_num, text) = self.lines[index].clone();
            match self.execute_line(line_num, &text) {
                Ok(Flow::Next) => index += 1,
                Ok(Flow::Jump(target)) => index = target,
                Ok(Flow::End) => break,
                Err(err) => {
                    err.report(&text);
                    index += 1;
                }
            }
        }
        io::stdout().flush()
    }

    fn find_line_index(&self, line_num: i64) -> Option<usize> {
        self.lines.iter().position(|(n, _)| *n == line_num)
    }

    fn execute_line(&mut self, line_num: i64, text: &str) -> Result<Flow, BasicError> {
        let tokens = tokenize(text);
        self.execute_statement(&tokens, 0, line_num)
    }

    /// Executes one statement starting at `pos`. `IF`'s consequent is
    /// itself a statement, so this recurses one level for `IF ... THEN
    /// <statement>`.
    fn execute_statement(
        &mut self,
        tokens: &[Token],
        pos: usize,
        line_num: i64,
    ) -> Result<Flow, BasicError> {
        let Some(token) = tokens.get(pos) else {
            return Ok(Flow::Next);
        };

        match token {
            Token::Ident(word) => {
                let pos = pos + 1;
                match word.as_str() {
                    "PRINT" => {
                        self.exec_print(tokens, pos, line_num)?;
                        Ok(Flow::Next)
                    }
                    "LET" => {
                        self.exec_let(tokens, pos, line_num)?;
                        Ok(Flow::Next)
                    }
                    "INPUT" => {
                        self.exec_input(tokens, pos, line_num)?;
                        Ok(Flow::Next)
                    }
                    "GOTO" => {
                        let (target, _) = self.eval_expression(tokens, pos, line_num)?;
                        let index = self.find_line_index(target).ok_or_else(|| {
                            BasicError::new(line_num, format!("line {} not found", target))
                        })?;
                        Ok(Flow::Jump(index))
                    }
                    "IF" => self.exec_if(tokens, pos, line_num),
                    "FOR" => {
                        self.exec_for(tokens, pos, line_num)?;
                        Ok(Flow::Next)
                    }
                    "NEXT" => self.exec_next(tokens, pos, line_num),
                    "END" => Ok(Flow::End),
                    "REM" => Ok(Flow::Next),
                    other => Err(BasicError::new(
                        line_num,
                        format!("unknown command: {}", other),
                    )),
                }
            }
            // A bare variable at the start of a line is an implicit LET,
            // exactly as `basic.c`'s `execute_line` treats it.
            Token::Variable(_) => {
                self.exec_let(tokens, pos, line_num)?;
                Ok(Flow::Next)
            }
            _ => Ok(Flow::Next),
        }
    }

    fn exec_print(&mut self, tokens: &[Token], mut pos: usize, line_num: i64) -> Result<(), BasicError> {
        let mut ends_with_newline = true;
        let out = io::stdout();
        let mut out = out.lock();

        while pos < tokens.len() {
            match &tokens[pos] {
                Token::StringLit(text) => {
                    let _ = write!(out, "{}", text);
                    pos += 1;
                    ends_with_newline = true;
                }
                Token::Semicolon => {
                    pos += 1;
                    ends_with_newline = false;
                }
                Token::Comma => {
                    let _ = write!(out, "\t");
                    pos += 1;
                    ends_with_newline = true;
                }
                _ => {
                    let (value, next) = self.eval_expression(tokens, pos, line_num)?;
                    let _ = write!(out, "{}", value);
                    pos = next;
                    ends_with_newline = true;
                }
            }
        }

        if ends_with_newline {
            let _ = writeln!(out);
        }
        Ok(())
    }

    fn exec_let(&mut self, tokens: &[Token], pos: usize, line_num: i64) -> Result<(), BasicError> {
        let variable = expect_variable(tokens, pos, line_num, "LET")?;
        expect_token(tokens, pos + 1, line_num, &Token::Equals, "expected '=' in LET")?;
        let (value, _) = self.eval_expression(tokens, pos + 2, line_num)?;
        self.variables[variable] = value;
        Ok(())
    }

    /// Reads one line from stdin per `Variable` token, mirroring
    /// `basic.c`'s `exec_input`: string literals are printed as prompts,
    /// and an unparsable line is simply treated as zero.
    fn exec_input(&mut self, tokens: &[Token], mut pos: usize, line_num: i64) -> Result<(), BasicError> {
        let stdin = io::stdin();
        while pos < tokens.len() {
            match &tokens[pos] {
                Token::StringLit(text) => {
                    print!("{}", text);
                    let _ = io::stdout().flush();
                    pos += 1;
                }
                Token::Variable(variable) => {
                    let mut line = String::new();
                    stdin.lock().read_line(&mut line).map_err(|err| {
                        BasicError::new(line_num, format!("failed to read input: {}", err))
                    })?;
                    self.variables[*variable] = line.trim().parse().unwrap_or(0);
                    pos += 1;
                }
                Token::Comma | Token::Semicolon => pos += 1,
                _ => pos += 1,
            }
        }
        Ok(())
    }

    fn exec_if(&mut self, tokens: &[Token], pos: usize, line_num: i64) -> Result<Flow, BasicError> {
        let (condition, mut pos) = self.eval_condition(tokens, pos, line_num)?;
        if matches!(tokens.get(pos), Some(Token::Ident(word)) if word == "THEN") {
            pos += 1;
        }
        if condition {
            self.execute_statement(tokens, pos, line_num)
        } else {
            Ok(Flow::Next)
        }
    }

    fn exec_for(&mut self, tokens: &[Token], pos: usize, line_num: i64) -> Result<(), BasicError> {
        let variable = expect_variable(tokens, pos, line_num, "FOR")?;
        expect_token(tokens, pos + 1, line_num, &Token::Equals, "expected '=' in FOR")?;
        let (start, mut pos) = self.eval_expression(tokens, pos + 2, line_num)?;
        self.variables[variable] = start;

        if !matches!(tokens.get(pos), Some(Token::Ident(word)) if word == "TO") {
            return Err(BasicError::new(line_num, "expected TO in FOR"));
        }
        pos += 1;
        let (limit, mut pos) = self.eval_expression(tokens, pos, line_num)?;

        let step = if matches!(tokens.get(pos), Some(Token::Ident(word)) if word == "STEP") {
            pos += 1;
            self.eval_expression(tokens, pos, line_num)?.0
        } else {
            1
        };

        let for_line_index = self.find_line_index(line_num).unwrap_or(0);
        self.for_stack.push(ForFrame {
            variable,
            for_line_index,
            limit,
            step,
        });
        Ok(())
    }

    /// Advances the loop variable named by `NEXT`, then either jumps back
    /// into the loop body or falls off the end of it. Reports an error if
    /// there's no open `FOR` for that variable.
    fn exec_next(&mut self, tokens: &[Token], pos: usize, line_num: i64) -> Result<Flow, BasicError> {
        let variable = expect_variable(tokens, pos, line_num, "NEXT")?;

        let frame_index = self
            .for_stack
            .iter()
            .rposition(|frame| frame.variable == variable)
            .ok_or_else(|| {
                BasicError::new(line_num, "NEXT without a matching FOR for that variable")
            })?;

        let step = self.for_stack[frame_index].step;
        self.variables[variable] += step;
        let value = self.variables[variable];
        let limit = self.for_stack[frame_index].limit;
        let still_looping = if step >= 0 { value <= limit } else { value >= limit };

        if still_looping {
            let body_start = self.for_stack[frame_index].for_line_index + 1;
            Ok(Flow::Jump(body_start))
        } else {
            self.for_stack.truncate(frame_index);
            Ok(Flow::Next)
        }
    }

    fn eval_expression(
        &self,
        tokens: &[Token],
        pos: usize,
        line_num: i64,
    ) -> Result<(i64, usize), BasicError> {
        let (mut value, mut pos) = self.eval_term(tokens, pos, line_num)?;
        loop {
            match tokens.get(pos) {
                Some(Token::Plus) => {
                    let (rhs, next) = self.eval_term(tokens, pos + 1, line_num)?;
                    value += rhs;
                    pos = next;
                }
                Some(Token::Minus) => {
                    let (rhs, next) = self.eval_term(tokens, pos + 1, line_num)?;
                    value -= rhs;
                    pos = next;
                }
                _ => break,
            }
        }
        Ok((value, pos))
    }

    fn eval_term(&self, tokens: &[Token], pos: usize, line_num: i64) -> Result<(i64, usize), BasicError> {
        let (mut value, mut pos) = self.eval_primary(tokens, pos, line_num)?;
        loop {
            match tokens.get(pos) {
                Some(Token::Star) => {
                    let (rhs, next) = self.eval_primary(tokens, pos + 1, line_num)?;
                    value *= rhs;
                    pos = next;
                }
                // Division by zero is silently ignored, leaving the
                // accumulated value untouched -- matching `basic.c`.
                Some(Token::Slash) => {
                    let (rhs, next) = self.eval_primary(tokens, pos + 1, line_num)?;
                    if rhs != 0 {
                        value /= rhs;
                    }
                    pos = next;
                }
                _ => break,
            }
        }
        Ok((value, pos))
    }

    fn eval_primary(&self, tokens: &[Token], pos: usize, line_num: i64) -> Result<(i64, usize), BasicError> {
        match tokens.get(pos) {
            Some(Token::Number(n)) => Ok((*n, pos + 1)),
            Some(Token::Variable(v)) => Ok((self.variables[*v], pos + 1)),
            Some(Token::LParen) => {
                let (value, mut next) = self.eval_expression(tokens, pos + 1, line_num)?;
                if matches!(tokens.get(next), Some(Token::RParen)) {
                    next += 1;
                }
                Ok((value, next))
            }
            Some(Token::Minus) => {
                let (value, next) = self.eval_primary(tokens, pos + 1, line_num)?;
                Ok((-value, next))
            }
            _ => Err(BasicError::new(line_num, "expected a number, variable, or '('")),
        }
    }

    fn eval_condition(
        &self,
        tokens: &[Token],
        pos: usize,
        line_num: i64,
    ) -> Result<(bool, usize), BasicError> {
        let (left, pos) = self.eval_expression(tokens, pos, line_num)?;

        let (op, pos_after_op) = match tokens.get(pos) {
            Some(op @ (Token::Equals | Token::Less | Token::Greater | Token::LessEqual
                | Token::GreaterEqual | Token::NotEqual)) => (Some(op.clone()), pos + 1),
            _ => (None, pos),
        };

        let Some(op) = op else {
            return Ok((left != 0, pos));
        };

        let (right, pos) = self.eval_expression(tokens, pos_after_op, line_num)?;
        let result = match op {
            Token::Equals => left == right,
            Token::Less => left < right,
            Token::Greater => left > right,
            Token::LessEqual => left <= right,
            Token::GreaterEqual => left >= right,
            Token::NotEqual => left != right,
            _ => unreachable!(),
        };
        Ok((result, pos))
    }
}

impl Default for Interpreter {
    fn default() -> Interpreter {
        Interpreter::new()
    }
}

fn expect_variable(
    tokens: &[Token],
    pos: usize,
    line_num: i64,
    statement: &str,
) -> Result<usize, BasicError> {
    match tokens.get(pos) {
        Some(Token::Variable(v)) => Ok(*v),
        _ => Err(BasicError::new(
            line_num,
            format!("expected a variable name in {}", statement),
        )),
    }
}

fn expect_token(
    tokens: &[Token],
    pos: usize,
    line_num: i64,
    expected: &Token,
    message: &str,
) -> Result<(), BasicError> {
    if tokens.get(pos) == Some(expected) {
        Ok(())
    } else {
        Err(BasicError::new(line_num, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_source(source: &str) -> Interpreter {
        let mut interp = Interpreter::new();
        interp.load_program(source);
        interp.run().unwrap();
        interp
    }

    #[test]
    fn let_and_arithmetic() {
        let interp = run_source("10 LET A = 10\n20 LET B = 20\n30 LET C = A + B\n");
        assert_eq!(interp.variable('C'), 30);
    }

    #[test]
    fn implicit_let_without_the_keyword() {
        let interp = run_source("10 X = 5\n");
        assert_eq!(interp.variable('X'), 5);
    }

    #[test]
    fn if_then_executes_consequent_only_when_true() {
        let interp = run_source("10 LET X = 15\n20 IF X > 10 THEN LET Y = 1\n30 IF X < 10 THEN LET Y = 2\n");
        assert_eq!(interp.variable('Y'), 1);
    }

    #[test]
    fn for_next_counts_up_inclusive_of_the_limit() {
        let interp = run_source("10 LET S = 0\n20 FOR I = 1 TO 5\n30 LET S = S + I\n40 NEXT I\n");
        assert_eq!(interp.variable('S'), 15);
        assert_eq!(interp.variable('I'), 6);
    }

    #[test]
    fn for_next_honors_a_negative_step() {
        let interp = run_source("10 FOR I = 5 TO 1 STEP -1\n20 LET X = I\n30 NEXT I\n");
        assert_eq!(interp.variable('X'), 1);
    }

    #[test]
    fn fibonacci_matches_the_bundled_demo_sequence() {
        let interp = run_source(
            "10 LET F = 0\n20 LET G = 1\n30 FOR J = 1 TO 10\n40 LET H = F + G\n50 LET F = G\n60 LET G = H\n70 NEXT J\n",
        );
        assert_eq!(interp.variable('F'), 55);
    }

    #[test]
    fn goto_jumps_to_the_target_line() {
        let interp = run_source("10 GOTO 30\n20 LET X = 1\n30 LET X = 2\n");
        assert_eq!(interp.variable('X'), 2);
    }

    #[test]
    fn end_stops_execution_before_later_lines() {
        let interp = run_source("10 LET X = 1\n20 END\n30 LET X = 2\n");
        assert_eq!(interp.variable('X'), 1);
    }

    #[test]
    fn division_by_zero_leaves_the_accumulator_untouched() {
        let interp = run_source("10 LET X = 10 / 0\n");
        assert_eq!(interp.variable('X'), 10);
    }

    #[test]
    fn goto_missing_line_is_reported_not_fatal() {
        let mut interp = Interpreter::new();
        interp.load_program("10 GOTO 999\n20 LET X = 7\n");
        interp.run().unwrap();
        assert_eq!(interp.variable('X'), 7);
    }

    #[test]
    fn next_without_for_is_reported_not_fatal() {
        let mut interp = Interpreter::new();
        interp.load_program("10 NEXT I\n20 LET X = 3\n");
        interp.run().unwrap();
        assert_eq!(interp.variable('X'), 3);
    }

    #[test]
    fn lines_run_in_ascending_order_regardless_of_entry_order() {
        let interp = run_source("20 LET X = 2\n10 LET X = 1\n");
        assert_eq!(interp.variable('X'), 2);
    }
}
