//! Splits one line of BASIC source into tokens.
//!
//! The character-classification approach (peek, consume runs of alpha or
//! numeric characters) follows the same shape as `cpu-6502`'s assembler
//! lexer, scaled down to BASIC's much smaller token set: keywords, the 26
//! single-letter integer variables, numeric and string literals, and the
//! arithmetic/relational operators.

use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Number(i64),
    /// A-Z, stored as a 0..26 index into the variable table.
    Variable(usize),
    /// Any other bare word, upper-cased: a keyword (PRINT, FOR, THEN, ...)
    /// or an unrecognized command name.
    Ident(String),
    StringLit(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Equals,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    NotEqual,
    Comma,
    Semicolon,
}

/// Tokenizes one line of source. Unrecognized punctuation is dropped
/// rather than raised as an error here; the parser is left to complain
/// about malformed statements where that's actually meaningful.
pub fn tokenize(line: &str) -> Vec<Token> {
    let mut chars = line.chars().peekable();
    let mut tokens = Vec::new();

    while let Some(&c) = chars.peek() {
        if c == ' ' || c == '\t' {
            chars.next();
            continue;
        }

        if c.is_ascii_digit() {
            tokens.push(Token::Number(read_number(&mut chars)));
            continue;
        }

        if c.is_alphabetic() {
            let word = read_word(&mut chars);
            if word.chars().count() == 1 {
                let letter = word.chars().next().unwrap().to_ascii_uppercase();
                tokens.push(Token::Variable((letter as u8 - b'A') as usize));
            } else {
                tokens.push(Token::Ident(word.to_ascii_uppercase()));
            }
            continue;
        }

        if c == '"' {
            chars.next();
            let mut text = String::new();
            while let Some(&next) = chars.peek() {
                if next == '"' {
                    break;
                }
                text.push(next);
                chars.next();
            }
            chars.next(); // the closing quote, if the line had one
            tokens.push(Token::StringLit(text));
            continue;
        }

        chars.next();
        match c {
            '+' => tokens.push(Token::Plus),
            '-' => tokens.push(Token::Minus),
            '*' => tokens.push(Token::Star),
            '/' => tokens.push(Token::Slash),
            '(' => tokens.push(Token::LParen),
            ')' => tokens.push(Token::RParen),
            ',' => tokens.push(Token::Comma),
            ';' => tokens.push(Token::Semicolon),
            '=' => tokens.push(Token::Equals),
            '<' => match chars.peek() {
                Some('=') => {
                    chars.next();
                    tokens.push(Token::LessEqual);
                }
                Some('>') => {
                    chars.next();
                    tokens.push(Token::NotEqual);
                }
                _ => tokens.push(Token::Less),
            },
            '>' => match chars.peek() {
                Some('=') => {
                    chars.next();
                    tokens.push(Token::GreaterEqual);
                }
                _ => tokens.push(Token::Greater),
            },
            _ => {}
        }
    }

    tokens
}

fn read_number(chars: &mut Peekable<Chars>) -> i64 {
    let mut text = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() {
            text.push(c);
            chars.next();
        } else {
            break;
        }
    }
    text.parse().unwrap_or(0)
}

fn read_word(chars: &mut Peekable<Chars>) -> String {
    let mut text = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_alphanumeric() {
            text.push(c);
            chars.next();
        } else {
            break;
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_a_let_statement() {
        let tokens = tokenize("LET A = 10");
        assert_eq!(
            tokens,
            vec![
                Token::Ident("LET".into()),
                Token::Variable(0),
                Token::Equals,
                Token::Number(10),
            ]
        );
    }

    #[test]
    fn multi_letter_words_are_idents_not_variables() {
        let tokens = tokenize("GOTO AB");
        assert_eq!(
            tokens,
            vec![Token::Ident("GOTO".into()), Token::Ident("AB".into())]
        );
    }

    #[test]
    fn string_literals_keep_their_case() {
        let tokens = tokenize("PRINT \"Hello, World\"");
        assert_eq!(
            tokens,
            vec![
                Token::Ident("PRINT".into()),
                Token::StringLit("Hello, World".into()),
            ]
        );
    }

    #[test]
    fn relational_operators_with_two_characters() {
        let tokens = tokenize("IF X <= 10");
        assert_eq!(
            tokens,
            vec![
                Token::Ident("IF".into()),
                Token::Variable(23),
                Token::LessEqual,
                Token::Number(10),
            ]
        );
    }

    #[test]
    fn lowercase_keywords_are_upper_cased() {
        let tokens = tokenize("print a");
        assert_eq!(
            tokens,
            vec![Token::Ident("PRINT".into()), Token::Variable(0)]
        );
    }
}
