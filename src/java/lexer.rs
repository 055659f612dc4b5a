#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Blanks out comments and string/char literals in Java source while keeping
//! every line and column where it was.

use std::fmt;

/// Which construct the scanner is currently inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Plain code.
    Normal,
    /// After `//`, until the end of the line.
    LineComment,
    /// Between `/*` and `*/`.
    BlockComment,
    /// Inside a `"` string literal.
    Str,
    /// Inside a `'` char literal.
    Char,
}

/// Source text with every comment and literal character replaced by a space.
///
/// Line breaks are never blanked, so the view has exactly as many lines as the
/// source and each line has the same number of characters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StructuralView {
    /// the blanked text
    text: String,
}

impl StructuralView {
    /// Returns the blanked text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Iterates over the lines of the view, split on `\n`.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }
}

impl fmt::Display for StructuralView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Pushes the blanked form of `c`.
fn blank(out: &mut String, c: char) {
    match c {
        '\n' | '\r' => out.push(c),
        _ => out.push(' '),
    }
}

/// Scans `code` once, left to right, and blanks comments and literals.
///
/// Whichever construct opens first wins: a `//` inside a string stays part of
/// the string and a quote inside a comment opens nothing. Unterminated
/// comments and literals run to the end of input.
pub fn strip(code: &str) -> StructuralView {
    let mut out = String::with_capacity(code.len());
    let mut state = State::Normal;
    let mut escaped = false;
    let mut chars = code.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            State::Normal => match (c, chars.peek().copied()) {
                ('/', Some('/')) => {
                    chars.next();
                    out.push_str("  ");
                    state = State::LineComment;
                }
                ('/', Some('*')) => {
                    chars.next();
                    out.push_str("  ");
                    state = State::BlockComment;
                }
                ('"', _) => {
                    out.push(' ');
                    state = State::Str;
                }
                ('\'', _) => {
                    out.push(' ');
                    state = State::Char;
                }
                _ => out.push(c),
            },
            State::LineComment => {
                if c == '\n' {
                    out.push(c);
                    state = State::Normal;
                } else {
                    blank(&mut out, c);
                }
            }
            State::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    out.push_str("  ");
                    state = State::Normal;
                } else {
                    blank(&mut out, c);
                }
            }
            State::Str | State::Char => {
                let close = if state == State::Str { '"' } else { '\'' };
                blank(&mut out, c);
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == close {
                    state = State::Normal;
                }
            }
        }
    }

    StructuralView { text: out }
}
