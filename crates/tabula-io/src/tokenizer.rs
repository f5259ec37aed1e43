//! Line-level field splitting.
//!
//! Grammar:
//! - A field whose first non-blank character is `"` is quoted; inside it the
//!   delimiter, CR and LF are literal and `""` stands for one quote.
//! - The closing quote ends the quoted part; anything up to the next
//!   delimiter is appended after trimming.
//! - Unquoted fields are trimmed when `trim` is set.
//! - A quote left open at end of input is an error.

use tabula_core::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tokenizer {
    pub delimiter: char,
    pub trim: bool,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    Unquoted,
    Quoted,
    AfterQuote,
}

impl Tokenizer {
    pub fn new(delimiter: char, trim: bool) -> Self {
        Self { delimiter, trim }
    }

    /// Split one logical record. `line_no` is only used for error messages.
    pub fn split_line(&self, text: &str, line_no: usize) -> Result<Vec<String>> {
        self.try_split(text).ok_or_else(|| Error::Parse {
            line: line_no,
            message: "unterminated quoted field".into(),
        })
    }

    /// `None` when a quoted field is still open at the end of `text`.
    pub fn try_split(&self, text: &str) -> Option<Vec<String>> {
        let mut fields = Vec::new();
        let mut cur = String::new();
        let mut tail = String::new();
        let mut state = State::Start;
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            match state {
                _ if c == self.delimiter && state != State::Quoted => {
                    fields.push(self.finish(&mut cur, &mut tail, state));
                    state = State::Start;
                }
                State::Start => {
                    if c == '"' {
                        cur.clear();
                        state = State::Quoted;
                    } else {
                        cur.push(c);
                        if !(self.trim && c.is_whitespace()) {
                            state = State::Unquoted;
                        }
                    }
                }
                State::Unquoted => cur.push(c),
                State::Quoted => {
                    if c == '"' {
                        if chars.peek() == Some(&'"') {
                            chars.next();
                            cur.push('"');
                        } else {
                            state = State::AfterQuote;
                        }
                    } else {
                        cur.push(c);
                    }
                }
                State::AfterQuote => tail.push(c),
            }
        }

        if state == State::Quoted {
            return None;
        }
        fields.push(self.finish(&mut cur, &mut tail, state));
        Some(fields)
    }

    fn finish(&self, cur: &mut String, tail: &mut String, state: State) -> String {
        let mut value = std::mem::take(cur);
        let tail = std::mem::take(tail);
        match state {
            State::AfterQuote => {
                value.push_str(if self.trim { tail.trim() } else { &tail });
                value
            }
            _ if self.trim => value.trim().to_string(),
            _ => value,
        }
    }
}

/// Split `line` with trimming on; an unterminated quote is a parse error.
pub fn split(line: &str, delimiter: char) -> Result<Vec<String>> {
    Tokenizer::new(delimiter, true).split_line(line, 1)
}
