//! Quote-aware CSV record reader with byte offsets.
//!
//! Pulls physical lines from a `BufRead` and joins them into logical records:
//! while a quoted field is still open at the end of a line, the next line is
//! appended (terminator included) and the record is tokenized again.
//!
//! Caveats:
//! - Blank lines are skipped.
//! - A record spanning more than `max_record_lines` lines, or still open at
//!   EOF, is reported as `Error::Parse`. Only its first line is consumed; the
//!   lines pulled in after it are replayed, so a caller that keeps reading
//!   loses nothing but the offending line.

use std::collections::VecDeque;
use std::io::BufRead;

use tabula_core::config::CsvOptions;
use tabula_core::error::Error as CoreError;

use crate::error::Result;
use crate::tokenizer::Tokenizer;

/// One logical record and where it started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub fields: Vec<String>,
    /// Byte offset of the record's first character in the source.
    pub offset: u64,
    /// 1-based physical line number of the record's first line.
    pub line: usize,
}

pub struct CsvRecordReader<R: BufRead> {
    inner: R,
    delimiter: Option<char>,
    trim: bool,
    max_record_lines: usize,
    pos: u64,
    line: usize,
    /// Physical lines handed back after a failed record, replayed first.
    pending: VecDeque<String>,
}

impl<R: BufRead> CsvRecordReader<R> {
    pub fn new(inner: R, opts: &CsvOptions) -> Self {
        Self {
            inner,
            delimiter: opts.delimiter,
            trim: opts.trim,
            max_record_lines: opts.max_record_lines.max(1),
            pos: 0,
            line: 0,
            pending: VecDeque::new(),
        }
    }

    /// Resume from a known position, e.g. after seeking the underlying handle.
    pub fn starting_at(mut self, offset: u64, line: usize) -> Self {
        self.pos = offset;
        self.line = line;
        self
    }

    /// Delimiter in effect; `None` until the first record is read when detecting.
    pub fn delimiter(&self) -> Option<char> {
        self.delimiter
    }

    pub fn set_delimiter(&mut self, delimiter: char) {
        self.delimiter = Some(delimiter);
    }

    /// Bytes consumed so far (including any starting offset).
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Physical lines consumed so far.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Read the header: the first record, which also fixes the delimiter.
    pub fn read_header(&mut self) -> Result<Option<Vec<String>>> {
        Ok(self.next_record()?.map(|r| r.fields))
    }

    pub fn next_record(&mut self) -> Result<Option<Record>> {
        let mut raw = String::new();
        loop {
            raw.clear();
            let offset = self.pos;
            let first_line = self.line + 1;
            let mut physical = 0usize;
            let mut first_len = 0usize;

            loop {
                let n = self.read_physical(&mut raw)?;
                if n == 0 {
                    if physical == 0 {
                        return Ok(None);
                    }
                    self.unread_after(&raw, first_len);
                    return Err(unterminated(first_line, "quoted field still open at end of input"));
                }
                self.pos += n as u64;
                self.line += 1;
                physical += 1;
                if physical == 1 {
                    first_len = n;
                }

                let text = strip_terminator(&raw);
                if physical == 1 && text.is_empty() {
                    break;
                }
                let delimiter = *self
                    .delimiter
                    .get_or_insert_with(|| tabula_core::config::detect_delimiter(text));
                let tokenizer = Tokenizer::new(delimiter, self.trim);
                if let Some(fields) = tokenizer.try_split(text) {
                    return Ok(Some(Record {
                        fields,
                        offset,
                        line: first_line,
                    }));
                }
                if physical >= self.max_record_lines {
                    tracing::debug!(line = first_line, physical, "giving up on runaway quoted record");
                    self.unread_after(&raw, first_len);
                    return Err(unterminated(
                        first_line,
                        &format!("quoted field spans more than {} lines", self.max_record_lines),
                    ));
                }
            }
            // blank line: start over
        }
    }

    fn read_physical(&mut self, buf: &mut String) -> Result<usize> {
        match self.pending.pop_front() {
            Some(line) => {
                buf.push_str(&line);
                Ok(line.len())
            }
            None => Ok(self.inner.read_line(buf)?),
        }
    }

    /// Hand back every line of `raw` past its first `first_len` bytes.
    fn unread_after(&mut self, raw: &str, first_len: usize) {
        let rest = &raw[first_len..];
        for line in rest.split_inclusive('\n').rev() {
            self.pos -= line.len() as u64;
            self.line -= 1;
            self.pending.push_front(line.to_string());
        }
    }

    /// The underlying reader. Lines handed back after a failed record are lost.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: BufRead> Iterator for CsvRecordReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

fn unterminated(line: usize, message: &str) -> crate::error::Error {
    CoreError::Parse {
        line,
        message: message.to_string(),
    }
    .into()
}

/// Drop one trailing `\n` or `\r\n`.
fn strip_terminator(raw: &str) -> &str {
    let s = raw.strip_suffix('\n').unwrap_or(raw);
    s.strip_suffix('\r').unwrap_or(s)
}
