//! Row-major, read-only table over a file or stream.
//!
//! The header is read once at open and cached. Each `rows()` call starts a
//! new pass: a path is reopened, a seekable handle is rewound to the first
//! data byte, a one-shot reader is handed over (and cannot be replayed).
//! Nothing is read before the first row is pulled, and the handle is
//! released as soon as the pass is exhausted or dropped.
//!
//! Malformed records (too many fields, an unterminated quote) are dropped
//! and counted; short records are padded.

use std::cell::{Cell, RefCell, RefMut};
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tabula_core::config::CsvOptions;
use tabula_core::error::Error as CoreError;
use tabula_core::names::first_duplicate;
use tabula_core::row::DetachedRow;
use tabula_io::error::Result;
use tabula_io::readers::CsvRecordReader;

use crate::mutable::MutableDataTable;
use crate::table::DataTable;

/// A readable, seekable handle.
pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek> ReadSeek for T {}

enum Source {
    Path(PathBuf),
    Seekable(RefCell<Box<dyn ReadSeek>>),
    Once(RefCell<Option<Box<dyn BufRead>>>),
}

pub struct StreamingTable {
    source: Source,
    opts: CsvOptions,
    names: Arc<[String]>,
    /// Byte offset and physical line count just past the header.
    data_start: (u64, usize),
    dropped: Cell<u64>,
}

impl StreamingTable {
    /// Stream a file; every pass reopens it.
    pub fn open(path: impl AsRef<Path>, opts: &CsvOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let (records, names) = read_header(Box::new(BufReader::new(file)), opts)?;
        Self::finish(Source::Path(path), records, names, opts)
    }

    /// Stream a seekable handle; every pass seeks back to the first data row.
    pub fn from_seekable<S: Read + Seek + 'static>(mut source: S, opts: &CsvOptions) -> Result<Self> {
        source.seek(SeekFrom::Start(0))?;
        let mut boxed: Box<dyn ReadSeek> = Box::new(source);
        let (records, names) = read_header(Box::new(BufReader::new(&mut boxed)), opts)?;
        let delimiter = records.delimiter();
        let data_start = (records.position(), records.line());
        drop(records);
        let mut opts = opts.clone();
        opts.delimiter = delimiter.or(opts.delimiter);
        Ok(Self {
            source: Source::Seekable(RefCell::new(boxed)),
            opts,
            names,
            data_start,
            dropped: Cell::new(0),
        })
    }

    /// Stream a reader exactly once.
    pub fn from_reader<R: Read + 'static>(reader: R, opts: &CsvOptions) -> Result<Self> {
        let (records, names) = read_header(Box::new(BufReader::new(reader)), opts)?;
        let (pos, line, delimiter) = (records.position(), records.line(), records.delimiter());
        let rest = records.into_inner();
        let mut opts = opts.clone();
        opts.delimiter = delimiter.or(opts.delimiter);
        Ok(Self {
            source: Source::Once(RefCell::new(Some(rest))),
            opts,
            names,
            data_start: (pos, line),
            dropped: Cell::new(0),
        })
    }

    fn finish(
        source: Source,
        records: CsvRecordReader<Box<dyn BufRead + '_>>,
        names: Arc<[String]>,
        opts: &CsvOptions,
    ) -> Result<Self> {
        let mut opts = opts.clone();
        opts.delimiter = records.delimiter().or(opts.delimiter);
        Ok(Self {
            source,
            opts,
            data_start: (records.position(), records.line()),
            names,
            dropped: Cell::new(0),
        })
    }

    /// Rows dropped across every pass so far.
    pub fn dropped_rows(&self) -> u64 {
        self.dropped.get()
    }

    pub fn options(&self) -> &CsvOptions {
        &self.opts
    }

    /// Read every row into memory.
    pub fn materialize(&self) -> Result<MutableDataTable> {
        MutableDataTable::from_table(self)
    }

    fn open_pass(&self) -> Result<Box<dyn BufRead + '_>> {
        let (start, _) = self.data_start;
        match &self.source {
            Source::Path(path) => {
                let mut file = File::open(path)?;
                file.seek(SeekFrom::Start(start))?;
                Ok(Box::new(BufReader::new(file)))
            }
            Source::Seekable(cell) => {
                let mut handle = cell.try_borrow_mut().map_err(|_| {
                    CoreError::Argument("stream is already being enumerated".into())
                })?;
                handle.seek(SeekFrom::Start(start))?;
                Ok(Box::new(BufReader::new(Borrowed(handle))))
            }
            Source::Once(cell) => {
                match cell.try_borrow_mut().ok().and_then(|mut slot| slot.take()) {
                    Some(input) => Ok(input),
                    None => Err(CoreError::Argument(
                        "one-shot stream was already enumerated; use a seekable source for repeated passes"
                            .into(),
                    )
                    .into()),
                }
            }
        }
    }
}

fn read_header<'a>(
    input: Box<dyn BufRead + 'a>,
    opts: &CsvOptions,
) -> Result<(CsvRecordReader<Box<dyn BufRead + 'a>>, Arc<[String]>)> {
    opts.validate()?;
    let mut records = CsvRecordReader::new(input, opts);
    let header = records.read_header()?.unwrap_or_default();
    if let Some(dup) = first_duplicate(&header) {
        return Err(CoreError::duplicate_column(dup).into());
    }
    Ok((records, header.into()))
}

/// `Read` through a `RefMut` so a pass holds the handle exclusively.
struct Borrowed<'a>(RefMut<'a, Box<dyn ReadSeek>>);

impl Read for Borrowed<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.0.read(buf)
    }
}

/// One pass over a [`StreamingTable`].
pub struct StreamingRows<'a> {
    reader: Option<CsvRecordReader<Box<dyn BufRead + 'a>>>,
    names: Arc<[String]>,
    dropped: &'a Cell<u64>,
    pass_dropped: u64,
}

impl StreamingRows<'_> {
    /// Rows dropped during this pass so far.
    pub fn dropped(&self) -> u64 {
        self.pass_dropped
    }

    fn drop_row(&mut self, line: usize, why: &str) {
        tracing::trace!(line, why, "dropping malformed row");
        self.pass_dropped += 1;
        self.dropped.set(self.dropped.get() + 1);
    }

    fn close(&mut self) {
        if self.reader.take().is_some() && self.pass_dropped > 0 {
            tracing::warn!(dropped = self.pass_dropped, "streaming pass dropped malformed rows");
        }
    }
}

impl Iterator for StreamingRows<'_> {
    type Item = Result<DetachedRow>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let reader = self.reader.as_mut()?;
            let line = reader.line() + 1;
            match reader.next_record() {
                Ok(None) => {
                    self.close();
                    return None;
                }
                Ok(Some(rec)) => {
                    let width = self.names.len();
                    if rec.fields.len() > width {
                        self.drop_row(rec.line, "too many fields");
                        continue;
                    }
                    let mut fields = rec.fields;
                    fields.resize(width, String::new());
                    return Some(DetachedRow::new(self.names.clone(), fields).map_err(Into::into));
                }
                Err(e) if e.is_parse() => {
                    self.drop_row(line, "unterminated quote");
                }
                Err(e) => {
                    self.close();
                    return Some(Err(e));
                }
            }
        }
    }
}

impl DataTable for StreamingTable {
    type Row<'a> = DetachedRow;
    type Rows<'a> = StreamingRows<'a>;

    fn column_names(&self) -> Vec<String> {
        self.names.to_vec()
    }

    fn rows(&self) -> Result<StreamingRows<'_>> {
        let input = self.open_pass()?;
        let (pos, line) = self.data_start;
        tracing::debug!(offset = pos, "opening streaming pass");
        let reader = CsvRecordReader::new(input, &self.opts).starting_at(pos, line);
        Ok(StreamingRows {
            reader: Some(reader),
            names: self.names.clone(),
            dropped: &self.dropped,
            pass_dropped: 0,
        })
    }
}
