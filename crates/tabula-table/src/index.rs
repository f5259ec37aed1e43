//! Byte-offset index: key column value -> start of the record holding it.
//!
//! Built by one forward scan with the quote-aware record reader, so quoted
//! fields containing delimiters or line breaks are indexed correctly. The
//! first occurrence of a key wins. While scanning, the source bytes are
//! hashed; `is_stale` compares that digest with the file's current contents.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tabula_core::config::CsvOptions;
use tabula_core::error::Error as CoreError;
use tabula_core::names::{first_duplicate, position_of};
use tabula_core::row::DetachedRow;
use tabula_io::error::Result;
use tabula_io::readers::CsvRecordReader;

#[derive(Debug, Clone)]
pub struct OffsetIndex {
    names: Arc<[String]>,
    key_position: usize,
    offsets: HashMap<String, u64>,
    opts: CsvOptions,
    path: Option<PathBuf>,
    source_len: u64,
    digest: blake3::Hash,
    skipped: u64,
}

impl OffsetIndex {
    /// Index the file at `path` on `key_column`.
    pub fn build(path: impl AsRef<Path>, key_column: &str, opts: &CsvOptions) -> Result<Self> {
        let path = path.as_ref();
        let mut index = Self::build_from(File::open(path)?, key_column, opts)?;
        index.path = Some(path.to_path_buf());
        Ok(index)
    }

    /// Index any reader. Lookups then go through [`OffsetIndex::lookup_in`].
    pub fn build_from<R: Read>(reader: R, key_column: &str, opts: &CsvOptions) -> Result<Self> {
        opts.validate()?;
        let hashing = HashingReader::new(reader);
        let mut records = CsvRecordReader::new(BufReader::new(hashing), opts);
        let header = records.read_header()?.unwrap_or_default();
        if let Some(dup) = first_duplicate(&header) {
            return Err(CoreError::duplicate_column(dup).into());
        }
        let key_position =
            position_of(&header, key_column).ok_or_else(|| CoreError::unknown_column(key_column))?;

        let mut offsets = HashMap::new();
        let mut skipped = 0u64;
        loop {
            match records.next_record() {
                Ok(Some(rec)) if rec.fields.len() > header.len() => {
                    tracing::debug!(line = rec.line, "skipping record wider than the header");
                    skipped += 1;
                }
                Ok(Some(rec)) => match rec.fields.into_iter().nth(key_position) {
                    Some(key) => {
                        offsets.entry(key).or_insert(rec.offset);
                    }
                    None => skipped += 1,
                },
                Ok(None) => break,
                Err(e) if e.is_parse() => {
                    tracing::debug!(error = %e, "skipping unparseable record while indexing");
                    skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        let mut opts = opts.clone();
        opts.delimiter = records.delimiter().or(opts.delimiter);
        let hashing = records.into_inner().into_inner();
        let (source_len, digest) = hashing.finish();
        tracing::debug!(
            keys = offsets.len(),
            skipped,
            bytes = source_len,
            key = key_column,
            "built offset index"
        );
        Ok(Self {
            names: header.into(),
            key_position,
            offsets,
            opts,
            path: None,
            source_len,
            digest,
            skipped,
        })
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.offsets.contains_key(key)
    }

    pub fn offset_of(&self, key: &str) -> Option<u64> {
        self.offsets.get(key).copied()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.offsets.keys().map(String::as_str)
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn key_column(&self) -> &str {
        &self.names[self.key_position]
    }

    /// Records that could not contribute a key (too short, too wide or unparseable).
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Read the row for `key` from the indexed file. `Ok(None)` if the key is unknown.
    pub fn lookup(&self, key: &str) -> Result<Option<DetachedRow>> {
        let Some(path) = &self.path else {
            return Err(CoreError::Argument(
                "index was built from a reader; use lookup_in with a seekable handle".into(),
            )
            .into());
        };
        if !self.offsets.contains_key(key) {
            return Ok(None);
        }
        let mut file = File::open(path)?;
        self.lookup_in(&mut file, key)
    }

    /// Read the row for `key` from `source`, which must hold the indexed bytes.
    pub fn lookup_in<S: Read + Seek>(&self, source: &mut S, key: &str) -> Result<Option<DetachedRow>> {
        let Some(offset) = self.offset_of(key) else {
            return Ok(None);
        };
        source.seek(SeekFrom::Start(offset))?;
        let mut records = CsvRecordReader::new(BufReader::new(source), &self.opts).starting_at(offset, 0);
        let stale = || -> tabula_io::error::Error {
            CoreError::Argument(format!(
                "record for key '{key}' at offset {offset} no longer matches; the source changed after indexing"
            ))
            .into()
        };
        let rec = records.next_record()?.ok_or_else(stale)?;
        let width = self.names.len();
        if rec.fields.len() > width || rec.fields.get(self.key_position).map(String::as_str) != Some(key) {
            return Err(stale());
        }
        let mut fields = rec.fields;
        fields.resize(width, String::new());
        Ok(Some(DetachedRow::new(self.names.clone(), fields)?))
    }

    /// True if the indexed file's bytes differ from what was scanned.
    pub fn is_stale(&self) -> Result<bool> {
        let Some(path) = &self.path else {
            return Ok(false);
        };
        let mut hashing = HashingReader::new(File::open(path)?);
        std::io::copy(&mut hashing, &mut std::io::sink())?;
        let (len, digest) = hashing.finish();
        Ok(len != self.source_len || digest != self.digest)
    }
}

/// Counts and hashes every byte read through it.
struct HashingReader<R> {
    inner: R,
    hasher: blake3::Hasher,
    len: u64,
}

impl<R: Read> HashingReader<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            hasher: blake3::Hasher::new(),
            len: 0,
        }
    }

    fn finish(self) -> (u64, blake3::Hash) {
        (self.len, self.hasher.finalize())
    }
}

impl<R: Read> Read for HashingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.hasher.update(&buf[..n]);
        self.len += n as u64;
        Ok(n)
    }
}
