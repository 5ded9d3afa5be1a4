//! Record stores: where encoded events live.
//!
//! The file store layout is an 8-byte magic tag followed by records, each a
//! little-endian `u64` byte length and a `bincode` encoded [`RawEvent`].
//! There is no version field; reader and writer must agree on the record
//! schema.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chroma_core::{ChromaError, ErrorInfo};

use crate::record::RawEvent;

/// Magic tag opening every event file.
pub const MAGIC: &[u8; 8] = b"CHROMAEV";

/// Append-only destination for records.
pub trait RecordSink {
    /// Appends one record.
    fn append_record(&mut self, record: &RawEvent) -> Result<(), ChromaError>;

    /// Number of records appended so far.
    fn record_count(&self) -> usize;

    /// Flushes and finalises the store.
    fn close(&mut self) -> Result<(), ChromaError>;
}

/// Random-access source of records.
pub trait RecordSource {
    /// Number of records available.
    fn record_count(&self) -> usize;

    /// Reads the record at `index`.
    fn read_record(&mut self, index: usize) -> Result<RawEvent, ChromaError>;
}

fn out_of_range(index: usize, len: usize) -> ChromaError {
    ChromaError::IndexRange(
        ErrorInfo::new("record-index", "record index out of range")
            .with_context("index", index.to_string())
            .with_context("len", len.to_string()),
    )
}

fn with_path(err: ChromaError, path: &Path) -> ChromaError {
    let path = path.display().to_string();
    match err {
        ChromaError::Io(info) => ChromaError::Io(info.with_context("path", path)),
        ChromaError::Schema(info) => ChromaError::Schema(info.with_context("path", path)),
        other => other,
    }
}

/// File-backed [`RecordSink`].
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    count: usize,
}

impl FileSink {
    /// Creates `path`, truncating any existing file, and writes the magic tag.
    pub fn create(path: &Path) -> Result<Self, ChromaError> {
        let file = File::create(path)
            .map_err(|err| with_path(ChromaError::io("open-write", &err), path))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(MAGIC)
            .map_err(|err| with_path(ChromaError::io("write-magic", &err), path))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: Some(writer),
            count: 0,
        })
    }
}

impl RecordSink for FileSink {
    fn append_record(&mut self, record: &RawEvent) -> Result<(), ChromaError> {
        let writer = self.writer.as_mut().ok_or_else(|| {
            ChromaError::Io(
                ErrorInfo::new("sink-closed", "record store already closed")
                    .with_context("path", self.path.display().to_string()),
            )
        })?;
        let bytes = bincode::serialize(record).map_err(|err| {
            ChromaError::Schema(ErrorInfo::new("record-encode", err.to_string()))
        })?;
        writer
            .write_all(&(bytes.len() as u64).to_le_bytes())
            .and_then(|_| writer.write_all(&bytes))
            .map_err(|err| with_path(ChromaError::io("write-record", &err), &self.path))?;
        self.count += 1;
        Ok(())
    }

    fn record_count(&self) -> usize {
        self.count
    }

    fn close(&mut self) -> Result<(), ChromaError> {
        let mut writer = self.writer.take().ok_or_else(|| {
            ChromaError::Io(
                ErrorInfo::new("sink-closed", "record store already closed")
                    .with_context("path", self.path.display().to_string()),
            )
        })?;
        writer
            .flush()
            .map_err(|err| with_path(ChromaError::io("flush", &err), &self.path))?;
        writer
            .get_ref()
            .sync_all()
            .map_err(|err| with_path(ChromaError::io("sync", &err), &self.path))
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            if let Err(err) = writer.flush() {
                log::warn!(
                    "failed to flush unclosed event file {}: {err}",
                    self.path.display()
                );
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct RecordSpan {
    offset: u64,
    len: u64,
}

/// File-backed [`RecordSource`]; record offsets are indexed at open.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    reader: BufReader<File>,
    spans: Vec<RecordSpan>,
}

impl FileSource {
    /// Opens `path`, checks the magic tag and indexes every record.
    pub fn open(path: &Path) -> Result<Self, ChromaError> {
        let file =
            File::open(path).map_err(|err| with_path(ChromaError::io("open-read", &err), path))?;
        let file_len = file
            .metadata()
            .map_err(|err| with_path(ChromaError::io("metadata", &err), path))?
            .len();
        let mut reader = BufReader::new(file);

        let mut magic = [0u8; 8];
        if file_len < MAGIC.len() as u64 || reader.read_exact(&mut magic).is_err() || &magic != MAGIC
        {
            return Err(with_path(
                ChromaError::Schema(
                    ErrorInfo::new("bad-magic", "not an event file")
                        .with_hint("event files start with the CHROMAEV tag"),
                ),
                path,
            ));
        }

        let mut spans = Vec::new();
        let mut cursor = MAGIC.len() as u64;
        while cursor < file_len {
            let record = spans.len();
            let truncated = |at: u64| {
                with_path(
                    ChromaError::Schema(
                        ErrorInfo::new("truncated-record", "record extends past end of file")
                            .with_context("record", record.to_string())
                            .with_context("offset", at.to_string()),
                    ),
                    path,
                )
            };
            if cursor + 8 > file_len {
                return Err(truncated(cursor));
            }
            reader
                .seek(SeekFrom::Start(cursor))
                .map_err(|err| with_path(ChromaError::io("seek", &err), path))?;
            let mut len_bytes = [0u8; 8];
            reader
                .read_exact(&mut len_bytes)
                .map_err(|err| with_path(ChromaError::io("read-length", &err), path))?;
            let len = u64::from_le_bytes(len_bytes);
            let end = (cursor + 8).checked_add(len).filter(|end| *end <= file_len);
            match end {
                Some(end) => {
                    spans.push(RecordSpan {
                        offset: cursor + 8,
                        len,
                    });
                    cursor = end;
                }
                None => return Err(truncated(cursor)),
            }
        }
        Ok(Self {
            path: path.to_path_buf(),
            reader,
            spans,
        })
    }
}

impl RecordSource for FileSource {
    fn record_count(&self) -> usize {
        self.spans.len()
    }

    fn read_record(&mut self, index: usize) -> Result<RawEvent, ChromaError> {
        let span = *self
            .spans
            .get(index)
            .ok_or_else(|| out_of_range(index, self.spans.len()))?;
        self.reader
            .seek(SeekFrom::Start(span.offset))
            .map_err(|err| with_path(ChromaError::io("seek", &err), &self.path))?;
        let mut bytes = vec![0u8; span.len as usize];
        self.reader
            .read_exact(&mut bytes)
            .map_err(|err| with_path(ChromaError::io("read-record", &err), &self.path))?;
        bincode::deserialize(&bytes).map_err(|err| {
            ChromaError::Schema(
                ErrorInfo::new("record-decode", err.to_string())
                    .with_context("index", index.to_string())
                    .with_context("path", self.path.display().to_string()),
            )
        })
    }
}

/// In-memory store implementing both sides, for tests and pipelines that
/// never touch disk.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<RawEvent>,
    closed: bool,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records stored so far.
    pub fn records(&self) -> &[RawEvent] {
        &self.records
    }
}

impl RecordSink for MemoryStore {
    fn append_record(&mut self, record: &RawEvent) -> Result<(), ChromaError> {
        if self.closed {
            return Err(ChromaError::Io(ErrorInfo::new(
                "sink-closed",
                "record store already closed",
            )));
        }
        self.records.push(record.clone());
        Ok(())
    }

    fn record_count(&self) -> usize {
        self.records.len()
    }

    fn close(&mut self) -> Result<(), ChromaError> {
        self.closed = true;
        Ok(())
    }
}

impl RecordSource for MemoryStore {
    fn record_count(&self) -> usize {
        self.records.len()
    }

    fn read_record(&mut self, index: usize) -> Result<RawEvent, ChromaError> {
        self.records
            .get(index)
            .cloned()
            .ok_or_else(|| out_of_range(index, self.records.len()))
    }
}
