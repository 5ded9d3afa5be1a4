//! Event-level writer and cursor reader on top of a record store.

use std::path::Path;

use chroma_core::{ChromaError, ErrorInfo};
use chroma_event::Event;

use crate::codec::{decode_event, encode_event_into};
use crate::record::RawEvent;
use crate::store::{FileSink, FileSource, RecordSink, RecordSource};

/// Appends events to a record store, one record per event.
///
/// A single [`RawEvent`] buffer is reused for every write.
#[derive(Debug)]
pub struct EventWriter<S: RecordSink = FileSink> {
    sink: S,
    buffer: RawEvent,
    closed: bool,
}

impl EventWriter<FileSink> {
    /// Creates (or truncates) the event file at `path`.
    pub fn create(path: &Path) -> Result<Self, ChromaError> {
        let sink = FileSink::create(path)?;
        log::info!("writing events to {}", path.display());
        Ok(Self::from_sink(sink))
    }
}

impl<S: RecordSink> EventWriter<S> {
    /// Wraps an already open sink.
    pub fn from_sink(sink: S) -> Self {
        Self {
            sink,
            buffer: RawEvent::default(),
            closed: false,
        }
    }

    /// Encodes `event` and appends it as the next record.
    ///
    /// An event whose columns disagree in length is rejected with a schema
    /// error and nothing is written.
    pub fn write(&mut self, event: &Event) -> Result<(), ChromaError> {
        if self.closed {
            return Err(closed_error("write"));
        }
        encode_event_into(event, &mut self.buffer).map_err(|err| match err {
            ChromaError::Schema(info) => {
                ChromaError::Schema(info.with_context("event", event.id.to_string()))
            }
            other => other,
        })?;
        self.sink.append_record(&self.buffer)?;
        log::debug!(
            "wrote event {} ({} vertices, {} hits)",
            event.id,
            self.buffer.vertices.len(),
            self.buffer.nhit
        );
        Ok(())
    }

    /// Flushes and closes the store. Later writes and closes fail.
    pub fn close(&mut self) -> Result<(), ChromaError> {
        if self.closed {
            return Err(closed_error("close"));
        }
        self.closed = true;
        self.sink.close()?;
        log::info!("closed event store after {} records", self.records_written());
        Ok(())
    }

    /// Number of events written so far.
    pub fn records_written(&self) -> usize {
        self.sink.record_count()
    }

    /// Whether [`EventWriter::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Returns the underlying sink.
    pub fn into_inner(self) -> S {
        self.sink
    }
}

fn closed_error(operation: &str) -> ChromaError {
    ChromaError::Io(
        ErrorInfo::new("writer-closed", "event writer already closed")
            .with_context("operation", operation),
    )
}

/// Random-access reader with a cursor over the events of a record store.
///
/// The cursor starts before the first event. [`EventReader::next_event`] and
/// [`EventReader::previous_event`] move it one step; stepping past either end
/// fails with an index-range error and leaves the cursor unchanged, except
/// that stepping back from the first event resets it to the start.
#[derive(Debug)]
pub struct EventReader<S: RecordSource = FileSource> {
    source: S,
    cursor: Option<usize>,
}

impl EventReader<FileSource> {
    /// Opens the event file at `path`.
    pub fn open(path: &Path) -> Result<Self, ChromaError> {
        let source = FileSource::open(path)?;
        log::info!(
            "opened {} with {} events",
            path.display(),
            source.record_count()
        );
        Ok(Self::from_source(source))
    }
}

impl<S: RecordSource> EventReader<S> {
    /// Wraps an already open source.
    pub fn from_source(source: S) -> Self {
        Self {
            source,
            cursor: None,
        }
    }

    /// Number of events in the store.
    pub fn len(&self) -> usize {
        self.source.record_count()
    }

    /// Whether the store holds no events.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the event last read, or `None` before the first read.
    pub fn position(&self) -> Option<usize> {
        self.cursor
    }

    fn read_at(&mut self, index: usize) -> Result<Event, ChromaError> {
        let raw = self.source.read_record(index)?;
        let event = decode_event(&raw).map_err(|err| match err {
            ChromaError::Schema(info) => {
                ChromaError::Schema(info.with_context("record", index.to_string()))
            }
            other => other,
        })?;
        self.cursor = Some(index);
        Ok(event)
    }

    fn step_error(&self, code: &str, message: &str) -> ChromaError {
        let position = self
            .cursor
            .map_or_else(|| "start".to_string(), |index| index.to_string());
        ChromaError::IndexRange(
            ErrorInfo::new(code, message)
                .with_context("position", position)
                .with_context("len", self.len().to_string()),
        )
    }

    /// Advances the cursor and returns the event there.
    pub fn next_event(&mut self) -> Result<Event, ChromaError> {
        let next = self.cursor.map_or(0, |index| index + 1);
        if next >= self.len() {
            return Err(self.step_error("past-end", "no event after the current position"));
        }
        self.read_at(next)
    }

    /// Moves the cursor back one event and returns it.
    pub fn previous_event(&mut self) -> Result<Event, ChromaError> {
        match self.cursor {
            Some(index) if index > 0 => self.read_at(index - 1),
            _ => {
                let err = self.step_error("before-start", "no event before the current position");
                self.cursor = None;
                Err(err)
            }
        }
    }

    /// Re-reads the event under the cursor.
    pub fn current(&mut self) -> Result<Event, ChromaError> {
        match self.cursor {
            Some(index) => self.read_at(index),
            None => Err(self.step_error("no-current", "no event has been read yet")),
        }
    }

    /// Moves the cursor to `index` and returns the event there.
    pub fn seek(&mut self, index: usize) -> Result<Event, ChromaError> {
        if index >= self.len() {
            return Err(ChromaError::IndexRange(
                ErrorInfo::new("seek-range", "event index out of range")
                    .with_context("index", index.to_string())
                    .with_context("len", self.len().to_string()),
            ));
        }
        self.read_at(index)
    }

    /// Iterates over every event from the first, independent of the cursor.
    pub fn iter(&mut self) -> EventIter<'_, S> {
        EventIter {
            source: &mut self.source,
            next: 0,
        }
    }

    /// Returns the underlying source.
    pub fn into_inner(self) -> S {
        self.source
    }
}

/// Iterator over the events of a store, created by [`EventReader::iter`].
#[derive(Debug)]
pub struct EventIter<'a, S: RecordSource> {
    source: &'a mut S,
    next: usize,
}

impl<S: RecordSource> Iterator for EventIter<'_, S> {
    type Item = Result<Event, ChromaError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.source.record_count() {
            return None;
        }
        let index = self.next;
        self.next += 1;
        Some(
            self.source
                .read_record(index)
                .and_then(|raw| decode_event(&raw)),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.source.record_count().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl<'a, S: RecordSource> IntoIterator for &'a mut EventReader<S> {
    type Item = Result<Event, ChromaError>;
    type IntoIter = EventIter<'a, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
