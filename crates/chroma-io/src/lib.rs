#![deny(missing_docs)]
#![doc = "Event file I/O: fixed-schema record blocks, the codec between them and the event model, and sequential/random-access event files."]

/// Conversion between [`chroma_event::Event`] and [`record::RawEvent`].
pub mod codec;
/// Event file writer and reader.
pub mod file;
/// Fixed-schema on-disk record blocks.
pub mod record;
/// Record store contracts and the binary file store.
pub mod store;

pub use codec::{decode_event, encode_event, encode_event_into};
pub use file::{EventIter, EventReader, EventWriter};
pub use record::{RawChannel, RawEvent, RawPhotons, RawVertex};
pub use store::{FileSink, FileSource, MemoryStore, RecordSink, RecordSource};
