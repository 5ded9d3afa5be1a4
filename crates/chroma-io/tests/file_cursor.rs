mod common;

use std::fs;
use std::io::Write;

use chroma_core::ChromaError;
use chroma_event::Event;
use chroma_io::{EventReader, EventWriter, MemoryStore};
use tempfile::tempdir;

use common::full_event;

const K: usize = 4;

fn write_events(path: &std::path::Path, count: usize) -> Vec<Event> {
    let events: Vec<Event> = (0..count as u64).map(full_event).collect();
    let mut writer = EventWriter::create(path).unwrap();
    for event in &events {
        writer.write(event).unwrap();
    }
    assert_eq!(writer.records_written(), count);
    writer.close().unwrap();
    events
}

#[test]
fn written_events_read_back_in_order() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.bin");
    let events = write_events(&path, K);

    let mut reader = EventReader::open(&path).unwrap();
    assert_eq!(reader.len(), K);
    assert!(!reader.is_empty());
    assert_eq!(reader.position(), None);
    for expected in &events {
        assert_eq!(&reader.next_event().unwrap(), expected);
    }
    assert_eq!(reader.position(), Some(K - 1));
}

#[test]
fn cursor_stops_at_both_ends() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.bin");
    write_events(&path, K);
    let mut reader = EventReader::open(&path).unwrap();

    assert_eq!(reader.seek(K - 1).unwrap().id, (K - 1) as u64);
    let err = reader.next_event().unwrap_err();
    assert!(err.is_index_range());
    assert_eq!(reader.position(), Some(K - 1));

    assert_eq!(reader.seek(0).unwrap().id, 0);
    let err = reader.previous_event().unwrap_err();
    assert!(err.is_index_range());
    assert_eq!(reader.position(), None);
    assert_eq!(reader.next_event().unwrap().id, 0);
}

#[test]
fn seek_moves_the_cursor() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.bin");
    write_events(&path, K);
    let mut reader = EventReader::open(&path).unwrap();

    reader.seek(2).unwrap();
    assert_eq!(reader.position(), Some(2));
    assert_eq!(reader.current().unwrap().id, 2);
    assert_eq!(reader.previous_event().unwrap().id, 1);
    assert_eq!(reader.next_event().unwrap().id, 2);

    let err = reader.seek(K).unwrap_err();
    assert!(err.is_index_range());
    assert_eq!(err.info().code, "seek-range");
    assert_eq!(reader.position(), Some(2));
}

#[test]
fn current_before_first_read_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.bin");
    write_events(&path, 1);
    let mut reader = EventReader::open(&path).unwrap();
    assert!(reader.current().unwrap_err().is_index_range());
}

#[test]
fn iteration_restarts_on_every_call() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.bin");
    let events = write_events(&path, K);
    let mut reader = EventReader::open(&path).unwrap();
    reader.seek(2).unwrap();

    for _ in 0..2 {
        let ids: Vec<u64> = reader.iter().map(|event| event.unwrap().id).collect();
        assert_eq!(ids, events.iter().map(|e| e.id).collect::<Vec<_>>());
    }
    assert_eq!(reader.iter().size_hint(), (K, Some(K)));
    assert_eq!(reader.position(), Some(2));

    let mut count = 0;
    for event in &mut reader {
        event.unwrap();
        count += 1;
    }
    assert_eq!(count, K);
}

#[test]
fn empty_file_has_no_events() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.bin");
    write_events(&path, 0);
    let mut reader = EventReader::open(&path).unwrap();
    assert!(reader.is_empty());
    assert!(reader.next_event().unwrap_err().is_index_range());
    assert_eq!(reader.iter().count(), 0);
}

#[test]
fn write_after_close_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.bin");
    let mut writer = EventWriter::create(&path).unwrap();
    writer.write(&full_event(0)).unwrap();
    writer.close().unwrap();
    assert!(writer.is_closed());

    let err = writer.write(&full_event(1)).unwrap_err();
    assert!(matches!(err, ChromaError::Io(_)));
    assert_eq!(err.info().code, "writer-closed");
    assert_eq!(writer.close().unwrap_err().info().code, "writer-closed");
    assert_eq!(EventReader::open(&path).unwrap().len(), 1);
}

#[test]
fn malformed_events_are_not_written() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.bin");
    let mut writer = EventWriter::create(&path).unwrap();

    let mut short_photons = full_event(0);
    if let Some(photons) = short_photons.photons_beg.as_mut() {
        photons.t.pop();
    }
    let err = writer.write(&short_photons).unwrap_err();
    assert!(matches!(err, ChromaError::Schema(_)));
    assert_eq!(err.info().code, "photon-column-length");
    assert_eq!(err.info().context.get("event").map(String::as_str), Some("0"));

    let mut short_channels = full_event(1);
    if let Some(channels) = short_channels.channels.as_mut() {
        channels.flags.truncate(2);
    }
    let err = writer.write(&short_channels).unwrap_err();
    assert_eq!(err.info().code, "channel-column-length");
    assert_eq!(writer.records_written(), 0);

    writer.write(&full_event(2)).unwrap();
    writer.close().unwrap();

    let mut reader = EventReader::open(&path).unwrap();
    assert_eq!(reader.len(), 1);
    assert_eq!(reader.next_event().unwrap(), full_event(2));
}

#[test]
fn create_truncates_existing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.bin");
    write_events(&path, K);
    write_events(&path, 2);
    assert_eq!(EventReader::open(&path).unwrap().len(), 2);
}

#[test]
fn foreign_file_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    fs::write(&path, b"definitely not events").unwrap();
    let err = EventReader::open(&path).unwrap_err();
    assert!(matches!(err, ChromaError::Schema(_)));
    assert_eq!(err.info().code, "bad-magic");
    assert!(err.info().hint.is_some());
}

#[test]
fn truncated_file_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.bin");
    write_events(&path, 2);
    let bytes = fs::read(&path).unwrap();
    let mut file = fs::File::create(&path).unwrap();
    file.write_all(&bytes[..bytes.len() - 5]).unwrap();
    drop(file);

    let err = EventReader::open(&path).unwrap_err();
    assert!(matches!(err, ChromaError::Schema(_)));
    assert_eq!(err.info().code, "truncated-record");
    assert_eq!(err.info().context.get("record").map(String::as_str), Some("1"));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempdir().unwrap();
    let err = EventReader::open(&dir.path().join("absent.bin")).unwrap_err();
    assert!(matches!(err, ChromaError::Io(_)));
}

#[test]
fn memory_store_backs_writer_and_reader() {
    let mut writer = EventWriter::from_sink(MemoryStore::new());
    for id in 0..3 {
        writer.write(&full_event(id)).unwrap();
    }
    writer.close().unwrap();
    let store = writer.into_inner();
    assert_eq!(store.records().len(), 3);

    let mut reader = EventReader::from_source(store);
    assert_eq!(reader.seek(1).unwrap(), full_event(1));
    assert_eq!(reader.next_event().unwrap().id, 2);
}
