//! Field-by-field conversion between the event model and record blocks.
//!
//! The file format conflates an absent photon bundle with an empty one: both
//! are written as a zero-size block and both read back as `None`. Channels
//! keep the distinction through `nchannels`.

use chroma_core::{ChromaError, ErrorInfo};
use chroma_event::{Channels, Event, Photons, Vertex};

use crate::record::{RawChannel, RawEvent, RawPhotons, RawVertex};

fn schema_error(code: &str, message: &str, context: &[(&str, String)]) -> ChromaError {
    let mut info = ErrorInfo::new(code, message);
    for (key, value) in context {
        info = info.with_context(*key, value.clone());
    }
    ChromaError::Schema(info)
}

fn flatten(into: &mut Vec<f32>, rows: &[[f32; 3]]) {
    into.clear();
    into.reserve(rows.len() * 3);
    for row in rows {
        into.extend_from_slice(row);
    }
}

fn unflatten(column: &str, flat: &[f32], n: usize) -> Result<Vec<[f32; 3]>, ChromaError> {
    if flat.len() != 3 * n {
        return Err(schema_error(
            "photon-block-length",
            "vector column does not hold 3 entries per photon",
            &[
                ("column", column.to_string()),
                ("expected", (3 * n).to_string()),
                ("actual", flat.len().to_string()),
            ],
        ));
    }
    Ok(flat
        .chunks_exact(3)
        .map(|c| [c[0], c[1], c[2]])
        .collect())
}

/// Writes `photons` densely into `block`, replacing its previous contents.
fn fill_photon_block(block: &mut RawPhotons, photons: &Photons) {
    flatten(&mut block.pos, &photons.pos);
    flatten(&mut block.dir, &photons.dir);
    flatten(&mut block.pol, &photons.pol);
    block.wavelengths.clone_from(&photons.wavelengths);
    block.t.clone_from(&photons.t);
    block
        .last_hit_triangles
        .clone_from(&photons.last_hit_triangles);
    block.flags.clone_from(&photons.flags);
}

/// Packs a photon block into a bundle of the block's declared size.
pub fn decode_photon_block(block: &RawPhotons) -> Result<Photons, ChromaError> {
    let n = block.size();
    let scalar_columns = [
        ("t", block.t.len()),
        ("last_hit_triangles", block.last_hit_triangles.len()),
        ("flags", block.flags.len()),
    ];
    for (column, len) in scalar_columns {
        if len != n {
            return Err(schema_error(
                "photon-block-length",
                "photon column does not match the block size",
                &[
                    ("column", column.to_string()),
                    ("expected", n.to_string()),
                    ("actual", len.to_string()),
                ],
            ));
        }
    }
    Photons::from_parts(
        unflatten("pos", &block.pos, n)?,
        unflatten("dir", &block.dir, n)?,
        unflatten("pol", &block.pol, n)?,
        block.wavelengths.clone(),
        block.t.clone(),
        block.flags.clone(),
        block.last_hit_triangles.clone(),
    )
}

/// Converts a vertex to its record form; an absent polarization becomes the zero vector.
pub fn encode_vertex(vertex: &Vertex) -> RawVertex {
    RawVertex {
        particle_name: vertex.particle_name.clone(),
        pos: vertex.pos,
        dir: vertex.dir,
        pol: vertex.pol.unwrap_or([0.0; 3]),
        ke: vertex.ke,
        t0: vertex.t0,
        trackid: vertex.trackid,
        pdgcode: vertex.pdgcode,
    }
}

/// Copies a vertex record; the decoded polarization is always present.
pub fn decode_vertex(raw: &RawVertex) -> Vertex {
    Vertex {
        particle_name: raw.particle_name.clone(),
        pos: raw.pos,
        dir: raw.dir,
        ke: raw.ke,
        t0: raw.t0,
        pol: Some(raw.pol),
        trackid: raw.trackid,
        pdgcode: raw.pdgcode,
    }
}

/// Writes the sparse channel block of `raw` from validated `channels`.
fn fill_channel_block(raw: &mut RawEvent, channels: Option<&Channels>) {
    raw.channels.clear();
    raw.nhit = 0;
    raw.nchannels = 0;
    if let Some(channels) = channels {
        raw.nchannels = channels.len() as u32;
        let (ids, times, charges) = channels.hit_channels();
        raw.channels.extend(ids.into_iter().zip(times).zip(charges).map(
            |((id, t), q)| RawChannel {
                id,
                t,
                q,
                flags: channels.flags[id as usize],
            },
        ));
        raw.nhit = raw.channels.len() as u32;
    }
}

/// Expands the sparse channel block of `raw` into dense per-channel arrays.
///
/// Channels without a hit read back with zero time, charge and flags.
pub fn decode_channel_block(raw: &RawEvent) -> Result<Channels, ChromaError> {
    if raw.nhit as usize != raw.channels.len() {
        return Err(schema_error(
            "channel-hit-count",
            "hit count does not match the sparse channel block",
            &[
                ("nhit", raw.nhit.to_string()),
                ("entries", raw.channels.len().to_string()),
            ],
        ));
    }
    let mut channels = Channels::unhit(raw.nchannels as usize);
    for entry in &raw.channels {
        let id = entry.id as usize;
        if id >= channels.len() {
            return Err(schema_error(
                "channel-id-range",
                "sparse channel id exceeds the channel count",
                &[
                    ("id", entry.id.to_string()),
                    ("nchannels", raw.nchannels.to_string()),
                ],
            ));
        }
        channels.hit[id] = true;
        channels.t[id] = entry.t;
        channels.q[id] = entry.q;
        channels.flags[id] = entry.flags;
    }
    Ok(channels)
}

fn in_block(err: ChromaError, block: &str) -> ChromaError {
    match err {
        ChromaError::Schema(info) => ChromaError::Schema(info.with_context("block", block)),
        other => other,
    }
}

/// Encodes `event` into `raw`, overwriting every block.
///
/// Column lengths of every bundle and of the channels are checked first;
/// on error `raw` is left untouched. Reusing one buffer across events never
/// leaks blocks from a previous record: absent bundles are written as
/// zero-size blocks and the vertex block is resized to the current vertex
/// count.
pub fn encode_event_into(event: &Event, raw: &mut RawEvent) -> Result<(), ChromaError> {
    for (block, photons) in [
        ("photons_beg", &event.photons_beg),
        ("photons_end", &event.photons_end),
    ] {
        if let Some(photons) = photons {
            photons.validate().map_err(|err| in_block(err, block))?;
        }
    }
    if let Some(channels) = &event.channels {
        channels
            .validate()
            .map_err(|err| in_block(err, "channels"))?;
    }

    raw.id = event.id;
    match &event.photons_beg {
        Some(photons) => fill_photon_block(&mut raw.photons_beg, photons),
        None => raw.photons_beg.clear(),
    }
    match &event.photons_end {
        Some(photons) => fill_photon_block(&mut raw.photons_end, photons),
        None => raw.photons_end.clear(),
    }
    raw.vertices.clear();
    raw.vertices.extend(event.vertices.iter().map(encode_vertex));
    fill_channel_block(raw, event.channels.as_ref());
    Ok(())
}

/// Encodes `event` into a fresh record.
pub fn encode_event(event: &Event) -> Result<RawEvent, ChromaError> {
    let mut raw = RawEvent::default();
    encode_event_into(event, &mut raw)?;
    Ok(raw)
}

/// Reconstructs an event from its record.
///
/// Zero-size photon blocks decode to `None`, as does `nchannels == 0`.
pub fn decode_event(raw: &RawEvent) -> Result<Event, ChromaError> {
    let photons_beg = match raw.photons_beg.size() {
        0 => None,
        _ => Some(decode_photon_block(&raw.photons_beg)?),
    };
    let photons_end = match raw.photons_end.size() {
        0 => None,
        _ => Some(decode_photon_block(&raw.photons_end)?),
    };
    let channels = if raw.nchannels > 0 {
        Some(decode_channel_block(raw)?)
    } else if !raw.channels.is_empty() {
        return Err(schema_error(
            "channel-count",
            "hit channels recorded without a channel count",
            &[("entries", raw.channels.len().to_string())],
        ));
    } else {
        None
    };
    Ok(Event {
        id: raw.id,
        vertices: raw.vertices.iter().map(decode_vertex).collect(),
        photons_beg,
        photons_end,
        channels,
    })
}
