#![allow(dead_code)]

use chroma_event::{Channels, Event, Photons, Vertex};

pub fn photons(offset: f32, n: usize) -> Photons {
    let mut photons = Photons::new(
        (0..n).map(|i| [offset + i as f32, 1.0, -2.0]).collect(),
        (0..n).map(|i| [0.0, (i % 2) as f32, 1.0]).collect(),
        (0..n).map(|_| [1.0, 0.0, 0.0]).collect(),
        (0..n).map(|i| 350.0 + 10.0 * i as f32).collect(),
        (0..n).map(|i| offset + 0.25 * i as f32).collect(),
    )
    .unwrap();
    for (i, flag) in photons.flags.iter_mut().enumerate() {
        *flag = (i as u32) << 2;
    }
    for (i, triangle) in photons.last_hit_triangles.iter_mut().enumerate() {
        *triangle = i as i32 * 7 - 1;
    }
    photons
}

/// Ten channels with hits on 1, 4 and 9.
pub fn sparse_channels() -> Channels {
    let mut channels = Channels::unhit(10);
    for (id, t, q) in [(1usize, 12.5f32, 3.0f32), (4, 20.0, 0.5), (9, 31.25, 1.75)] {
        channels.hit[id] = true;
        channels.t[id] = t;
        channels.q[id] = q;
        channels.flags[id] = id as u32;
    }
    channels
}

pub fn full_event(id: u64) -> Event {
    let mut event = Event::new(id);
    event.vertices = vec![
        Vertex::new("mu-", [0.0, 0.0, 100.0], [0.0, 0.0, -1.0], 500.0, 1.5)
            .with_pol([1.0, 0.0, 0.0])
            .with_ids(1, 13),
        Vertex::new("e-", [10.0, 0.0, 0.0], [1.0, 0.0, 0.0], 2.0, 3.0)
            .with_pol([0.0, 1.0, 0.0])
            .with_ids(2, 11),
    ];
    event.photons_beg = Some(photons(id as f32, 5));
    event.photons_end = Some(photons(100.0 + id as f32, 3));
    event.channels = Some(sparse_channels());
    event
}
