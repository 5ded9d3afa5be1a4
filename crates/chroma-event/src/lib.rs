#![deny(missing_docs)]
#![doc = "Event model shared by the photon generator and the event file reader/writer."]

/// Per-channel detector readout.
pub mod channels;
/// Event aggregate.
pub mod event;
/// Photon status bits set by downstream propagation.
pub mod flags;
/// Structure-of-arrays photon bundles.
pub mod photons;
/// Canonical photon ordering.
pub mod sort;
/// Primary particle vertices.
pub mod vertex;

pub use channels::Channels;
pub use event::Event;
pub use photons::Photons;
pub use sort::argsort_direction;
pub use vertex::Vertex;
