#![deny(missing_docs)]
#![doc = "Shared error type and deterministic RNG helpers for the chroma event tooling."]

pub mod errors;
pub mod rng;

pub use errors::{ChromaError, ErrorInfo};
pub use rng::{derive_substream_seed, RngHandle};

