//! Bit assignments for [`Photons::flags`](crate::Photons::flags).
//!
//! The generator leaves every flag cleared; the bits are set by the optical
//! propagation stage that runs on the generated photons before they are
//! written as `photons_end`.

/// Photon never hit anything.
pub const NO_HIT: u32 = 1 << 0;
/// Absorbed in the bulk material.
pub const BULK_ABSORB: u32 = 1 << 1;
/// Detected on a sensitive surface.
pub const SURFACE_DETECT: u32 = 1 << 2;
/// Absorbed on a surface.
pub const SURFACE_ABSORB: u32 = 1 << 3;
/// Underwent Rayleigh scattering.
pub const RAYLEIGH_SCATTER: u32 = 1 << 4;
/// Reflected diffusely.
pub const REFLECT_DIFFUSE: u32 = 1 << 5;
/// Reflected specularly.
pub const REFLECT_SPECULAR: u32 = 1 << 6;
/// Re-emitted by a surface.
pub const SURFACE_REEMIT: u32 = 1 << 7;
/// Transmitted through a surface.
pub const SURFACE_TRANSMIT: u32 = 1 << 8;
/// Re-emitted in the bulk.
pub const BULK_REEMIT: u32 = 1 << 9;
/// Propagation aborted after producing a NaN.
pub const NAN_ABORT: u32 = 1 << 31;

/// Named flags in bit order, used for human readable summaries.
pub const ALL: [(&str, u32); 11] = [
    ("NO_HIT", NO_HIT),
    ("BULK_ABSORB", BULK_ABSORB),
    ("SURFACE_DETECT", SURFACE_DETECT),
    ("SURFACE_ABSORB", SURFACE_ABSORB),
    ("RAYLEIGH_SCATTER", RAYLEIGH_SCATTER),
    ("REFLECT_DIFFUSE", REFLECT_DIFFUSE),
    ("REFLECT_SPECULAR", REFLECT_SPECULAR),
    ("SURFACE_REEMIT", SURFACE_REEMIT),
    ("SURFACE_TRANSMIT", SURFACE_TRANSMIT),
    ("BULK_REEMIT", BULK_REEMIT),
    ("NAN_ABORT", NAN_ABORT),
];

/// Returns the names of every flag set in `bits`.
pub fn names(bits: u32) -> Vec<&'static str> {
    ALL.iter()
        .filter(|(_, bit)| bits & bit != 0)
        .map(|(name, _)| *name)
        .collect()
}
