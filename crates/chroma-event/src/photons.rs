use std::ops::AddAssign;

use chroma_core::{ChromaError, ErrorInfo};
use serde::{Deserialize, Serialize};

use crate::sort::argsort_direction;

/// Structure-of-arrays batch of optical photons.
///
/// Index `i` refers to the same photon in every array. `flags` and
/// `last_hit_triangles` are only meaningful after optical propagation; a
/// freshly generated bundle carries `0` and `-1` respectively.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Photons {
    /// Positions in mm.
    pub pos: Vec<[f32; 3]>,
    /// Unit direction vectors.
    pub dir: Vec<[f32; 3]>,
    /// Unit polarization vectors.
    pub pol: Vec<[f32; 3]>,
    /// Wavelengths in nm.
    pub wavelengths: Vec<f32>,
    /// Emission times in ns.
    pub t: Vec<f32>,
    /// Status bitfield, see [`crate::flags`].
    pub flags: Vec<u32>,
    /// Index of the last triangle hit, `-1` when unset.
    pub last_hit_triangles: Vec<i32>,
}

impl Photons {
    /// Creates a freshly generated bundle with cleared flags and unset hit triangles.
    pub fn new(
        pos: Vec<[f32; 3]>,
        dir: Vec<[f32; 3]>,
        pol: Vec<[f32; 3]>,
        wavelengths: Vec<f32>,
        t: Vec<f32>,
    ) -> Result<Self, ChromaError> {
        let n = pos.len();
        Self::from_parts(pos, dir, pol, wavelengths, t, vec![0; n], vec![-1; n])
    }

    /// Creates a bundle from every column, checking that all lengths agree.
    pub fn from_parts(
        pos: Vec<[f32; 3]>,
        dir: Vec<[f32; 3]>,
        pol: Vec<[f32; 3]>,
        wavelengths: Vec<f32>,
        t: Vec<f32>,
        flags: Vec<u32>,
        last_hit_triangles: Vec<i32>,
    ) -> Result<Self, ChromaError> {
        let photons = Self {
            pos,
            dir,
            pol,
            wavelengths,
            t,
            flags,
            last_hit_triangles,
        };
        photons.validate()?;
        Ok(photons)
    }

    /// Returns an empty bundle.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of photons in the bundle.
    pub fn len(&self) -> usize {
        self.pos.len()
    }

    /// Returns `true` when the bundle holds no photons.
    pub fn is_empty(&self) -> bool {
        self.pos.is_empty()
    }

    /// Checks that every column has the same length.
    pub fn validate(&self) -> Result<(), ChromaError> {
        let n = self.pos.len();
        let columns = [
            ("dir", self.dir.len()),
            ("pol", self.pol.len()),
            ("wavelengths", self.wavelengths.len()),
            ("t", self.t.len()),
            ("flags", self.flags.len()),
            ("last_hit_triangles", self.last_hit_triangles.len()),
        ];
        for (name, len) in columns {
            if len != n {
                return Err(ChromaError::Schema(
                    ErrorInfo::new("photon-column-length", "photon columns differ in length")
                        .with_context("column", name)
                        .with_context("expected", n.to_string())
                        .with_context("actual", len.to_string()),
                ));
            }
        }
        Ok(())
    }

    /// Appends every photon of `other` after the photons already present.
    pub fn extend_from(&mut self, other: &Photons) {
        self.pos.extend_from_slice(&other.pos);
        self.dir.extend_from_slice(&other.dir);
        self.pol.extend_from_slice(&other.pol);
        self.wavelengths.extend_from_slice(&other.wavelengths);
        self.t.extend_from_slice(&other.t);
        self.flags.extend_from_slice(&other.flags);
        self.last_hit_triangles
            .extend_from_slice(&other.last_hit_triangles);
    }

    /// Returns `self` followed by `other`.
    pub fn concat(mut self, other: &Photons) -> Photons {
        self.extend_from(other);
        self
    }

    /// Builds a new bundle from the photons at `indices`, in that order.
    ///
    /// Panics if an index is out of bounds.
    pub fn select(&self, indices: &[usize]) -> Photons {
        Photons {
            pos: indices.iter().map(|&i| self.pos[i]).collect(),
            dir: indices.iter().map(|&i| self.dir[i]).collect(),
            pol: indices.iter().map(|&i| self.pol[i]).collect(),
            wavelengths: indices.iter().map(|&i| self.wavelengths[i]).collect(),
            t: indices.iter().map(|&i| self.t[i]).collect(),
            flags: indices.iter().map(|&i| self.flags[i]).collect(),
            last_hit_triangles: indices.iter().map(|&i| self.last_hit_triangles[i]).collect(),
        }
    }

    /// Returns the bundle permuted by `order`, which must hold every index
    /// below `len()` exactly once.
    pub fn reorder(&self, order: &[usize]) -> Result<Photons, ChromaError> {
        let mut seen = vec![false; self.len()];
        let valid = order.len() == self.len()
            && order
                .iter()
                .all(|&i| i < seen.len() && !std::mem::replace(&mut seen[i], true));
        if !valid {
            return Err(ChromaError::IndexRange(
                ErrorInfo::new("photon-permutation", "order is not a permutation of the bundle")
                    .with_context("len", self.len().to_string())
                    .with_context("order_len", order.len().to_string()),
            ));
        }
        Ok(self.select(order))
    }

    /// Returns the bundle reordered by [`argsort_direction`].
    pub fn sorted_by_direction(&self) -> Photons {
        self.select(&argsort_direction(self))
    }

    /// Counts photons whose flags contain every bit of `mask`.
    pub fn count_with_flag(&self, mask: u32) -> usize {
        self.flags.iter().filter(|&&f| f & mask == mask).count()
    }
}

impl AddAssign<&Photons> for Photons {
    fn add_assign(&mut self, rhs: &Photons) {
        self.extend_from(rhs);
    }
}
