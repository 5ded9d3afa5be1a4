use std::cmp::Ordering;

use crate::photons::Photons;

fn cmp_vec3(a: &[f32; 3], b: &[f32; 3]) -> Ordering {
    a[0].total_cmp(&b[0])
        .then_with(|| a[1].total_cmp(&b[1]))
        .then_with(|| a[2].total_cmp(&b[2]))
}

/// Returns the permutation that sorts `photons` by direction.
///
/// Directions compare lexicographically on `(x, y, z)` under IEEE total
/// ordering. Ties fall back to position, polarization, wavelength and time,
/// then to the original index, so two bundles holding the same photons in a
/// different emission order sort to bit-identical output.
pub fn argsort_direction(photons: &Photons) -> Vec<usize> {
    let mut order: Vec<usize> = (0..photons.len()).collect();
    order.sort_by(|&a, &b| {
        cmp_vec3(&photons.dir[a], &photons.dir[b])
            .then_with(|| cmp_vec3(&photons.pos[a], &photons.pos[b]))
            .then_with(|| cmp_vec3(&photons.pol[a], &photons.pol[b]))
            .then_with(|| photons.wavelengths[a].total_cmp(&photons.wavelengths[b]))
            .then_with(|| photons.t[a].total_cmp(&photons.t[b]))
            .then_with(|| a.cmp(&b))
    });
    order
}
