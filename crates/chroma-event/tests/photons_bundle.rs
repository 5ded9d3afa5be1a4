use chroma_event::flags::{BULK_ABSORB, NO_HIT, SURFACE_DETECT};
use chroma_event::{flags, Photons};

fn bundle(offset: f32, n: usize) -> Photons {
    let pos = (0..n).map(|i| [offset + i as f32, 0.0, 0.0]).collect();
    let dir = (0..n).map(|_| [0.0, 0.0, 1.0]).collect();
    let pol = (0..n).map(|_| [1.0, 0.0, 0.0]).collect();
    let wavelengths = (0..n).map(|i| 400.0 + i as f32).collect();
    let t = (0..n).map(|i| offset + 0.5 * i as f32).collect();
    Photons::new(pos, dir, pol, wavelengths, t).unwrap()
}

#[test]
fn new_bundle_has_generator_defaults() {
    let photons = bundle(0.0, 3);
    assert_eq!(photons.len(), 3);
    assert_eq!(photons.flags, vec![0, 0, 0]);
    assert_eq!(photons.last_hit_triangles, vec![-1, -1, -1]);
}

#[test]
fn mismatched_columns_are_rejected() {
    let err = Photons::new(
        vec![[0.0; 3]; 2],
        vec![[0.0, 0.0, 1.0]; 2],
        vec![[1.0, 0.0, 0.0]; 2],
        vec![400.0],
        vec![0.0; 2],
    )
    .unwrap_err();
    assert_eq!(err.info().code, "photon-column-length");
    assert_eq!(
        err.info().context.get("column").map(String::as_str),
        Some("wavelengths")
    );
}

#[test]
fn concatenation_preserves_order() {
    let first = bundle(0.0, 2);
    let second = bundle(100.0, 3);
    let joined = first.clone().concat(&second);
    assert_eq!(joined.len(), 5);
    assert_eq!(joined.select(&[0, 1]), first);
    assert_eq!(joined.select(&[2, 3, 4]), second);

    let mut accumulated = Photons::empty();
    accumulated += &first;
    accumulated += &second;
    assert_eq!(accumulated, joined);
}

#[test]
fn concatenating_empty_is_identity() {
    let photons = bundle(3.0, 4);
    assert_eq!(photons.clone().concat(&Photons::empty()), photons);
    assert_eq!(Photons::empty().concat(&photons), photons);
}

#[test]
fn flag_counts_require_every_bit() {
    let mut photons = bundle(0.0, 4);
    photons.flags = vec![
        NO_HIT,
        SURFACE_DETECT,
        SURFACE_DETECT | BULK_ABSORB,
        BULK_ABSORB,
    ];
    assert_eq!(photons.count_with_flag(SURFACE_DETECT), 2);
    assert_eq!(photons.count_with_flag(SURFACE_DETECT | BULK_ABSORB), 1);
    assert_eq!(flags::names(photons.flags[2]), vec!["BULK_ABSORB", "SURFACE_DETECT"]);
}

#[test]
fn reorder_applies_a_permutation() {
    let photons = bundle(0.0, 3);
    let reordered = photons.reorder(&[2, 0, 1]).unwrap();
    assert_eq!(reordered.wavelengths, vec![402.0, 400.0, 401.0]);
    assert_eq!(reordered.reorder(&[1, 2, 0]).unwrap(), photons);
}

#[test]
fn reorder_rejects_non_permutations() {
    let photons = bundle(0.0, 3);
    for order in [&[0usize, 1][..], &[0, 1, 1], &[0, 1, 3]] {
        let err = photons.reorder(order).unwrap_err();
        assert!(err.is_index_range());
        assert_eq!(err.info().code, "photon-permutation");
    }
}
