use chroma_event::{argsort_direction, Photons};
use proptest::prelude::*;

fn photons_from(dirs: &[[f32; 3]]) -> Photons {
    let n = dirs.len();
    Photons::new(
        (0..n).map(|i| [i as f32, 0.0, 0.0]).collect(),
        dirs.to_vec(),
        vec![[0.0, 1.0, 0.0]; n],
        vec![420.0; n],
        vec![0.0; n],
    )
    .unwrap()
}

#[test]
fn sorts_lexicographically_by_direction() {
    let photons = photons_from(&[[0.5, 0.0, 0.1], [-0.5, 0.2, 0.0], [0.5, -0.1, 0.0], [-0.5, 0.2, -1.0]]);
    assert_eq!(argsort_direction(&photons), vec![3, 1, 2, 0]);
}

#[test]
fn equal_directions_tie_break_on_position() {
    let mut photons = photons_from(&[[0.0, 0.0, 1.0]; 3]);
    photons.pos = vec![[2.0, 0.0, 0.0], [0.0, 0.0, 0.0], [1.0, 0.0, 0.0]];
    assert_eq!(argsort_direction(&photons), vec![1, 2, 0]);
}

#[test]
fn empty_bundle_sorts_to_empty() {
    assert!(argsort_direction(&Photons::empty()).is_empty());
}

proptest! {
    #[test]
    fn emission_order_does_not_change_sorted_output(
        dirs in prop::collection::vec(prop::array::uniform3(-1.0f32..1.0), 0..32),
        rotate in 0usize..32,
    ) {
        let photons = photons_from(&dirs);
        let mut shuffled_order: Vec<usize> = (0..photons.len()).collect();
        if !shuffled_order.is_empty() {
            let k = rotate % shuffled_order.len();
            shuffled_order.rotate_left(k);
            shuffled_order.reverse();
        }
        let shuffled = photons.select(&shuffled_order);
        prop_assert_eq!(photons.sorted_by_direction(), shuffled.sorted_by_direction());
    }
}
