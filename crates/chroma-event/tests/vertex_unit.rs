use chroma_event::vertex::unit;
use chroma_event::Vertex;

#[test]
fn unit_normalises_finite_vectors() {
    assert_eq!(unit([0.0, 0.0, 2.0]), Some([0.0, 0.0, 1.0]));
    let u = unit([3.0, 4.0, 0.0]).unwrap();
    assert!((u[0] - 0.6).abs() < 1e-15 && (u[1] - 0.8).abs() < 1e-15);
}

#[test]
fn unit_rejects_degenerate_vectors() {
    assert_eq!(unit([0.0; 3]), None);
    assert_eq!(unit([f64::NAN, 1.0, 0.0]), None);
    assert_eq!(unit([f64::INFINITY, 0.0, 0.0]), None);
}

#[test]
fn vertex_json_defaults_match_the_constructor() {
    let vertex: Vertex = serde_json::from_str(
        r#"{ "particle_name": "e-", "pos": [0, 0, 0], "dir": [1, 0, 0], "ke": 2.0 }"#,
    )
    .unwrap();
    assert_eq!(vertex, Vertex::new("e-", [0.0; 3], [1.0, 0.0, 0.0], 2.0, 0.0));
}
