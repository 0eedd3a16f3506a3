use super::*;

fn headline() -> CubicBez {
    CubicBez::new((24.0, 84.0), (92.0, 26.0), (268.0, 26.0), (336.0, 84.0))
}

fn close(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
}

#[test]
fn parses_headline_path() {
    let c = parse_cubic_path("M 24 84 C 92 26, 268 26, 336 84").unwrap();
    assert_eq!(c, headline());
}

#[test]
fn parse_is_whitespace_and_comma_tolerant() {
    let c = parse_cubic_path("m24,84c92 26 268 26 336 84").unwrap();
    assert_eq!(c, headline());

    let c = parse_cubic_path("  M 1.5 -2  C  3 4 ,5 6,  7 8 trailing").unwrap();
    assert_eq!(c.p0, Point::new(1.5, -2.0));
    assert_eq!(c.p3, Point::new(7.0, 8.0));
}

#[test]
fn parse_accepts_commas_inside_pairs_and_before_curve_command() {
    let c = parse_cubic_path("M 24,84, C 92,26, 268,26, 336,84").unwrap();
    assert_eq!(c, headline());

    let c = parse_cubic_path("M24 , 84C92 ,26 268, 26 ,336 84").unwrap();
    assert_eq!(c, headline());

    assert!(parse_cubic_path("M 24,,84 C 92 26, 268 26, 336 84").is_none());
    assert!(parse_cubic_path("M 1-2 C 3 4, 5 6, 7 8").is_none());
}

#[test]
fn parse_rejects_malformed_input() {
    assert!(parse_cubic_path("garbage").is_none());
    assert!(parse_cubic_path("").is_none());
    assert!(parse_cubic_path("M 1 2 L 3 4").is_none());
    assert!(parse_cubic_path("M 1 2 C 3 4, 5 6").is_none());
    assert!(parse_cubic_path("M 1-2 C 3 4, 5 6, 7 8").is_none());
    assert!(parse_cubic_path("M 1 2 C 3 4, 5 6, 7 ..").is_none());
}

#[test]
fn format_round_trips_through_parse() {
    let c = CubicBez::new((10.5, 20.0), (-3.25, 4.0), (0.0, 0.0), (300.0, 90.126));
    let text = format_cubic_path(&c);
    assert_eq!(text, "M 10.5 20 C -3.25 4, 0 0, 300 90.13");
    let back = parse_cubic_path(&text).unwrap();
    assert_eq!(back.p1, c.p1);
}

#[test]
fn endpoints_and_tangents() {
    let c = headline();
    assert!(close(point_at(&c, 0.0), c.p0));
    assert!(close(point_at(&c, 1.0), c.p3));
    let mid = point_at(&c, 0.5);
    assert!((mid.x - 180.0).abs() < 1e-9);

    // Derivative at t=0 is 3(p1 - p0).
    let t0 = tangent_at(&c, 0.0);
    assert!((t0.x - 204.0).abs() < 1e-9);
    assert!((t0.y + 174.0).abs() < 1e-9);
}

#[test]
fn bend_of_one_is_identity() {
    let c = headline();
    assert_eq!(apply_bend(&c, 1.0), c);
    assert_eq!(apply_bend(&c, 1.0005), c);
    assert_eq!(apply_bend(&c, f64::NAN), c);
}

#[test]
fn bend_preserves_endpoints_and_scales_normal_offset() {
    let c = headline();
    let b = apply_bend(&c, 2.0);
    assert_eq!(b.p0, c.p0);
    assert_eq!(b.p3, c.p3);
    // Horizontal chord: the normal offset is the y distance from the chord.
    assert!((b.p1.x - 92.0).abs() < 1e-9);
    assert!((b.p1.y - (84.0 - 2.0 * 58.0)).abs() < 1e-9);
    assert!((b.p2.y - (84.0 - 2.0 * 58.0)).abs() < 1e-9);
}

#[test]
fn bend_factor_is_clamped() {
    assert_eq!(clamp_bend(0.1), MIN_BEND);
    assert_eq!(clamp_bend(9.0), MAX_BEND);
    assert_eq!(clamp_bend(f64::INFINITY), 1.0);
    let c = headline();
    assert_eq!(apply_bend(&c, 100.0), apply_bend(&c, 4.0));
}

#[test]
fn sampling_includes_endpoints_and_clamps_count() {
    let c = headline();
    let pts = sample_curve(&c, DEFAULT_CURVE_SAMPLES);
    assert_eq!(pts.len(), 15);
    assert!(close(pts[0], c.p0));
    assert!(close(pts[14], c.p3));

    assert_eq!(sample_curve(&c, 0).len(), 5);
    assert_eq!(sample_curve(&c, 1000).len(), 49);
}

#[test]
fn marker_walks_by_arclength() {
    let c = headline();
    assert!(close(point_at_length_fraction(&c, 0.0), c.p0));
    let end = point_at_length_fraction(&c, 1.0);
    assert!((end.x - c.p3.x).abs() < 1e-2 && (end.y - c.p3.y).abs() < 1e-2);
    // Symmetric curve: half the length lands on the axis of symmetry.
    let mid = point_at_length_fraction(&c, 0.5);
    assert!((mid.x - 180.0).abs() < 0.5);
    assert!(close(point_at_length_fraction(&c, -3.0), c.p0));
}

#[test]
fn degenerate_curve_marker_stays_at_start() {
    let c = CubicBez::new((5.0, 5.0), (5.0, 5.0), (5.0, 5.0), (5.0, 5.0));
    assert_eq!(point_at_length_fraction(&c, 0.7), Point::new(5.0, 5.0));
}
