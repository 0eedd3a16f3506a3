use super::*;
use crate::render::support::{Call, Recorder};
use crate::scene::model::Lifetime;

fn atom(id: &str, label: &str, x: f64, y: f64) -> AtomCue {
    AtomCue {
        id: id.into(),
        x,
        y,
        label: label.into(),
        charge: 0.0,
        lifetime: Lifetime::ALWAYS,
    }
}

fn arrow(label: &str) -> ArrowCue {
    ArrowCue {
        path: "M 0 0 C 0 40, 100 40, 100 0".into(),
        label: label.into(),
        bend: 1.0,
        from_atom_id: None,
        to_atom_id: None,
        arrow_type: None,
        lifetime: Lifetime::at(0),
    }
}

fn strokes(rec: &Recorder) -> Vec<&BezPath> {
    rec.calls
        .iter()
        .filter_map(|c| match c {
            Call::StrokePath(p, _) => Some(p),
            _ => None,
        })
        .collect()
}

#[test]
fn head_position_is_offset_and_clamped() {
    assert_eq!(arrow_head_t(0.0), 0.05);
    assert!((arrow_head_t(0.5) - 0.55).abs() < 1e-12);
    assert_eq!(arrow_head_t(0.99), 1.0);
    assert_eq!(arrow_head_t(-3.0), 0.05);
}

#[test]
fn single_bond_is_one_centered_stroke() {
    let mut rec = Recorder::new(360.0, 180.0);
    paint_bond(&mut rec, &atom("a", "C", 0.0, 0.0), &atom("b", "C", 10.0, 0.0), 1);
    let lines = strokes(&rec);
    assert_eq!(lines.len(), 1);
    let bbox = kurbo::Shape::bounding_box(lines[0]);
    assert_eq!((bbox.y0, bbox.y1), (0.0, 0.0));
}

#[test]
fn double_and_triple_bonds_draw_two_offset_strokes() {
    for order in [2, 3] {
        let mut rec = Recorder::new(360.0, 180.0);
        paint_bond(&mut rec, &atom("a", "C", 0.0, 0.0), &atom("b", "C", 10.0, 0.0), order);
        let ys: Vec<f64> = strokes(&rec)
            .iter()
            .map(|p| kurbo::Shape::bounding_box(*p).y0)
            .collect();
        assert_eq!(ys.len(), 2, "order {order}");
        let spread = style::BOND_OFFSET * 0.7;
        assert!((ys[0] + spread).abs() < 1e-9 && (ys[1] - spread).abs() < 1e-9, "{ys:?}");
    }
}

#[test]
fn coincident_atoms_still_draw() {
    let mut rec = Recorder::new(360.0, 180.0);
    paint_bond(&mut rec, &atom("a", "C", 5.0, 5.0), &atom("b", "C", 5.0, 5.0), 2);
    assert_eq!(strokes(&rec).len(), 2);
}

#[test]
fn atom_draws_shadow_fill_outline_then_label() {
    let mut rec = Recorder::new(360.0, 180.0);
    paint_atom(&mut rec, &atom("o1", "O", 40.0, 50.0));
    let look = style::atom_style("O");
    assert!(matches!(&rec.calls[0], Call::FillCircle(p, _, _) if p.y == 50.0 + style::ATOM_SHADOW_DY));
    assert_eq!(
        rec.calls[1],
        Call::FillCircle(Point::new(40.0, 50.0), style::ATOM_RADIUS, look.fill)
    );
    assert!(matches!(rec.calls[2], Call::StrokeCircle(..)));
    assert_eq!(rec.texts(), vec!["O"]);
}

#[test]
fn unlabeled_atoms_draw_no_text() {
    let mut rec = Recorder::new(360.0, 180.0);
    paint_atom(&mut rec, &atom("x", "", 0.0, 0.0));
    assert!(rec.texts().is_empty());
}

#[test]
fn dipole_text_uses_delta_glyphs() {
    let mut rec = Recorder::new(360.0, 180.0);
    let cue = DipoleCue {
        x: 1.0,
        y: 2.0,
        text: "delta+".into(),
        lifetime: Lifetime::ALWAYS,
    };
    paint_dipole(&mut rec, &cue);
    assert_eq!(rec.texts(), vec!["δ+"]);
}

#[test]
fn lone_pair_is_two_dots_and_a_raised_label() {
    let mut rec = Recorder::new(360.0, 180.0);
    let cue = LonePairCue {
        x: 10.0,
        y: 10.0,
        label: "lp".into(),
        lifetime: Lifetime::ALWAYS,
    };
    paint_lone_pair(&mut rec, &cue);
    let dots = rec
        .calls
        .iter()
        .filter(|c| matches!(c, Call::FillCircle(_, r, _) if *r == style::LONE_PAIR_DOT_RADIUS))
        .count();
    assert_eq!(dots, 2);
    assert!(matches!(&rec.calls[2], Call::Text(t, p, _) if t == "lp" && p.y == 4.0));
}

#[test]
fn arrow_body_stops_at_the_head() {
    let mut rec = Recorder::new(360.0, 180.0);
    paint_arrow(&mut rec, &arrow("attack"), 0.45, 0);
    let body = strokes(&rec)[0];
    let Some(kurbo::PathEl::CurveTo(_, _, end)) = body.elements().last().copied() else {
        panic!("expected a cubic body: {body:?}");
    };
    let curve = arrow("attack").curve().unwrap();
    let head = point_at(&curve, 0.5);
    assert!((end - head).hypot() < 1e-9);

    let Call::StrokePath(_, stroke) = &rec.calls[0] else {
        panic!("body first");
    };
    assert_eq!(stroke.dash, style::ARROW_DASH.to_vec());
}

#[test]
fn arrow_head_and_electron_follow_progress() {
    let mut rec = Recorder::new(360.0, 180.0);
    paint_arrow(&mut rec, &arrow(""), 1.0, 0);
    let curve = arrow("").curve().unwrap();
    let head = rec.calls.iter().find_map(|c| match c {
        Call::FillPath(p, color) if *color == style::ARROW_HEAD => Some(p.clone()),
        _ => None,
    });
    let Some(kurbo::PathEl::MoveTo(tip)) = head.and_then(|p| p.elements().first().copied()) else {
        panic!("missing arrowhead");
    };
    assert!((tip - curve.p3).hypot() < 1e-9);

    let electron = rec.calls.iter().find_map(|c| match c {
        Call::FillCircle(p, _, color) if *color == style::ELECTRON_DOT => Some(*p),
        _ => None,
    });
    let expected = point_at(&curve, 1.0 - style::ELECTRON_LAG);
    assert!((electron.unwrap() - expected).hypot() < 1e-9);
    assert!(rec.texts().is_empty());
}

#[test]
fn arrow_labels_stack_upward_by_row() {
    let mut rec = Recorder::new(360.0, 180.0);
    paint_arrow(&mut rec, &arrow("first"), 0.2, 0);
    paint_arrow(&mut rec, &arrow("second"), 0.2, 2);
    let ys: Vec<f64> = rec
        .calls
        .iter()
        .filter_map(|c| match c {
            Call::Text(_, p, _) => Some(p.y),
            _ => None,
        })
        .collect();
    assert_eq!(ys, vec![156.0, 134.0]);
}

#[test]
fn unparseable_arrow_draws_nothing() {
    let mut rec = Recorder::new(360.0, 180.0);
    let mut bad = arrow("x");
    bad.path = "M 0 0 L 5 5".into();
    paint_arrow(&mut rec, &bad, 0.5, 0);
    assert!(rec.calls.is_empty());
}
