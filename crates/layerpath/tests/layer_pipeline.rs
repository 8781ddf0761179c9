//! End-to-end checks of the shell, infill and ordering pipeline.

use approx::assert_abs_diff_eq;
use layerpath::{
    InfillGenerator, InfillStage, LayerParams, LayerPathOrganizer, Line, LineGroup, OffsetSide,
    Point, Shape, build_layer,
};

fn square(size: f64) -> Shape {
    Shape::from_points(&[
        Point::new(0.0, 0.0),
        Point::new(size, 0.0),
        Point::new(size, size),
        Point::new(0.0, size),
    ])
    .unwrap()
}

fn scenario_params() -> LayerParams {
    LayerParams {
        layer_height: 0.2,
        path_width: 1.0,
        shell_count: 1,
        infill_angle: 0.0,
        infill_spacing: 2.0,
        infill_shift_x: 0.0,
        infill_shift_y: 0.0,
        trim_adjust: 0.0,
    }
}

/// Whether `run` is `edges` walked in loop order from some entry edge.
fn is_loop_rotation(run: &[Line], edges: &[Line]) -> bool {
    let k = edges.len();
    run.len() == k
        && (0..k).any(|entry| (0..k).all(|step| run[step] == edges[(entry + step) % k]))
}

#[test]
fn square_with_one_shell() {
    let outline = square(10.0);
    let layer = build_layer(&outline, &scenario_params()).unwrap();

    // 4 outer edges, 4 inner edges, 4 rows.
    assert_eq!(layer.len(), 12);

    // The outer square starts at the origin, so it is drawn first and whole.
    assert_eq!(&layer.lines()[..4], outline.edges());

    let inner = outline.offset(1.0, OffsetSide::Inside).unwrap();
    assert_abs_diff_eq!(inner.area(), 64.0, epsilon = 1e-9);
    assert!(
        (4..=8).any(|i| is_loop_rotation(&layer.lines()[i..i + 4], inner.edges())),
        "inner square not drawn in one run: {:?}",
        layer.lines()
    );

    let mut rest: Vec<Line> = layer.lines()[4..].to_vec();
    for edge in inner.edges() {
        let at = rest.iter().position(|l| l == edge).unwrap();
        rest.remove(at);
    }
    let mut ys: Vec<f64> = rest.iter().map(|l| l.start.y).collect();
    ys.sort_by(f64::total_cmp);
    assert_eq!(ys.len(), 4);
    for (line, (y, expected)) in rest.iter().zip(ys.iter().zip([1.0, 3.0, 5.0, 7.0])) {
        assert_abs_diff_eq!(*y, expected, epsilon = 1e-9);
        assert_abs_diff_eq!(line.start.y, line.end.y, epsilon = 1e-9);
        assert_abs_diff_eq!(line.start.x.min(line.end.x), 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(line.start.x.max(line.end.x), 9.0, epsilon = 1e-9);
    }
}

#[test]
fn rows_interleave_by_nearest_start() {
    let inner = square(10.0).offset(1.0, OffsetSide::Inside).unwrap();
    let infill = InfillGenerator::new(&inner, 0.0, 2.0).generate().unwrap();
    let out = LayerPathOrganizer::new()
        .with_start(Point::new(1.0, 1.0))
        .organize(&[infill]);
    assert_eq!(out.len(), 4);
    // Each row starts above where the previous one ended.
    for pair in out.lines().windows(2) {
        assert_abs_diff_eq!(pair[0].end.x, pair[1].start.x, epsilon = 1e-9);
        assert_abs_diff_eq!(pair[1].start.y - pair[0].end.y, 2.0, epsilon = 1e-9);
    }
}

#[test]
fn offset_round_trip_on_convex_polygon() {
    let pentagon: Vec<Point> = (0..5)
        .map(|i| {
            let a = i as f64 * 2.0 * std::f64::consts::PI / 5.0;
            Point::new(30.0 + 15.0 * a.cos(), -4.0 + 15.0 * a.sin())
        })
        .collect();
    let shape = Shape::from_points(&pentagon).unwrap();
    for w in [0.5, 2.0, 7.5] {
        let back = shape
            .offset(w, OffsetSide::Inside)
            .and_then(|s| s.offset(w, OffsetSide::Outside))
            .unwrap();
        for (p, q) in back.vertices().iter().zip(shape.vertices()) {
            assert_abs_diff_eq!(p.x, q.x, epsilon = 1e-9);
            assert_abs_diff_eq!(p.y, q.y, epsilon = 1e-9);
        }
    }
}

#[test]
fn containment_is_consistent() {
    let shape = square(10.0);
    for i in 1..10 {
        for j in 1..10 {
            assert!(shape.is_inside(Point::new(i as f64, j as f64)));
        }
    }
    for p in [Point::new(-0.1, 5.0), Point::new(5.0, 10.1), Point::new(20.0, 20.0)] {
        assert!(!shape.is_inside(p));
    }
    for p in [Point::new(0.0, 3.0), Point::new(10.0, 10.0), Point::new(4.0, 0.0)] {
        assert!(shape.is_inside(p));
    }
}

#[test]
fn trimmed_infill_stays_inside_concave_boundary() {
    // A "C" opening to the right.
    let c_shape = Shape::from_points(&[
        Point::new(0.0, 0.0),
        Point::new(20.0, 0.0),
        Point::new(20.0, 5.0),
        Point::new(5.0, 5.0),
        Point::new(5.0, 15.0),
        Point::new(20.0, 15.0),
        Point::new(20.0, 20.0),
        Point::new(0.0, 20.0),
    ])
    .unwrap();

    for angle in [0.0, 30.0, 45.0, 90.0, 135.0] {
        let infill = InfillGenerator::new(&c_shape, angle, 0.7).generate().unwrap();
        assert!(!infill.is_empty(), "angle {}", angle);
        for line in &infill {
            assert!(c_shape.is_inside(line.midpoint()), "angle {}: {:?}", angle, line);
            assert!(c_shape.is_inside(line.start) && c_shape.is_inside(line.end));
        }
    }
}

#[test]
fn field_covers_rectangle() {
    for (h, s) in [(10.0, 2.0), (10.0, 3.0), (7.5, 0.5), (1.0, 4.0)] {
        let rect = Shape::from_points(&[
            Point::new(0.0, 0.0),
            Point::new(12.0, 0.0),
            Point::new(12.0, h),
            Point::new(0.0, h),
        ])
        .unwrap();
        let field = InfillGenerator::new(&rect, 0.0, s)
            .generate_until(InfillStage::FullField)
            .unwrap();
        let needed = (h / s).ceil() as usize;
        assert!(field.len() >= needed, "H={} S={}: {} rows", h, s, field.len());
    }
}

#[test]
fn organizer_keeps_shells_whole() {
    let outline = square(10.0);
    let inner = outline.offset(2.0, OffsetSide::Inside).unwrap();
    let infill = InfillGenerator::new(&inner, 45.0, 1.0).generate().unwrap();
    let groups = vec![infill, inner.as_group().clone(), outline.as_group().clone()];

    let out = LayerPathOrganizer::new().organize(&groups);
    assert_eq!(out.len(), groups.iter().map(LineGroup::len).sum::<usize>());

    for shape in [&outline, &inner] {
        let k = shape.edges().len();
        let first = out.iter().position(|l| shape.edges().contains(l)).unwrap();
        let entry = shape.edges().iter().position(|e| *e == out[first]).unwrap();
        for step in 0..k {
            assert_eq!(out[first + step], shape.edges()[(entry + step) % k]);
        }
    }
}

#[test]
fn translate_by_zero_is_identity() {
    let layer = build_layer(&square(10.0), &scenario_params()).unwrap();
    assert_eq!(layer.translate(0.0, 0.0), layer);
}
