//! Pairwise crossings of outcrop traces

use nalgebra::{Point2, Vector2};

use super::trace::OutcropTraces;

/// Two traces meeting at a point of the outcrop surface
#[derive(Debug, Clone, PartialEq)]
pub struct TraceIntersection {
    /// Trace indices, `first < second`
    pub first: usize,
    pub second: usize,
    pub point: Point2<f64>,
}

fn cross(u: &Vector2<f64>, v: &Vector2<f64>) -> f64 {
    u.x * v.y - u.y * v.x
}

/// Intersection point of segments [p0, p1] and [q0, q1]
///
/// Endpoints count as part of the segments, with `tol` (a length) of slack,
/// so T-junctions and traces sharing an endpoint intersect. Parallel and
/// collinear segments return `None`.
pub fn segment_intersection(
    p0: &Point2<f64>,
    p1: &Point2<f64>,
    q0: &Point2<f64>,
    q1: &Point2<f64>,
    tol: f64,
) -> Option<Point2<f64>> {
    let r = p1 - p0;
    let s = q1 - q0;
    let (r_len, s_len) = (r.norm(), s.norm());
    if r_len == 0.0 || s_len == 0.0 {
        return None;
    }

    let denom = cross(&r, &s);
    if denom.abs() <= 1e-12 * r_len * s_len {
        return None;
    }

    let qp = q0 - p0;
    let t = cross(&qp, &s) / denom;
    let u = cross(&qp, &r) / denom;

    let (tol_t, tol_u) = (tol / r_len, tol / s_len);
    let inside = |param: f64, slack: f64| param >= -slack && param <= 1.0 + slack;
    if inside(t, tol_t) && inside(u, tol_u) {
        Some(p0 + r * t.clamp(0.0, 1.0))
    } else {
        None
    }
}

/// All pairwise trace intersections, ordered by (first, second)
pub fn find_intersections(traces: &OutcropTraces, tol: f64) -> Vec<TraceIntersection> {
    let n = traces.num_traces();
    let boxes: Vec<(Point2<f64>, Point2<f64>)> = (0..n)
        .map(|i| {
            let (a, b) = traces.segment(i);
            (
                Point2::new(a.x.min(b.x) - tol, a.y.min(b.y) - tol),
                Point2::new(a.x.max(b.x) + tol, a.y.max(b.y) + tol),
            )
        })
        .collect();

    let mut found = Vec::new();
    for i in 0..n {
        let (p0, p1) = traces.segment(i);
        for j in (i + 1)..n {
            let (bi, bj) = (&boxes[i], &boxes[j]);
            if bi.1.x < bj.0.x || bj.1.x < bi.0.x || bi.1.y < bj.0.y || bj.1.y < bi.0.y {
                continue;
            }
            let (q0, q1) = traces.segment(j);
            if let Some(point) = segment_intersection(&p0, &p1, &q0, &q1, tol) {
                found.push(TraceIntersection { first: i, second: j, point });
            }
        }
    }
    found
}
