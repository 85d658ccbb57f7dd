//! Outcrop fracture traces
//!
//! Traces are straight 2D segments mapped on a horizontal outcrop surface.
//! They are read from CSV as one trace per row and stored in
//! points-plus-connectivity form with shared endpoints merged.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use nalgebra::Point2;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// 2D trace network: deduplicated points and the segments connecting them
#[derive(Debug, Clone)]
pub struct OutcropTraces {
    points: Vec<Point2<f64>>,
    edges: Vec<[usize; 2]>,
}

impl OutcropTraces {
    /// Read traces from a CSV file
    ///
    /// Each row is `x0,y0,x1,y1` or `id,x0,y0,x1,y1`. A header row,
    /// `#` comment lines and whitespace around fields are accepted.
    pub fn from_csv<P: AsRef<Path>>(path: P, snap_tolerance: f64) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "reading outcrop traces");
        let file = File::open(path)?;
        Self::from_reader(file, snap_tolerance)
    }

    /// Read traces from any CSV source
    pub fn from_reader<R: Read>(reader: R, snap_tolerance: f64) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .comment(Some(b'#'))
            .from_reader(reader);

        let mut segments = Vec::new();
        for (idx, record) in rdr.records().enumerate() {
            let record = record?;
            let line = record.position().map_or(idx as u64 + 1, |pos| pos.line());

            let parsed: std::result::Result<Vec<f64>, _> = record.iter().map(str::parse::<f64>).collect();
            let values = match parsed {
                Ok(values) => values,
                // Only the first row may be a header
                Err(_) if idx == 0 => {
                    debug!(line, "skipping header row");
                    continue;
                }
                Err(e) => {
                    return Err(Error::Trace { line, message: format!("non-numeric field: {}", e) });
                }
            };

            let coords = match values.len() {
                4 => &values[..],
                5 => &values[1..],
                count => {
                    return Err(Error::Trace {
                        line,
                        message: format!("expected 4 or 5 fields, found {}", count),
                    });
                }
            };
            if coords.iter().any(|c| !c.is_finite()) {
                return Err(Error::Trace { line, message: "coordinates must be finite".to_string() });
            }

            segments.push((Point2::new(coords[0], coords[1]), Point2::new(coords[2], coords[3])));
        }

        Self::from_segments(&segments, snap_tolerance)
    }

    /// Build the network from raw segments, merging endpoints within `snap_tolerance`
    ///
    /// Degenerate segments (shorter than the tolerance, or whose endpoints
    /// merge into one point) are skipped.
    pub fn from_segments(segments: &[(Point2<f64>, Point2<f64>)], snap_tolerance: f64) -> Result<Self> {
        let mut traces = Self { points: Vec::new(), edges: Vec::new() };

        for (i, (a, b)) in segments.iter().enumerate() {
            if (b - a).norm() <= snap_tolerance {
                warn!(trace = i, "skipping zero-length trace");
                continue;
            }
            let ia = traces.insert_point(*a, snap_tolerance);
            let ib = traces.insert_point(*b, snap_tolerance);
            if ia == ib {
                warn!(trace = i, "skipping trace whose endpoints merge");
                continue;
            }
            traces.edges.push([ia, ib]);
        }

        if traces.edges.is_empty() {
            return Err(Error::Trace { line: 0, message: "no usable traces found".to_string() });
        }
        debug!(points = traces.points.len(), traces = traces.edges.len(), "trace network built");
        Ok(traces)
    }

    fn insert_point(&mut self, p: Point2<f64>, tol: f64) -> usize {
        if let Some(existing) = self.points.iter().position(|q| (q - p).norm() <= tol) {
            return existing;
        }
        self.points.push(p);
        self.points.len() - 1
    }

    pub fn points(&self) -> &[Point2<f64>] {
        &self.points
    }

    pub fn edges(&self) -> &[[usize; 2]] {
        &self.edges
    }

    pub fn num_traces(&self) -> usize {
        self.edges.len()
    }

    /// Endpoints of trace `i`
    pub fn segment(&self, i: usize) -> (Point2<f64>, Point2<f64>) {
        let [a, b] = self.edges[i];
        (self.points[a], self.points[b])
    }

    pub fn length(&self, i: usize) -> f64 {
        let (a, b) = self.segment(i);
        (b - a).norm()
    }

    /// Axis-aligned bounding box of all points (min, max)
    pub fn bounding_box(&self) -> (Point2<f64>, Point2<f64>) {
        let mut min = Point2::new(f64::INFINITY, f64::INFINITY);
        let mut max = Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in &self.points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        (min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_plain_rows() {
        let csv = "0,0,10,0\n5,-5,5,5\n";
        let traces = OutcropTraces::from_reader(csv.as_bytes(), 1e-6).unwrap();
        assert_eq!(traces.num_traces(), 2);
        assert_eq!(traces.points().len(), 4);
        assert_relative_eq!(traces.length(1), 10.0);
    }

    #[test]
    fn test_header_ids_comments_and_whitespace() {
        let csv = "\
FID, START_X, START_Y, END_X, END_Y
# mapped 2019
1, 0.0, 0.0, 4.0, 0.0
2, 4.0, 0.0, 4.0, 3.0
";
        let traces = OutcropTraces::from_reader(csv.as_bytes(), 1e-6).unwrap();
        assert_eq!(traces.num_traces(), 2);
        // (4, 0) is shared
        assert_eq!(traces.points().len(), 3);
        assert_eq!(traces.edges()[0][1], traces.edges()[1][0]);
    }

    #[test]
    fn test_snapping_merges_close_endpoints() {
        let csv = "0,0,1,0\n1.0005,0,2,0\n";
        let loose = OutcropTraces::from_reader(csv.as_bytes(), 1e-3).unwrap();
        let tight = OutcropTraces::from_reader(csv.as_bytes(), 1e-6).unwrap();
        assert_eq!(loose.points().len(), 3);
        assert_eq!(tight.points().len(), 4);
    }

    #[test]
    fn test_zero_length_trace_skipped() {
        let csv = "0,0,0,0\n0,0,1,1\n";
        let traces = OutcropTraces::from_reader(csv.as_bytes(), 1e-6).unwrap();
        assert_eq!(traces.num_traces(), 1);
    }

    #[test]
    fn test_bad_field_count() {
        let csv = "0,0,1,1\n0,0,1\n";
        let err = OutcropTraces::from_reader(csv.as_bytes(), 1e-6).unwrap_err();
        assert!(matches!(err, Error::Trace { line: 2, .. }), "{:?}", err);
    }

    #[test]
    fn test_non_numeric_after_first_row() {
        let csv = "0,0,1,1\n0,zero,1,1\n";
        let err = OutcropTraces::from_reader(csv.as_bytes(), 1e-6).unwrap_err();
        assert!(matches!(err, Error::Trace { line: 2, .. }), "{:?}", err);
    }

    #[test]
    fn test_empty_input() {
        let err = OutcropTraces::from_reader("x0,y0,x1,y1\n".as_bytes(), 1e-6).unwrap_err();
        assert!(matches!(err, Error::Trace { .. }));
    }

    #[test]
    fn test_bounding_box() {
        let csv = "-2,1,3,4\n0,-1,1,0\n";
        let traces = OutcropTraces::from_reader(csv.as_bytes(), 1e-6).unwrap();
        let (min, max) = traces.bounding_box();
        assert_relative_eq!(min.x, -2.0);
        assert_relative_eq!(min.y, -1.0);
        assert_relative_eq!(max.x, 3.0);
        assert_relative_eq!(max.y, 4.0);
    }
}
