use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use super::trace::OutcropTraces;

/// Faces of the box-shaped simulation domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainSide {
    /// x = x_min
    West,
    /// x = x_max
    East,
    /// y = y_min
    South,
    /// y = y_max
    North,
    /// z = z_min
    Bottom,
    /// z = z_max
    Top,
}

impl DomainSide {
    pub const ALL: [DomainSide; 6] = [
        DomainSide::West,
        DomainSide::East,
        DomainSide::South,
        DomainSide::North,
        DomainSide::Bottom,
        DomainSide::Top,
    ];

    pub(crate) fn index(self) -> usize {
        match self {
            DomainSide::West => 0,
            DomainSide::East => 1,
            DomainSide::South => 2,
            DomainSide::North => 3,
            DomainSide::Bottom => 4,
            DomainSide::Top => 5,
        }
    }
}

/// Axis-aligned box enclosing the fracture network
#[derive(Debug, Clone, PartialEq)]
pub struct Domain {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Domain {
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// Trace bounding box grown by `padding` in x and y, spanning [z_min, z_max]
    pub fn around_traces(traces: &OutcropTraces, z_min: f64, z_max: f64, padding: f64) -> Self {
        let (lo, hi) = traces.bounding_box();
        Self {
            min: Point3::new(lo.x - padding, lo.y - padding, z_min),
            max: Point3::new(hi.x + padding, hi.y + padding, z_max),
        }
    }

    pub fn extent(&self) -> Vector3<f64> {
        self.max - self.min
    }

    pub fn volume(&self) -> f64 {
        let e = self.extent();
        e.x * e.y * e.z
    }

    pub fn contains(&self, p: &Point3<f64>, tol: f64) -> bool {
        (0..3).all(|d| p[d] >= self.min[d] - tol && p[d] <= self.max[d] + tol)
    }

    /// Side of the box that `p` lies on, within `tol`
    ///
    /// Points on an edge or corner report the first matching side in
    /// [`DomainSide::ALL`] order. Interior and outside points give `None`.
    pub fn side_of(&self, p: &Point3<f64>, tol: f64) -> Option<DomainSide> {
        if !self.contains(p, tol) {
            return None;
        }
        DomainSide::ALL.into_iter().find(|side| {
            let (axis, bound) = match side {
                DomainSide::West => (0, self.min.x),
                DomainSide::East => (0, self.max.x),
                DomainSide::South => (1, self.min.y),
                DomainSide::North => (1, self.max.y),
                DomainSide::Bottom => (2, self.min.z),
                DomainSide::Top => (2, self.max.z),
            };
            (p[axis] - bound).abs() <= tol
        })
    }
}
