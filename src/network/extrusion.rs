//! 3D fracture network built by extruding outcrop traces
//!
//! Each trace becomes a vertical planar fracture spanning the domain depth.
//! Each crossing of two traces becomes a vertical intersection line shared by
//! the two fractures.

use std::fmt;

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::domain::Domain;
use super::intersection::find_intersections;
use super::trace::OutcropTraces;
use crate::config::NetworkConfig;
use crate::error::{Error, Result};

/// Vertical quadrilateral fracture
#[derive(Debug, Clone, PartialEq)]
pub struct Fracture {
    pub id: usize,
    /// Index of the trace it was extruded from
    pub trace: usize,
    /// Counter-clockwise seen from the normal: bottom-a, bottom-b, top-b, top-a
    pub vertices: [Point3<f64>; 4],
}

impl Fracture {
    pub fn width(&self) -> f64 {
        (self.vertices[1] - self.vertices[0]).norm()
    }

    pub fn height(&self) -> f64 {
        (self.vertices[3] - self.vertices[0]).norm()
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn centroid(&self) -> Point3<f64> {
        let sum = self.vertices.iter().fold(Vector3::zeros(), |acc, v| acc + v.coords);
        Point3::from(sum / 4.0)
    }

    /// Unit normal, horizontal for an extruded fracture
    pub fn normal(&self) -> Vector3<f64> {
        let along = self.vertices[1] - self.vertices[0];
        let up = self.vertices[3] - self.vertices[0];
        along.cross(&up).normalize()
    }
}

/// Line shared by two fractures
#[derive(Debug, Clone, PartialEq)]
pub struct FractureIntersection {
    pub id: usize,
    /// Fracture ids, ascending
    pub fractures: [usize; 2],
    pub start: Point3<f64>,
    pub end: Point3<f64>,
}

impl FractureIntersection {
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }
}

/// Topological dimension of a sub-domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubdomainKind {
    /// 3D rock matrix
    Matrix,
    /// 2D fracture plane
    Fracture,
    /// 1D fracture intersection line
    Intersection,
}

impl SubdomainKind {
    pub fn dim(self) -> usize {
        match self {
            SubdomainKind::Matrix => 3,
            SubdomainKind::Fracture => 2,
            SubdomainKind::Intersection => 1,
        }
    }

    pub fn from_dim(dim: usize) -> Option<Self> {
        match dim {
            3 => Some(SubdomainKind::Matrix),
            2 => Some(SubdomainKind::Fracture),
            1 => Some(SubdomainKind::Intersection),
            _ => None,
        }
    }
}

impl fmt::Display for SubdomainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubdomainKind::Matrix => write!(f, "matrix"),
            SubdomainKind::Fracture => write!(f, "fracture"),
            SubdomainKind::Intersection => write!(f, "intersection"),
        }
    }
}

/// One piece of the mixed-dimensional domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subdomain {
    pub kind: SubdomainKind,
    /// Index among sub-domains of the same kind
    pub id: usize,
}

impl Subdomain {
    pub fn dim(&self) -> usize {
        self.kind.dim()
    }
}

impl fmt::Display for Subdomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

/// Domain box with its fractures and their intersection lines
#[derive(Debug, Clone)]
pub struct FractureNetwork {
    pub domain: Domain,
    pub fractures: Vec<Fracture>,
    pub intersections: Vec<FractureIntersection>,
}

impl FractureNetwork {
    /// Extrude every trace between `z_min` and `z_max`
    ///
    /// Trace crossings are detected with `snap_tolerance` of slack, so
    /// traces that end on another trace still produce an intersection line.
    pub fn extrude(traces: &OutcropTraces, config: &NetworkConfig) -> Result<Self> {
        let (z_min, z_max) = (config.z_min, config.z_max);
        if !(z_max > z_min) {
            return Err(Error::config(format!(
                "cannot extrude traces: z_max ({}) must exceed z_min ({})",
                z_max, z_min
            )));
        }

        let domain = Domain::around_traces(traces, z_min, z_max, config.domain_padding);

        let fractures: Vec<Fracture> = (0..traces.num_traces())
            .map(|i| {
                let (a, b) = traces.segment(i);
                Fracture {
                    id: i,
                    trace: i,
                    vertices: [
                        Point3::new(a.x, a.y, z_min),
                        Point3::new(b.x, b.y, z_min),
                        Point3::new(b.x, b.y, z_max),
                        Point3::new(a.x, a.y, z_max),
                    ],
                }
            })
            .collect();

        let intersections: Vec<FractureIntersection> = find_intersections(traces, config.snap_tolerance)
            .into_iter()
            .enumerate()
            .map(|(id, hit)| FractureIntersection {
                id,
                fractures: [hit.first, hit.second],
                start: Point3::new(hit.point.x, hit.point.y, z_min),
                end: Point3::new(hit.point.x, hit.point.y, z_max),
            })
            .collect();

        for line in &intersections {
            debug!(
                id = line.id,
                first = line.fractures[0],
                second = line.fractures[1],
                x = line.start.x,
                y = line.start.y,
                "fracture intersection"
            );
        }
        info!(
            fractures = fractures.len(),
            intersections = intersections.len(),
            "fracture network extruded"
        );

        Ok(Self { domain, fractures, intersections })
    }

    pub fn num_fractures(&self) -> usize {
        self.fractures.len()
    }

    pub fn num_intersections(&self) -> usize {
        self.intersections.len()
    }

    /// Matrix + fractures + intersections
    pub fn num_subdomains(&self) -> usize {
        1 + self.fractures.len() + self.intersections.len()
    }

    /// Matrix first, then fractures, then intersection lines
    pub fn subdomains(&self) -> Vec<Subdomain> {
        let mut all = Vec::with_capacity(self.num_subdomains());
        all.push(Subdomain { kind: SubdomainKind::Matrix, id: 0 });
        all.extend(self.fractures.iter().map(|f| Subdomain { kind: SubdomainKind::Fracture, id: f.id }));
        all.extend(
            self.intersections
                .iter()
                .map(|l| Subdomain { kind: SubdomainKind::Intersection, id: l.id }),
        );
        all
    }

    /// Total fracture area (m²)
    pub fn fracture_area(&self) -> f64 {
        self.fractures.iter().map(Fracture::area).sum()
    }

    /// Intersection lines lying on fracture `id`
    pub fn intersections_of(&self, id: usize) -> impl Iterator<Item = &FractureIntersection> {
        self.intersections.iter().filter(move |l| l.fractures.contains(&id))
    }
}
