//! Fracture network geometry from outcrop traces

pub mod domain;
pub mod extrusion;
pub mod intersection;
pub mod trace;

pub use domain::{Domain, DomainSide};
pub use extrusion::{Fracture, FractureIntersection, FractureNetwork, Subdomain, SubdomainKind};
pub use intersection::{find_intersections, segment_intersection, TraceIntersection};
pub use trace::OutcropTraces;
