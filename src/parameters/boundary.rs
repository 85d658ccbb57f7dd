//! Boundary condition records per domain side

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::network::{Domain, DomainSide};

/// Type of boundary condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryConditionType {
    /// Prescribed value
    Dirichlet,
    /// Prescribed flux
    Neumann,
}

/// Condition type and its value (Pa or K for Dirichlet, flux for Neumann)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryCondition {
    pub kind: BoundaryConditionType,
    pub value: f64,
}

impl BoundaryCondition {
    pub fn dirichlet(value: f64) -> Self {
        Self { kind: BoundaryConditionType::Dirichlet, value }
    }

    pub fn neumann(value: f64) -> Self {
        Self { kind: BoundaryConditionType::Neumann, value }
    }

    /// Zero flux
    pub fn no_flow() -> Self {
        Self::neumann(0.0)
    }

    pub fn is_dirichlet(&self) -> bool {
        self.kind == BoundaryConditionType::Dirichlet
    }
}

/// One condition for each of the six domain sides
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryConditions {
    sides: [BoundaryCondition; 6],
}

impl BoundaryConditions {
    /// Same condition on every side
    pub fn uniform(bc: BoundaryCondition) -> Self {
        Self { sides: [bc; 6] }
    }

    /// Zero-flux Neumann everywhere
    pub fn no_flow() -> Self {
        Self::uniform(BoundaryCondition::no_flow())
    }

    pub fn with_side(mut self, side: DomainSide, bc: BoundaryCondition) -> Self {
        self.sides[side.index()] = bc;
        self
    }

    pub fn at(&self, side: DomainSide) -> BoundaryCondition {
        self.sides[side.index()]
    }

    /// Condition for a boundary face centred at `point`
    ///
    /// Returns `None` for points not on the domain boundary.
    pub fn for_point(&self, domain: &Domain, point: &Point3<f64>, tol: f64) -> Option<BoundaryCondition> {
        domain.side_of(point, tol).map(|side| self.at(side))
    }

    /// Sides carrying a Dirichlet condition
    pub fn dirichlet_sides(&self) -> impl Iterator<Item = DomainSide> + '_ {
        DomainSide::ALL.into_iter().filter(|side| self.at(*side).is_dirichlet())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sides() {
        let bcs = BoundaryConditions::no_flow()
            .with_side(DomainSide::West, BoundaryCondition::dirichlet(2.0))
            .with_side(DomainSide::East, BoundaryCondition::dirichlet(1.0));

        assert_eq!(bcs.at(DomainSide::West), BoundaryCondition::dirichlet(2.0));
        assert_eq!(bcs.at(DomainSide::Top), BoundaryCondition::no_flow());
        let sides: Vec<DomainSide> = bcs.dirichlet_sides().collect();
        assert_eq!(sides, vec![DomainSide::West, DomainSide::East]);
    }

    #[test]
    fn test_for_point() {
        let domain = Domain::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let bcs = BoundaryConditions::no_flow().with_side(DomainSide::East, BoundaryCondition::dirichlet(5.0));

        let east = bcs.for_point(&domain, &Point3::new(1.0, 0.5, 0.5), 1e-9);
        assert_eq!(east, Some(BoundaryCondition::dirichlet(5.0)));
        let top = bcs.for_point(&domain, &Point3::new(0.5, 0.5, 1.0), 1e-9);
        assert_eq!(top, Some(BoundaryCondition::no_flow()));
        assert_eq!(bcs.for_point(&domain, &Point3::new(0.5, 0.5, 0.5), 1e-9), None);
    }
}
