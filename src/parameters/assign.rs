//! Physical parameters per sub-domain
//!
//! Every quantity is a pure function of the sub-domain kind and the
//! [`ParameterConfig`]. Lower-dimensional sub-domains carry their aperture
//! through the specific volume `a^(3 - dim)`: fractures (dim 2) scale by `a`,
//! intersection lines (dim 1) by `a²`.

use serde::Serialize;
use tracing::debug;

use super::boundary::{BoundaryCondition, BoundaryConditions};
use crate::config::ParameterConfig;
use crate::network::{DomainSide, FractureNetwork, Subdomain, SubdomainKind};

/// Fluid and solid value of a material property
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhaseValues {
    pub fluid: f64,
    pub solid: f64,
}

/// Everything the flow and transport problems read for one sub-domain
#[derive(Debug, Clone, PartialEq)]
pub struct SubdomainParameters {
    pub subdomain: Subdomain,
    /// Intrinsic permeability (m²)
    pub permeability: f64,
    pub porosity: f64,
    /// Hydraulic aperture (m); 1 for the matrix
    pub aperture: f64,
    /// Pressure conditions
    pub flow_boundary: BoundaryConditions,
    /// Temperature conditions
    pub transport_boundary: BoundaryConditions,
    /// Effective thermal conductivity (W/(m·K))
    pub diffusivity: f64,
    /// kg/m³
    pub densities: PhaseValues,
    /// J/(kg·K)
    pub specific_heats: PhaseValues,
}

impl SubdomainParameters {
    pub fn kind(&self) -> SubdomainKind {
        self.subdomain.kind
    }

    pub fn specific_volume(&self) -> f64 {
        self.aperture.powi(3 - self.subdomain.dim() as i32)
    }

    /// Volumetric heat capacity of the saturated medium (J/(m³·K))
    pub fn effective_heat_capacity(&self) -> f64 {
        let phi = self.porosity;
        phi * self.densities.fluid * self.specific_heats.fluid
            + (1.0 - phi) * self.densities.solid * self.specific_heats.solid
    }

    /// Permeability times specific volume, the coefficient a flux discretization uses
    pub fn scaled_permeability(&self) -> f64 {
        self.permeability * self.specific_volume()
    }
}

pub fn aperture(kind: SubdomainKind, config: &ParameterConfig) -> f64 {
    match kind {
        SubdomainKind::Matrix => 1.0,
        SubdomainKind::Fracture | SubdomainKind::Intersection => config.fracture_aperture,
    }
}

pub fn specific_volume(kind: SubdomainKind, config: &ParameterConfig) -> f64 {
    aperture(kind, config).powi(3 - kind.dim() as i32)
}

/// Matrix value for the rock, cubic law `a²/12` for fractures and intersections
pub fn permeability(kind: SubdomainKind, config: &ParameterConfig) -> f64 {
    match kind {
        SubdomainKind::Matrix => config.matrix_permeability,
        SubdomainKind::Fracture | SubdomainKind::Intersection => {
            let a = config.fracture_aperture;
            a * a / 12.0
        }
    }
}

pub fn porosity(kind: SubdomainKind, config: &ParameterConfig) -> f64 {
    match kind {
        SubdomainKind::Matrix => config.matrix_porosity,
        SubdomainKind::Fracture | SubdomainKind::Intersection => config.fracture_porosity,
    }
}

/// Porosity-weighted mean of fluid and solid conductivity
pub fn diffusivity(kind: SubdomainKind, config: &ParameterConfig) -> f64 {
    let phi = porosity(kind, config);
    phi * config.fluid_conductivity + (1.0 - phi) * config.solid_conductivity
}

pub fn densities(config: &ParameterConfig) -> PhaseValues {
    PhaseValues { fluid: config.fluid_density, solid: config.solid_density }
}

pub fn specific_heats(config: &ParameterConfig) -> PhaseValues {
    PhaseValues { fluid: config.fluid_specific_heat, solid: config.solid_specific_heat }
}

/// Pressure drop from the west to the east side, no flow elsewhere
///
/// Intersection lines never reach the outer boundary through a face of
/// their own, so they are closed.
pub fn flow_boundary(kind: SubdomainKind, config: &ParameterConfig) -> BoundaryConditions {
    match kind {
        SubdomainKind::Matrix | SubdomainKind::Fracture => BoundaryConditions::no_flow()
            .with_side(DomainSide::West, BoundaryCondition::dirichlet(config.inflow_pressure))
            .with_side(DomainSide::East, BoundaryCondition::dirichlet(config.outflow_pressure)),
        SubdomainKind::Intersection => BoundaryConditions::no_flow(),
    }
}

/// Cold injection temperature on the west side, zero conductive flux elsewhere
pub fn transport_boundary(kind: SubdomainKind, config: &ParameterConfig) -> BoundaryConditions {
    match kind {
        SubdomainKind::Matrix | SubdomainKind::Fracture => BoundaryConditions::no_flow()
            .with_side(DomainSide::West, BoundaryCondition::dirichlet(config.inflow_temperature)),
        SubdomainKind::Intersection => BoundaryConditions::no_flow(),
    }
}

/// Full parameter record for one sub-domain
pub fn subdomain_parameters(subdomain: Subdomain, config: &ParameterConfig) -> SubdomainParameters {
    let kind = subdomain.kind;
    SubdomainParameters {
        subdomain,
        permeability: permeability(kind, config),
        porosity: porosity(kind, config),
        aperture: aperture(kind, config),
        flow_boundary: flow_boundary(kind, config),
        transport_boundary: transport_boundary(kind, config),
        diffusivity: diffusivity(kind, config),
        densities: densities(config),
        specific_heats: specific_heats(config),
    }
}

/// One record per sub-domain, in [`FractureNetwork::subdomains`] order
pub fn assign_parameters(network: &FractureNetwork, config: &ParameterConfig) -> Vec<SubdomainParameters> {
    let params: Vec<SubdomainParameters> = network
        .subdomains()
        .into_iter()
        .map(|sd| subdomain_parameters(sd, config))
        .collect();

    for kind in [SubdomainKind::Matrix, SubdomainKind::Fracture, SubdomainKind::Intersection] {
        if let Some(p) = params.iter().find(|p| p.kind() == kind) {
            debug!(
                %kind,
                count = params.iter().filter(|q| q.kind() == kind).count(),
                permeability = p.permeability,
                porosity = p.porosity,
                specific_volume = p.specific_volume(),
                "sub-domain parameters"
            );
        }
    }
    params
}
