//! Material and boundary parameters for each sub-domain

pub mod assign;
pub mod boundary;

pub use assign::{
    aperture, assign_parameters, densities, diffusivity, flow_boundary, permeability, porosity, specific_heats,
    specific_volume, subdomain_parameters, transport_boundary, PhaseValues, SubdomainParameters,
};
pub use boundary::{BoundaryCondition, BoundaryConditionType, BoundaryConditions};
