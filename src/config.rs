//! Configuration management for outcrop flow-and-transport runs
//!
//! Reads TOML configuration files and provides structured data for building
//! the fracture network, assigning sub-domain parameters, time stepping and
//! linear solver selection. Every section falls back to defaults, so a file
//! only needs to name what it changes.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Error, Result};
use crate::utils::units::years_to_seconds;

/// Main simulation configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub network: NetworkConfig,
    pub parameters: ParameterConfig,
    pub time_stepping: TimeSteppingConfig,
    pub solver: SolverConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// CSV file with one outcrop trace per row
    pub trace_file: PathBuf,
    /// Bottom of the extruded domain (m)
    pub z_min: f64,
    /// Top of the extruded domain (m)
    pub z_max: f64,
    /// Trace endpoints closer than this are merged (m)
    pub snap_tolerance: f64,
    /// Margin added around the trace bounding box in x and y (m)
    pub domain_padding: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            trace_file: PathBuf::from("inputs/outcrop_traces.csv"),
            z_min: 0.0,
            z_max: 50.0,
            snap_tolerance: 1e-6,
            domain_padding: 10.0,
        }
    }
}

/// Physical constants consumed by the per-dimension parameter functions
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ParameterConfig {
    /// Rock matrix permeability (m²)
    pub matrix_permeability: f64,
    /// Hydraulic aperture of fractures and their intersections (m)
    pub fracture_aperture: f64,
    pub matrix_porosity: f64,
    pub fracture_porosity: f64,
    /// Fluid pressure on the inflow (west) boundary (Pa)
    pub inflow_pressure: f64,
    /// Fluid pressure on the outflow (east) boundary (Pa)
    pub outflow_pressure: f64,
    /// Temperature of the injected fluid (K)
    pub inflow_temperature: f64,
    /// Temperature of the rock and fluid at t = 0 (K)
    pub initial_temperature: f64,
    pub fluid_density: f64,
    pub solid_density: f64,
    /// J/(kg·K)
    pub fluid_specific_heat: f64,
    pub solid_specific_heat: f64,
    /// W/(m·K)
    pub fluid_conductivity: f64,
    pub solid_conductivity: f64,
}

impl Default for ParameterConfig {
    fn default() -> Self {
        Self {
            matrix_permeability: 1e-14,
            fracture_aperture: 1e-4,
            matrix_porosity: 0.2,
            fracture_porosity: 0.8,
            inflow_pressure: 1.1e6,
            outflow_pressure: 1.0e6,
            inflow_temperature: 283.15,
            initial_temperature: 353.15,
            fluid_density: 1000.0,
            solid_density: 2700.0,
            fluid_specific_heat: 4200.0,
            solid_specific_heat: 790.0,
            fluid_conductivity: 0.6,
            solid_conductivity: 2.5,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeSteppingConfig {
    pub end_time_years: f64,
    pub num_steps: usize,
}

impl Default for TimeSteppingConfig {
    fn default() -> Self {
        Self {
            end_time_years: 10.0,
            num_steps: 10,
        }
    }
}

impl TimeSteppingConfig {
    pub fn end_time_seconds(&self) -> f64 {
        years_to_seconds(self.end_time_years)
    }
}

/// Linear solver selection
///
/// Systems with fewer than `direct_threshold` unknowns are solved with
/// sparse LU, the rest with GMRES + ILU(0).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SolverConfig {
    pub direct_threshold: usize,
    pub gmres_max_iterations: usize,
    pub gmres_restart: usize,
    /// Relative residual ||b - Ax|| / ||b||
    pub gmres_tolerance: f64,
    /// Log GMRES progress at DEBUG every this many iterations
    pub gmres_report_every: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            direct_threshold: 40_000,
            gmres_max_iterations: 10_000,
            gmres_restart: 1500,
            gmres_tolerance: 1e-8,
            gmres_report_every: 50,
        }
    }
}

impl SimulationConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the run cannot work with
    pub fn validate(&self) -> Result<()> {
        let net = &self.network;
        if !(net.z_max > net.z_min) {
            return Err(Error::config(format!(
                "network.z_max ({}) must exceed network.z_min ({})",
                net.z_max, net.z_min
            )));
        }
        if !(net.snap_tolerance >= 0.0) || !(net.domain_padding >= 0.0) {
            return Err(Error::config("network.snap_tolerance and network.domain_padding must be non-negative"));
        }

        let p = &self.parameters;
        for (name, value) in [
            ("matrix_permeability", p.matrix_permeability),
            ("fracture_aperture", p.fracture_aperture),
            ("fluid_density", p.fluid_density),
            ("solid_density", p.solid_density),
            ("fluid_specific_heat", p.fluid_specific_heat),
            ("solid_specific_heat", p.solid_specific_heat),
            ("fluid_conductivity", p.fluid_conductivity),
            ("solid_conductivity", p.solid_conductivity),
        ] {
            if !(value > 0.0) || !value.is_finite() {
                return Err(Error::config(format!("parameters.{} must be positive, got {}", name, value)));
            }
        }
        for (name, value) in [("matrix_porosity", p.matrix_porosity), ("fracture_porosity", p.fracture_porosity)] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(Error::config(format!("parameters.{} must lie in (0, 1], got {}", name, value)));
            }
        }

        let ts = &self.time_stepping;
        if !(ts.end_time_years > 0.0) || ts.num_steps == 0 {
            return Err(Error::config("time_stepping needs end_time_years > 0 and num_steps > 0"));
        }

        let s = &self.solver;
        if s.direct_threshold == 0 || s.gmres_max_iterations == 0 || s.gmres_restart == 0 {
            return Err(Error::config(
                "solver.direct_threshold, gmres_max_iterations and gmres_restart must be positive",
            ));
        }
        if !(s.gmres_tolerance > 0.0) {
            return Err(Error::config(format!("solver.gmres_tolerance must be positive, got {}", s.gmres_tolerance)));
        }
        Ok(())
    }

    /// Log configuration summary
    pub fn log_summary(&self) {
        info!(
            trace_file = %self.network.trace_file.display(),
            z_min = self.network.z_min,
            z_max = self.network.z_max,
            "network"
        );
        info!(
            k_matrix = self.parameters.matrix_permeability,
            aperture = self.parameters.fracture_aperture,
            "parameters"
        );
        info!(
            end_time_years = self.time_stepping.end_time_years,
            num_steps = self.time_stepping.num_steps,
            "time stepping"
        );
        info!(
            "solver: direct below {} unknowns, else GMRES (restart={}, max_iter={}, tol={:.0e})",
            self.solver.direct_threshold,
            self.solver.gmres_restart,
            self.solver.gmres_max_iterations,
            self.solver.gmres_tolerance
        );
    }
}
