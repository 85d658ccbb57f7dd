/// Full run of the coupled driver on a 1D finite-volume column
///
/// Pressure drives Darcy flow from west to east; cold water advects into a
/// hot column while heat conducts. Coefficients come from the matrix
/// parameter record.

use approx::assert_relative_eq;
use fracflow::network::DomainSide;
use fracflow::parameters::{subdomain_parameters, SubdomainParameters};
use fracflow::{
    Error, LinearSystem, PressureProblem, Result, SimulationConfig, SimulationObserver, SolverConfig, SolverPath,
    SolverStats, StepRecord, Subdomain, SubdomainKind, TimeSchedule, TransportProblem, WeaklyCoupledSimulation,
};
use sprs::TriMat;

const VISCOSITY: f64 = 1e-3;

struct Column {
    cells: usize,
    length: f64,
    params: SubdomainParameters,
    initial_temperature: f64,
}

impl Column {
    fn new(cells: usize, config: &SimulationConfig) -> Self {
        let params = subdomain_parameters(Subdomain { kind: SubdomainKind::Matrix, id: 0 }, &config.parameters);
        Self { cells, length: 100.0, params, initial_temperature: config.parameters.initial_temperature }
    }

    fn dx(&self) -> f64 {
        self.length / self.cells as f64
    }
}

struct Flow<'a> {
    column: &'a Column,
}

impl PressureProblem for Flow<'_> {
    fn assemble_pressure(&mut self) -> Result<LinearSystem> {
        let c = self.column;
        let n = c.cells;
        // Uniform permeability cancels out of the pressure equation
        let t = 1.0 / (c.dx() * c.dx());
        let west = c.params.flow_boundary.at(DomainSide::West).value;
        let east = c.params.flow_boundary.at(DomainSide::East).value;

        let mut triplets = TriMat::new((n, n));
        let mut rhs = vec![0.0; n];
        for i in 0..n {
            let mut diag = 0.0;
            if i > 0 {
                triplets.add_triplet(i, i - 1, -t);
                diag += t;
            } else {
                // Half-cell distance to the boundary face
                diag += 2.0 * t;
                rhs[i] += 2.0 * t * west;
            }
            if i + 1 < n {
                triplets.add_triplet(i, i + 1, -t);
                diag += t;
            } else {
                diag += 2.0 * t;
                rhs[i] += 2.0 * t * east;
            }
            triplets.add_triplet(i, i, diag);
        }
        Ok(LinearSystem::new(triplets.to_csr(), rhs))
    }
}

struct Heat<'a> {
    column: &'a Column,
    /// Darcy flux on all n + 1 faces, positive eastward
    fluxes: Vec<f64>,
}

impl TransportProblem for Heat<'_> {
    fn couple(&mut self, pressure: &[f64]) -> Result<()> {
        let c = self.column;
        if pressure.len() != c.cells {
            return Err(Error::Config { message: "pressure size does not match the column".to_string() });
        }
        let k = c.params.permeability / VISCOSITY;
        let dx = c.dx();
        let west = c.params.flow_boundary.at(DomainSide::West).value;
        let east = c.params.flow_boundary.at(DomainSide::East).value;

        let mut fluxes = Vec::with_capacity(c.cells + 1);
        fluxes.push(-k * (pressure[0] - west) / (0.5 * dx));
        fluxes.extend(pressure.windows(2).map(|w| -k * (w[1] - w[0]) / dx));
        fluxes.push(-k * (east - pressure[c.cells - 1]) / (0.5 * dx));
        self.fluxes = fluxes;
        Ok(())
    }

    fn initial_state(&self) -> Vec<f64> {
        vec![self.column.initial_temperature; self.column.cells]
    }

    fn assemble_step(&mut self, previous: &[f64], _time: f64, dt: f64) -> Result<LinearSystem> {
        let c = self.column;
        let n = c.cells;
        let dx = c.dx();
        let storage = c.params.effective_heat_capacity() / dt;
        let cond = c.params.diffusivity / (dx * dx);
        let adv = c.params.densities.fluid * c.params.specific_heats.fluid / dx;
        let inflow = c.params.transport_boundary.at(DomainSide::West).value;

        let mut triplets = TriMat::new((n, n));
        let mut rhs: Vec<f64> = previous.iter().map(|t| storage * t).collect();
        for i in 0..n {
            // Upwind: face i is west of cell i, face i + 1 east of it
            let (q_in, q_out) = (self.fluxes[i].max(0.0), self.fluxes[i + 1].max(0.0));
            let mut diag = storage + adv * q_out;
            if i > 0 {
                triplets.add_triplet(i, i - 1, -cond - adv * q_in);
                diag += cond;
            } else {
                diag += 2.0 * cond;
                rhs[i] += (2.0 * cond + adv * q_in) * inflow;
            }
            if i + 1 < n {
                triplets.add_triplet(i, i + 1, -cond);
                diag += cond;
            }
            triplets.add_triplet(i, i, diag);
        }
        Ok(LinearSystem::new(triplets.to_csr(), rhs))
    }
}

#[derive(Default)]
struct Recorder {
    pressure_path: Option<SolverPath>,
    steps: Vec<(usize, f64)>,
    paths: Vec<SolverPath>,
    west_temperatures: Vec<f64>,
}

impl SimulationObserver for Recorder {
    fn pressure_solved(&mut self, _pressure: &[f64], path: SolverPath, _stats: &SolverStats) {
        self.pressure_path = Some(path);
    }

    fn transport_step(&mut self, record: &StepRecord, state: &[f64]) {
        self.steps.push((record.step, record.time));
        self.paths.push(record.path);
        self.west_temperatures.push(state[0]);
    }
}

fn run(cells: usize, solver: SolverConfig) -> (fracflow::SimulationReport, Recorder) {
    let config = SimulationConfig::default();
    let column = Column::new(cells, &config);
    let mut sim = WeaklyCoupledSimulation::new(TimeSchedule::from_config(&config.time_stepping).unwrap(), solver);
    let mut flow = Flow { column: &column };
    let mut heat = Heat { column: &column, fluxes: Vec::new() };
    let mut recorder = Recorder::default();
    let report = sim.run(&mut flow, &mut heat, &mut recorder).unwrap();
    (report, recorder)
}

#[test]
fn observer_sees_every_step() {
    let (report, recorder) = run(50, SolverConfig::default());

    assert_eq!(recorder.pressure_path, Some(SolverPath::Direct));
    assert_eq!(recorder.steps.len(), 10);
    let indices: Vec<usize> = recorder.steps.iter().map(|s| s.0).collect();
    assert_eq!(indices, (1..=10).collect::<Vec<_>>());
    let schedule = TimeSchedule::default();
    assert_eq!(recorder.steps[9].1, schedule.end_time());
    assert_eq!(report.final_time(), schedule.end_time());
}

#[test]
fn pressure_is_linear_and_column_cools_from_the_west() {
    let (report, recorder) = run(50, SolverConfig::default());

    // Linear profile between the boundary pressures
    let dp = (1.1e6 - 1.0e6) / 50.0;
    for (i, p) in report.pressure.iter().enumerate() {
        assert_relative_eq!(*p, 1.1e6 - dp * (i as f64 + 0.5), max_relative = 1e-9);
    }

    // Bounded by the inflow and initial temperatures, coldest at the inlet
    for t in &report.state {
        assert!(*t >= 283.15 - 1e-6 && *t <= 353.15 + 1e-6);
    }
    assert!(report.state[0] < report.state[49]);
    assert!(recorder.west_temperatures.windows(2).all(|w| w[1] <= w[0] + 1e-9));
}

#[test]
fn iterative_branch_matches_direct() {
    let direct = run(80, SolverConfig::default()).0;
    let forced = SolverConfig { direct_threshold: 80, ..SolverConfig::default() };
    let (iterative, recorder) = run(80, forced);

    assert_eq!(iterative.pressure_path, SolverPath::Iterative);
    assert!(recorder.paths.iter().all(|p| *p == SolverPath::Iterative));
    assert_eq!(iterative.iterative_steps(), 10);
    assert!(iterative.total_iterations() > 0);

    for (a, b) in direct.state.iter().zip(iterative.state.iter()) {
        assert_relative_eq!(*a, *b, max_relative = 1e-6);
    }
    for (a, b) in direct.pressure.iter().zip(iterative.pressure.iter()) {
        assert_relative_eq!(*a, *b, max_relative = 1e-8);
    }
}
