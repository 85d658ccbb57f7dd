/// From a trace file on disk to per-sub-domain parameters

use std::io::Write;

use approx::assert_relative_eq;
use fracflow::network::DomainSide;
use fracflow::parameters::BoundaryConditionType;
use fracflow::{assign_parameters, Error, FractureNetwork, OutcropTraces, SimulationConfig, SubdomainKind};
use nalgebra::Point3;

const TRACES: &str = "\
# two crossing traces and one ending on the first
id, x0, y0, x1, y1
1, 0.0, 0.0, 20.0, 0.0
2, 10.0, -5.0, 10.0, 5.0
3, 15.0, 0.0, 15.0, 8.0
4, 30.0, 30.0, 40.0, 30.0
";

fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
fn network_from_trace_file() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_file(&dir, "traces.csv", TRACES);
    let config = SimulationConfig::from_toml_str(
        "[network]\nz_min = -25.0\nz_max = 0.0\ndomain_padding = 2.0\nsnap_tolerance = 1e-6",
    )
    .unwrap();

    let traces = OutcropTraces::from_csv(&csv, config.network.snap_tolerance).unwrap();
    assert_eq!(traces.num_traces(), 4);
    // (15, 0) lies inside trace 1 and is not a shared endpoint
    assert_eq!(traces.points().len(), 8);

    let network = FractureNetwork::extrude(&traces, &config.network).unwrap();
    assert_eq!(network.num_fractures(), 4);

    let pairs: Vec<[usize; 2]> = network.intersections.iter().map(|l| l.fractures).collect();
    assert_eq!(pairs, vec![[0, 1], [0, 2]]);
    let t_junction = &network.intersections[1];
    assert_relative_eq!(t_junction.start.x, 15.0, epsilon = 1e-9);
    assert_relative_eq!(t_junction.start.y, 0.0, epsilon = 1e-9);
    assert_relative_eq!(t_junction.length(), 25.0);

    let d = &network.domain;
    assert_relative_eq!(d.min.x, -2.0);
    assert_relative_eq!(d.max.x, 42.0);
    assert_relative_eq!(d.min.y, -7.0);
    assert_relative_eq!(d.max.y, 32.0);
    assert_eq!(d.side_of(&Point3::new(-2.0, 10.0, -5.0), 1e-9), Some(DomainSide::West));
}

#[test]
fn parameters_follow_subdomain_order() {
    let traces = OutcropTraces::from_reader(TRACES.as_bytes(), 1e-6).unwrap();
    let config = SimulationConfig::default();
    let network = FractureNetwork::extrude(&traces, &config.network).unwrap();

    let params = assign_parameters(&network, &config.parameters);
    assert_eq!(params.len(), network.num_subdomains());
    assert_eq!(params.len(), 1 + 4 + 2);

    let kinds: Vec<SubdomainKind> = params.iter().map(|p| p.kind()).collect();
    assert_eq!(kinds[0], SubdomainKind::Matrix);
    assert!(kinds[1..5].iter().all(|k| *k == SubdomainKind::Fracture));
    assert!(kinds[5..].iter().all(|k| *k == SubdomainKind::Intersection));

    let matrix = &params[0];
    assert_relative_eq!(matrix.specific_volume(), 1.0);
    assert_relative_eq!(matrix.permeability, 1e-14);
    assert_eq!(matrix.flow_boundary.at(DomainSide::West).kind, BoundaryConditionType::Dirichlet);
    assert_relative_eq!(matrix.flow_boundary.at(DomainSide::West).value, 1.1e6);

    let fracture = &params[1];
    let a = config.parameters.fracture_aperture;
    assert_relative_eq!(fracture.specific_volume(), a);
    assert_relative_eq!(fracture.permeability, a * a / 12.0);

    let line = &params[6];
    assert_relative_eq!(line.specific_volume(), a * a);
    assert_eq!(line.transport_boundary.at(DomainSide::West).kind, BoundaryConditionType::Neumann);
}

#[test]
fn config_file_drives_the_setup() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_file(&dir, "traces.csv", TRACES);
    let toml = format!(
        "[network]\ntrace_file = {:?}\nz_max = 30.0\n\n[parameters]\nfracture_aperture = 2e-4\n",
        csv.display().to_string()
    );
    let config_path = write_file(&dir, "run.toml", &toml);

    let config = SimulationConfig::from_file(&config_path).unwrap();
    assert_eq!(config.network.trace_file, csv);

    let traces = OutcropTraces::from_csv(&config.network.trace_file, config.network.snap_tolerance).unwrap();
    let network = FractureNetwork::extrude(&traces, &config.network).unwrap();
    let params = assign_parameters(&network, &config.parameters);
    assert_relative_eq!(params[1].aperture, 2e-4);
    assert_relative_eq!(network.fractures[0].height(), 30.0);
}

#[test]
fn malformed_trace_file_reports_line() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_file(&dir, "bad.csv", "x0,y0,x1,y1\n0,0,1,1\n0,0,1\n");
    let err = OutcropTraces::from_csv(&csv, 1e-6).unwrap_err();
    assert!(matches!(err, Error::Trace { line: 3, .. }), "{:?}", err);
}

#[test]
fn missing_trace_file_is_io_error() {
    let err = OutcropTraces::from_csv("no/such/traces.csv", 1e-6).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}
