use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use fracflow::logging::scoped_logger;
use fracflow::network::DomainSide;
use fracflow::units::{m2_to_millidarcy, pa_to_mpa};
use fracflow::{assign_parameters, FractureNetwork, OutcropTraces, SimulationConfig, SubdomainKind, TimeSchedule};

#[derive(Parser)]
#[command(name = "fracture_network_setup")]
#[command(about = "Build a 3D fracture network from outcrop traces and assign sub-domain parameters")]
struct Args {
    /// TOML configuration; defaults are used when omitted
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long)]
    verbose: bool,
}

/// Trace paths in a config file are relative to that file
fn resolve_trace_file(config_path: Option<&Path>, trace_file: &Path) -> PathBuf {
    match config_path.and_then(Path::parent) {
        Some(dir) if trace_file.is_relative() => dir.join(trace_file),
        _ => trace_file.to_path_buf(),
    }
}

fn run(args: &Args) -> fracflow::Result<()> {
    let config = match &args.config {
        Some(path) => {
            info!(path = %path.display(), "loading configuration");
            SimulationConfig::from_file(path)?
        }
        None => {
            info!("no configuration given, using defaults");
            SimulationConfig::default()
        }
    };
    config.log_summary();

    let trace_file = resolve_trace_file(args.config.as_deref(), &config.network.trace_file);
    let traces = OutcropTraces::from_csv(&trace_file, config.network.snap_tolerance)?;
    info!(traces = traces.num_traces(), points = traces.points().len(), "outcrop traces loaded");

    let network = FractureNetwork::extrude(&traces, &config.network)?;
    let extent = network.domain.extent();
    info!(
        x = extent.x,
        y = extent.y,
        z = extent.z,
        fracture_area = network.fracture_area(),
        "domain"
    );

    let params = assign_parameters(&network, &config.parameters);
    for kind in [SubdomainKind::Matrix, SubdomainKind::Fracture, SubdomainKind::Intersection] {
        let Some(p) = params.iter().find(|p| p.kind() == kind) else {
            continue;
        };
        let count = params.iter().filter(|q| q.kind() == kind).count();
        let west = p.flow_boundary.at(DomainSide::West);
        info!(
            %kind,
            count,
            permeability_md = m2_to_millidarcy(p.permeability),
            porosity = p.porosity,
            specific_volume = p.specific_volume(),
            diffusivity = p.diffusivity,
            heat_capacity = p.effective_heat_capacity(),
            west_pressure_mpa = pa_to_mpa(west.value),
            west_bc = ?west.kind,
            "parameters"
        );
    }

    let schedule = TimeSchedule::from_config(&config.time_stepping)?;
    info!(
        steps = schedule.num_steps(),
        dt_years = schedule.end_time_years() / schedule.num_steps() as f64,
        "transport schedule"
    );
    info!(
        subdomains = network.num_subdomains(),
        "setup complete; systems with fewer than {} unknowns will be solved directly",
        config.solver.direct_threshold
    );
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    let _guard = scoped_logger(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
