use lbsolid::prelude::*;
use nalgebra::Vector3;
use std::fs;

fn coarse_case() -> case::Parameters {
    // lattice inlet speed of about 0.02 and thermal relaxation time of 1.8
    case::Parameters {
        resolution: 8,
        tau: 0.8,
        inlet_velocity: 1.6e-6,
        solid_conductivity: 1.0,
        liquid_conductivity: 1.0,
        max_physical_time: 3100.0,
        output_interval: 1500.0,
        surface_segments: 32,
        ..Default::default()
    }
}

fn simulation(case: &case::Parameters) -> Simulation {
    let converter = case.create_converter();
    let params = case.create_simulation_parameters(&converter, 4, 2);
    let surface = case.create_surface();
    let grid = case.prepare_geometry(&surface).unwrap();
    Simulation::new(converter, grid, Some(&surface as &dyn Indicator), &params).unwrap()
}

#[test]
fn test_nan_population_terminates_with_divergence() {
    let case = coarse_case();
    let mut simulation = simulation(&case);
    assert!(simulation.get_max_iterations() > 4);
    let center = simulation
        .get_grid()
        .get_nearest_index(&Vector3::new(0.5 * case.length, 0.0, 0.0))
        .unwrap();

    let outcome = simulation
        .run(
            |i_t, simulation| {
                if i_t == 2 {
                    assert!(simulation
                        .get_momentum_mut()
                        .set_populations(center, [Float::NAN; Q19]));
                }
            },
            &mut [],
        )
        .unwrap();

    assert_eq!(outcome.termination, Termination::Divergence);
    assert_eq!(outcome.iterations, 3);
    assert_eq!(outcome.exit_code(), 1);
    assert!(simulation.has_diverged());
    assert_eq!(simulation.get_state(), State::Terminated(Termination::Divergence));
}

#[test]
fn test_coarse_case_runs_to_the_end() {
    let case = coarse_case();
    let dir = std::env::temp_dir().join(format!("lbsolid_run_{}", std::process::id()));
    let config = Config {
        resolution: case.resolution,
        max_physical_time: Some(case.max_physical_time),
        output_dir: dir.clone(),
        ..Default::default()
    };

    let outcome = case::run(&config, &case).unwrap();
    assert_eq!(outcome.termination, Termination::Normal);
    assert_eq!(outcome.exit_code(), 0);

    assert!(dir.join("coordinates.csv").exists());
    let statistics = fs::read_to_string(dir.join("statistics.csv")).unwrap();
    let rows = statistics.lines().skip(1).collect::<Vec<&str>>();
    assert!(rows.len() >= 2);
    rows.iter().for_each(|row| {
        let values = row.split(',').collect::<Vec<&str>>();
        assert_eq!(values.len(), 6);
        let density = values[2].parse::<Float>().unwrap();
        assert!(density.is_finite() && density > 0.0);
    });
    let last_step = outcome.iterations - 1;
    assert!(dir.join(last_step.to_string()).join("temperature.csv").exists());
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_fields_are_physical() {
    let case = coarse_case();
    let mut simulation = simulation(&case);
    simulation.initialize();
    (0..3).for_each(|_| simulation.iterate());
    let fields = simulation.get_fields();
    let temperature = fields.get("temperature").unwrap();
    let grid = simulation.get_grid();
    let center = grid
        .get_nearest_index(&Vector3::new(0.5 * case.length, 0.0, 0.0))
        .unwrap();
    let value = temperature.get(grid.get_linear_index(center))[0];
    assert!(value > case.melting_temperature && value <= case.hot_temperature + 1e-6);
}
