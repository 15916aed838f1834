use lbsolid::prelude::*;
use nalgebra::Vector3;

const MELTING_TEMPERATURE: Float = 1.0;
const WALL_TEMPERATURE: Float = 0.5;
const LATENT_HEAT: Float = 1.0;
const DIFFUSIVITY: Float = 0.1;

fn phase_change() -> PhaseChange {
    PhaseChange {
        solidus_temperature: MELTING_TEMPERATURE,
        liquidus_temperature: MELTING_TEMPERATURE,
        solid_specific_heat: 1.0,
        liquid_specific_heat: 1.0,
        latent_heat: LATENT_HEAT,
        solid_conductivity: DIFFUSIVITY,
        liquid_conductivity: DIFFUSIVITY,
    }
}

/// Long box with adiabatic sides, cooled at x = 0.
fn column(n: [usize; 3]) -> MaterialGrid {
    let mut grid = MaterialGrid::new(Vector3::zeros(), 1.0, n);
    (0..grid.get_number_of_voxels()).for_each(|i| {
        let [x, y, z] = grid.get_index(i);
        let side = y == 0 || z == 0 || y == n[1] - 1 || z == n[2] - 1 || x == n[0] - 1;
        let material = match (side, x) {
            (true, _) => Material::Wall,
            (false, 0) => Material::CooledWall,
            _ => Material::Fluid,
        };
        grid.set_material([x, y, z], material.id());
    });
    grid
}

/// Abramowitz and Stegun 7.1.26, absolute error below 1.5e-7.
fn erf(x: Float) -> Float {
    let t = 1.0 / (1.0 + 0.3275911 * x);
    let poly = t * (0.254829592 + t * (-0.284496736 + t * (1.421413741 + t * (-1.453152027 + t * 1.061405429))));
    1.0 - poly * (-x * x).exp()
}

/// Root of `lambda exp(lambda^2) erf(lambda) = Ste / sqrt(pi)`.
fn stefan_lambda(stefan: Float) -> Float {
    let target = stefan / std::f64::consts::PI.sqrt();
    let f = |l: Float| l * (l * l).exp() * erf(l) - target;
    let (mut low, mut high) = (1e-6, 2.0);
    (0..100).for_each(|_| {
        let mid = 0.5 * (low + high);
        if f(mid) > 0.0 {
            high = mid;
        } else {
            low = mid;
        }
    });
    0.5 * (low + high)
}

/// Solidified length measured from the cooled wall along the center line.
fn front_position(lattice: &thermal::Lattice, n: [usize; 3]) -> Float {
    let solid = (1..n[0] - 1)
        .filter_map(|x| lattice.get_node([x, n[1] / 2, n[2] / 2]))
        .map(|node| 1.0 - node.get_liquid_fraction())
        .sum::<Float>();
    0.5 + solid
}

fn lattice(n: [usize; 3]) -> thermal::Lattice {
    let grid = column(n);
    let phase_change = phase_change();
    let liquid = InitialCondition {
        enthalpy: phase_change.get_liquidus_enthalpy(),
        velocity: [0.0; 3],
    };
    let mut initial_conditions = [liquid; NUMBER_OF_MATERIALS];
    let cold_enthalpy = phase_change.compute_enthalpy(WALL_TEMPERATURE);
    initial_conditions[Material::CooledWall.id() as usize].enthalpy = cold_enthalpy;
    let params = thermal::Parameters {
        phase_change,
        dynamics: DynamicsAssignment::default(),
        inlet_enthalpy: liquid.enthalpy,
        inlet_velocity: [0.0; 3],
        cooled_wall_enthalpy: cold_enthalpy,
        initial_conditions,
    };
    let decomposition = Decomposition::new(&grid, 4, 2);
    let mut lattice = thermal::Lattice::new(&grid, &decomposition, &params).unwrap();
    lattice.initialize();
    lattice
}

#[test]
fn test_front_follows_square_root_of_time() {
    let n = [64, 5, 5];
    let mut lattice = lattice(n);
    let stefan = (MELTING_TEMPERATURE - WALL_TEMPERATURE) / LATENT_HEAT;
    let lambda = stefan_lambda(stefan);

    let mut previous = front_position(&lattice, n);
    let mut fronts = Vec::new();
    for t in 1..=4000 {
        lattice.step();
        if t % 250 == 0 {
            let front = front_position(&lattice, n);
            assert!(front >= previous - 1e-9, "front moved back at t = {t}");
            previous = front;
        }
        if t == 1000 || t == 4000 {
            fronts.push(front_position(&lattice, n));
        }
    }

    [1000.0, 4000.0].iter().zip(fronts.iter()).for_each(|(t, front)| {
        let expected = 2.0 * lambda * (DIFFUSIVITY * t).sqrt();
        let error = (front - expected).abs() / expected;
        assert!(error < 0.15, "t = {t}: front at {front:.3}, expected {expected:.3}");
    });
    let growth = fronts[1] / fronts[0];
    assert!((growth - 2.0).abs() < 0.2, "front grew by {growth:.3} over 4x the time");
}

#[test]
fn test_solid_temperature_stays_between_wall_and_melting() {
    let n = [32, 5, 5];
    let mut lattice = lattice(n);
    (0..1500).for_each(|_| lattice.step());
    (1..n[0] - 1)
        .filter_map(|x| lattice.get_node([x, 2, 2]))
        .for_each(|node| {
            let temperature = node.get_temperature();
            assert!(temperature > WALL_TEMPERATURE - 1e-3, "T = {temperature}");
            assert!(temperature < MELTING_TEMPERATURE + 1e-3, "T = {temperature}");
        });
    let near = lattice.get_node([1, 2, 2]).unwrap();
    assert_eq!(near.get_liquid_fraction(), 0.0);
    let far = lattice.get_node([n[0] - 2, 2, 2]).unwrap();
    assert!(far.get_liquid_fraction() > 0.999);
}
