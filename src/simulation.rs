use crate::coupling::{self, PhaseChangeCoupling};
use crate::decomposition::Decomposition;
use crate::error::SetupError;
use crate::geometry::indicator::Indicator;
use crate::geometry::{self, MaterialGrid};
use crate::post::{Field, FieldSet};
use crate::prelude_crate::*;
use crate::units::UnitConverter;
use crate::{momentum, thermal};

// -------------------------------------------------------------------- STRUCT: Parameters

#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub momentum: momentum::Parameters,
    pub thermal: thermal::Parameters,
    pub coupling: Option<coupling::Parameters>,
    pub number_of_blocks: usize,
    pub number_of_ranks: usize,
    pub max_physical_time: Float,
}

// ------------------------------------------------------------------------- ENUM: State

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Normal,
    Divergence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Uninitialized,
    Running,
    Terminated(Termination),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    pub termination: Termination,
    /// Number of completed iterations.
    pub iterations: usize,
}

impl RunOutcome {
    pub fn exit_code(&self) -> i32 {
        match self.termination {
            Termination::Normal => 0,
            Termination::Divergence => 1,
        }
    }
}

// ----------------------------------------------------------------------- TRAIT: Diagnostics

/// Observer called by [`Simulation::run`] after the iterations it asks for.
pub trait Diagnostics {
    fn is_due(&self, iteration: usize, last_iteration: usize) -> bool;

    fn report(&mut self, simulation: &Simulation) -> LbResult<()>;
}

// -------------------------------------------------------------------- STRUCT: Simulation

/// The two lattices, the coupling between them and the time loop.
#[derive(Debug)]
pub struct Simulation {
    converter: UnitConverter,
    grid: MaterialGrid,
    decomposition: Decomposition,
    momentum: momentum::Lattice,
    thermal: thermal::Lattice,
    coupling: Option<PhaseChangeCoupling>,
    max_iterations: usize,
    iteration: usize,
    state: State,
}

impl Simulation {
    pub fn new(
        converter: UnitConverter,
        grid: MaterialGrid,
        surface: Option<&dyn Indicator>,
        params: &Parameters,
    ) -> Result<Self, SetupError> {
        geometry::check_for_errors(&grid)?;
        let decomposition = Decomposition::new(&grid, params.number_of_blocks, params.number_of_ranks);
        let momentum = momentum::Lattice::new(&grid, &decomposition, &params.momentum, surface)?;
        let thermal = thermal::Lattice::new(&grid, &decomposition, &params.thermal)?;
        let coupling = params
            .coupling
            .as_ref()
            .map(|coupling_params| PhaseChangeCoupling::new(&grid, &momentum, &thermal, coupling_params))
            .transpose()?;
        let max_iterations = converter.physical_time_to_steps(params.max_physical_time);
        Ok(Simulation {
            converter,
            grid,
            decomposition,
            momentum,
            thermal,
            coupling,
            max_iterations,
            iteration: 0,
            state: State::Uninitialized,
        })
    }
}

impl Simulation {
    pub fn get_converter(&self) -> &UnitConverter {
        &self.converter
    }

    pub fn get_grid(&self) -> &MaterialGrid {
        &self.grid
    }

    pub fn get_decomposition(&self) -> &Decomposition {
        &self.decomposition
    }

    pub fn get_momentum(&self) -> &momentum::Lattice {
        &self.momentum
    }

    pub fn get_momentum_mut(&mut self) -> &mut momentum::Lattice {
        &mut self.momentum
    }

    pub fn get_thermal(&self) -> &thermal::Lattice {
        &self.thermal
    }

    pub fn get_thermal_mut(&mut self) -> &mut thermal::Lattice {
        &mut self.thermal
    }

    pub fn get_coupling(&self) -> Option<&PhaseChangeCoupling> {
        self.coupling.as_ref()
    }

    /// Index of the last iteration of a full run.
    pub fn get_max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Number of completed iterations.
    pub fn get_iteration(&self) -> usize {
        self.iteration
    }

    pub fn get_physical_time(&self) -> Float {
        self.converter.steps_to_physical_time(self.iteration)
    }

    pub fn get_state(&self) -> State {
        self.state
    }

    pub fn has_diverged(&self) -> bool {
        self.momentum.get_statistics().has_diverged() || self.thermal.get_statistics().has_diverged()
    }
}

impl Simulation {
    /// Equilibrium populations on both lattices.
    pub fn initialize(&mut self) {
        self.momentum.initialize();
        self.thermal.initialize();
        self.iteration = 0;
        self.state = State::Running;
    }

    /// Coupling, then the hydrodynamic step, then the thermal step. The
    /// thermal lattice is advected by the velocity of the previous step.
    pub fn iterate(&mut self) {
        if let Some(coupling) = &self.coupling {
            coupling.execute(&mut self.momentum, &mut self.thermal);
        }
        self.momentum.step();
        self.thermal.step();
        self.iteration += 1;
    }

    /// Runs iterations `0..=N` with `N` from the maximum physical time, or
    /// stops after the first iteration that leaves a non-finite average on
    /// either lattice. `set_boundary_values` runs before each iteration.
    pub fn run<B>(&mut self, mut set_boundary_values: B, diagnostics: &mut [Box<dyn Diagnostics>]) -> LbResult<RunOutcome>
    where
        B: FnMut(usize, &mut Simulation),
    {
        if self.state != State::Running {
            self.initialize();
        }
        let last_iteration = self.max_iterations;
        for i_t in self.iteration..=last_iteration {
            set_boundary_values(i_t, self);
            self.iterate();
            let diverged = self.has_diverged();
            for diagnostic in diagnostics.iter_mut() {
                if diverged || diagnostic.is_due(i_t, last_iteration) {
                    diagnostic.report(self)?;
                }
            }
            if diverged {
                self.state = State::Terminated(Termination::Divergence);
                return Ok(RunOutcome {
                    termination: Termination::Divergence,
                    iterations: self.iteration,
                });
            }
        }
        self.state = State::Terminated(Termination::Normal);
        Ok(RunOutcome {
            termination: Termination::Normal,
            iterations: self.iteration,
        })
    }
}

impl Simulation {
    /// Per-cell fields in the linear order of the material grid. Pressure,
    /// velocities, temperature and force are in physical units.
    pub fn get_fields(&self) -> FieldSet {
        let converter = &self.converter;
        let velocity = |u: &[Float; 3]| u.map(|u_x| converter.get_physical_velocity(u_x));
        let fields = vec![
            Field::scalar(
                "material",
                self.momentum.collect(|node| node.get_material().id() as Float),
            ),
            Field::scalar("density", self.momentum.collect(|node| node.get_density())),
            Field::scalar(
                "pressure",
                self.momentum
                    .collect(|node| converter.get_physical_pressure(node.get_density())),
            ),
            Field::vector(
                "velocity",
                self.momentum.collect(|node| velocity(node.get_velocity())),
            ),
            Field::vector(
                "velocity_coupled",
                self.thermal.collect(|node| velocity(node.get_velocity())),
            ),
            Field::scalar(
                "solid_fraction",
                self.momentum.collect(|node| node.get_solid_fraction()),
            ),
            Field::scalar("enthalpy", self.thermal.collect(|node| node.get_enthalpy())),
            Field::scalar(
                "liquid_fraction",
                self.thermal.collect(|node| node.get_liquid_fraction()),
            ),
            Field::scalar(
                "temperature",
                self.thermal
                    .collect(|node| converter.get_physical_temperature(node.get_temperature())),
            ),
            Field::vector(
                "force",
                self.momentum.collect(|node| {
                    node.get_total_force()
                        .map(|f_x| converter.get_physical_force(f_x))
                }),
            ),
        ];
        FieldSet {
            n: self.grid.get_n(),
            fields,
        }
    }
}
