use crate::geometry::MaterialGrid;
use crate::post::{Field, FieldSet};
use crate::prelude_crate::*;
use crate::simulation::{Diagnostics, Simulation};
use colored::*;
use rayon::prelude::*;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const COORDINATES_FILE: &str = "coordinates.csv";
pub const STATISTICS_FILE: &str = "statistics.csv";

/// Output iterations are the multiples of `interval` and the last one.
pub fn is_output_iteration(iteration: usize, last_iteration: usize, interval: usize) -> bool {
    iteration == last_iteration || (interval > 0 && iteration % interval == 0)
}

/// Index of the iteration that was completed last.
fn get_time_step(simulation: &Simulation) -> usize {
    simulation.get_iteration().saturating_sub(1)
}

// --------------------------------------------------------------------- STRUCT: CsvWriter

/// Writes every field to `output_dir/<time step>/<field>.csv` and appends the
/// lattice statistics to `output_dir/statistics.csv`.
#[derive(Debug)]
pub struct CsvWriter {
    output_dir: PathBuf,
    interval: usize,
    coordinates_written: bool,
}

impl CsvWriter {
    pub fn new<P: AsRef<Path>>(output_dir: P, interval: usize) -> LbResult<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        if !output_dir.exists() {
            println!(
                "Creating the {} path.\n",
                output_dir.display().to_string().yellow().bold()
            );
        }
        fs::create_dir_all(&output_dir)?;
        Ok(CsvWriter {
            output_dir,
            interval,
            coordinates_written: false,
        })
    }

    pub fn get_output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn write_coordinates(&self, grid: &MaterialGrid) -> LbResult<()> {
        let path = self.output_dir.join(COORDINATES_FILE);
        let mut file = BufWriter::new(File::create(path)?);
        writeln!(file, "i,j,k,x,y,z,material")?;
        for (i, material) in grid.get_materials().iter().enumerate() {
            let index = grid.get_index(i);
            let x = grid.get_position(index);
            writeln!(
                file,
                "{},{},{},{:.8e},{:.8e},{:.8e},{material}",
                index[0], index[1], index[2], x[0], x[1], x[2]
            )?;
        }
        file.flush()?;
        Ok(())
    }

    fn write_fields(&self, time_step: usize, fields: &FieldSet) -> LbResult<()> {
        let step_path = self.output_dir.join(time_step.to_string());
        fs::create_dir_all(&step_path)?;
        fields
            .fields
            .par_iter()
            .map(|field| write_field(&step_path, field))
            .collect::<io::Result<()>>()?;
        Ok(())
    }

    fn write_statistics(&self, simulation: &Simulation) -> LbResult<()> {
        let path = self.output_dir.join(STATISTICS_FILE);
        let new_file = !path.exists();
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        if new_file {
            writeln!(
                file,
                "time_step,time,average_density,maximum_velocity,average_enthalpy,solid_fraction"
            )?;
        }
        let momentum = simulation.get_momentum().get_statistics();
        let thermal = simulation.get_thermal().get_statistics();
        writeln!(
            file,
            "{},{:.8e},{:.8e},{:.8e},{:.8e},{:.8e}",
            get_time_step(simulation),
            simulation.get_physical_time(),
            momentum.average_density,
            momentum.maximum_velocity,
            thermal.average_density,
            thermal.average_solid_fraction
        )?;
        Ok(())
    }
}

fn write_field(step_path: &Path, field: &Field) -> io::Result<()> {
    let path = step_path.join(format!("{}.csv", field.name));
    let mut file = BufWriter::new(File::create(path)?);
    let header = match field.components {
        1 => field.name.to_string(),
        _ => ["x", "y", "z"]
            .iter()
            .take(field.components)
            .map(|x| format!("{}_{x}", field.name))
            .collect::<Vec<String>>()
            .join(","),
    };
    writeln!(file, "{header}")?;
    for values in field.values.chunks(field.components) {
        let line = values
            .iter()
            .map(|value| format!("{value:.8e}"))
            .collect::<Vec<String>>()
            .join(",");
        writeln!(file, "{line}")?;
    }
    file.flush()
}

impl Diagnostics for CsvWriter {
    fn is_due(&self, iteration: usize, last_iteration: usize) -> bool {
        is_output_iteration(iteration, last_iteration, self.interval)
    }

    fn report(&mut self, simulation: &Simulation) -> LbResult<()> {
        if !self.coordinates_written {
            self.write_coordinates(simulation.get_grid())?;
            self.coordinates_written = true;
        }
        self.write_fields(get_time_step(simulation), &simulation.get_fields())?;
        self.write_statistics(simulation)
    }
}

// --------------------------------------------------------------- STRUCT: ConsoleReporter

/// Statistics table on the console at every output iteration, with an
/// optional progress bar in between.
#[derive(Debug)]
pub struct ConsoleReporter {
    interval: usize,
    progress: bool,
    header_printed: bool,
}

impl ConsoleReporter {
    pub fn new(interval: usize, progress: bool) -> Self {
        ConsoleReporter {
            interval,
            progress,
            header_printed: false,
        }
    }

    fn print_header(&self) {
        println!(
            "{:>10} {:>16} {:>16} {:>16} {:>16} {:>16}",
            "time_step".cyan().bold(),
            "time".cyan().bold(),
            "density".cyan().bold(),
            "max_velocity".cyan().bold(),
            "enthalpy".cyan().bold(),
            "solid_fraction".cyan().bold()
        );
    }

    fn print_line(&self, simulation: &Simulation) {
        let converter = simulation.get_converter();
        let momentum = simulation.get_momentum().get_statistics();
        let thermal = simulation.get_thermal().get_statistics();
        println!(
            "{:>10} {:>16.8e} {:>16.8e} {:>16.8e} {:>16.8e} {:>16.8e}",
            get_time_step(simulation),
            simulation.get_physical_time(),
            momentum.average_density,
            converter.get_physical_velocity(momentum.maximum_velocity),
            thermal.average_density,
            thermal.average_solid_fraction
        );
    }
}

impl Diagnostics for ConsoleReporter {
    fn is_due(&self, iteration: usize, last_iteration: usize) -> bool {
        self.progress || is_output_iteration(iteration, last_iteration, self.interval)
    }

    fn report(&mut self, simulation: &Simulation) -> LbResult<()> {
        let time_step = get_time_step(simulation);
        let last_iteration = simulation.get_max_iterations();
        if self.progress {
            progress_bar(time_step, last_iteration + 1);
        }
        if is_output_iteration(time_step, last_iteration, self.interval) || simulation.has_diverged() {
            if self.progress && time_step != last_iteration {
                println!();
            }
            if !self.header_printed {
                self.print_header();
                self.header_printed = true;
            }
            self.print_line(simulation);
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------- FUNCTIONS

pub fn progress_bar(current: usize, total: usize) {
    let current = current + 1;
    let percentage = current as f64 / total as f64;
    let bar_length = 50;
    let filled_length = ((bar_length as f64 * percentage) as usize).min(bar_length);
    let completed = "█".repeat(filled_length);
    let remaining = "░".repeat(bar_length - filled_length);
    let bar = completed + &remaining;
    let percentage = percentage * 100.0;
    print!("\r{}", format!("{bar} {percentage:.2}%").green().bold());
    io::stdout().flush().ok();
    if current == total {
        println!();
        println!();
    }
}

pub fn print_stage(stage: &str) {
    print!("{} ... ", stage.yellow().bold());
    io::stdout().flush().ok();
}

pub fn print_ok() {
    println!("{}", "OK".green().bold());
}
