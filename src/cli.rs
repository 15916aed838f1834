use crate::prelude_crate::*;
use clap::Arg;
use core_affinity::{get_core_ids, set_for_current, CoreId};
use std::num::NonZeroUsize;
use std::path::PathBuf;

pub type LbResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub number_of_threads: NonZeroUsize,
    pub core_affinity: bool,
    pub resolution: usize,
    pub blocks_per_thread: NonZeroUsize,
    pub tau: Option<Float>,
    pub inlet_velocity: Option<Float>,
    pub max_physical_time: Option<Float>,
    pub output_interval: Option<Float>,
    pub output_dir: PathBuf,
    pub write_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            number_of_threads: NonZeroUsize::MIN,
            core_affinity: false,
            resolution: 100,
            blocks_per_thread: NonZeroUsize::new(2).unwrap_or(NonZeroUsize::MIN),
            tau: None,
            inlet_velocity: None,
            max_physical_time: None,
            output_interval: None,
            output_dir: PathBuf::from("./data"),
            write_output: true,
        }
    }
}

impl Config {
    pub fn get_number_of_threads(&self) -> usize {
        usize::from(self.number_of_threads)
    }

    pub fn get_number_of_blocks(&self) -> usize {
        self.get_number_of_threads() * usize::from(self.blocks_per_thread)
    }
}

pub fn get_command() -> clap::Command {
    clap::command!()
        .arg(
            Arg::new("number_of_threads")
                .short('n')
                .long("num-threads")
                .value_name("NTHREADS")
                .help("The number of threads used (min = 1)")
                .value_parser(clap::value_parser!(NonZeroUsize))
                .default_value("1"),
        )
        .arg(
            Arg::new("core_affinity")
                .long("affinity")
                .help("Pin the worker threads to the cores")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("resolution")
                .short('r')
                .long("resolution")
                .value_name("N")
                .help("Number of voxels across the pipe diameter")
                .value_parser(clap::value_parser!(usize))
                .default_value("100"),
        )
        .arg(
            Arg::new("blocks_per_thread")
                .long("blocks-per-thread")
                .value_name("BLOCKS")
                .help("Number of sub-blocks assigned to each thread")
                .value_parser(clap::value_parser!(NonZeroUsize))
                .default_value("2"),
        )
        .arg(
            Arg::new("tau")
                .long("tau")
                .value_name("TAU")
                .help("Relaxation time of the flow lattice (> 0.5)")
                .value_parser(clap::value_parser!(Float)),
        )
        .arg(
            Arg::new("inlet_velocity")
                .long("inlet-velocity")
                .value_name("M/S")
                .help("Inflow velocity in physical units")
                .value_parser(clap::value_parser!(Float)),
        )
        .arg(
            Arg::new("max_time")
                .long("max-time")
                .value_name("SECONDS")
                .help("Simulated physical time")
                .value_parser(clap::value_parser!(Float)),
        )
        .arg(
            Arg::new("output_interval")
                .long("output-interval")
                .value_name("SECONDS")
                .help("Physical time between two outputs")
                .value_parser(clap::value_parser!(Float)),
        )
        .arg(
            Arg::new("output_dir")
                .short('o')
                .long("output-dir")
                .value_name("DIR")
                .help("Directory of the output files")
                .value_parser(clap::value_parser!(PathBuf))
                .default_value("./data"),
        )
        .arg(
            Arg::new("no_output")
                .long("no-output")
                .help("Do not write output files")
                .action(clap::ArgAction::SetTrue),
        )
}

pub fn get_args() -> LbResult<clap::ArgMatches> {
    Ok(get_command().get_matches())
}

pub fn parse_matches(matches: &clap::ArgMatches) -> LbResult<Config> {
    let default = Config::default();
    let positive = |name: &str| -> LbResult<Option<Float>> {
        match matches.get_one::<Float>(name).copied() {
            Some(value) if !(value > 0.0) => Err(format!("`{name}` must be positive").into()),
            value => Ok(value),
        }
    };
    let resolution = matches
        .get_one::<usize>("resolution")
        .copied()
        .unwrap_or(default.resolution);
    if resolution < 4 {
        return Err("`resolution` must be at least 4".into());
    }
    let tau = matches.get_one::<Float>("tau").copied();
    if tau.is_some_and(|tau| !(tau > 0.5)) {
        return Err("`tau` must be larger than 0.5".into());
    }
    Ok(Config {
        number_of_threads: matches
            .get_one::<NonZeroUsize>("number_of_threads")
            .copied()
            .unwrap_or(default.number_of_threads),
        core_affinity: matches.get_flag("core_affinity"),
        resolution,
        blocks_per_thread: matches
            .get_one::<NonZeroUsize>("blocks_per_thread")
            .copied()
            .unwrap_or(default.blocks_per_thread),
        tau,
        inlet_velocity: positive("inlet_velocity")?,
        max_physical_time: positive("max_time")?,
        output_interval: positive("output_interval")?,
        output_dir: matches
            .get_one::<PathBuf>("output_dir")
            .cloned()
            .unwrap_or(default.output_dir),
        write_output: !matches.get_flag("no_output"),
    })
}

/// Core of the worker thread `idx`, cycling through `cores`.
fn select_core(cores: &[CoreId], idx: usize) -> Option<CoreId> {
    cores.get(idx.checked_rem(cores.len())?).copied()
}

/// Builds the global rayon pool. Without a list of cores the workers are not
/// pinned, even if asked to.
pub fn init_global_pool(num_threads: usize, pin_all_cores: bool) -> LbResult<()> {
    let builder = rayon::ThreadPoolBuilder::new().num_threads(num_threads);
    let cores = if pin_all_cores {
        get_core_ids().unwrap_or_default()
    } else {
        Vec::new()
    };
    if cores.is_empty() {
        builder.build_global()?;
    } else {
        builder
            .start_handler(move |idx| {
                if let Some(core) = select_core(&cores, idx) {
                    let _ = set_for_current(core);
                }
            })
            .build_global()?;
    }
    Ok(())
}
