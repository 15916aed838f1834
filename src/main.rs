use lbsolid::prelude::*;

fn main() {
    let config = cli::get_args()
        .and_then(|matches| cli::parse_matches(&matches))
        .unwrap_or_else(|e| {
            eprintln!("{e}");
            std::process::exit(1);
        });

    cli::init_global_pool(config.get_number_of_threads(), config.core_affinity).unwrap_or_else(|e| {
        eprintln!("Error while building the thread pool: {e}");
        std::process::exit(1);
    });

    let case = case::Parameters::from_config(&config);
    let outcome = case::run(&config, &case).unwrap_or_else(|e| {
        eprintln!("{e}");
        std::process::exit(1);
    });

    if outcome.termination == Termination::Divergence {
        eprintln!(
            "simulation diverged after {} iterations! stopping now.",
            outcome.iterations
        );
    }
    std::process::exit(outcome.exit_code());
}
