#[macro_use]
extern crate log;

mod options;
mod report;
mod weights;

use clap::Parser;
use options::Options;
use piecewise::rng::RNG;
use report::*;
use weights::*;

fn main() {
    // Initialize `env_logger`.
    env_logger::init();

    let options = Options::parse();

    // Process weight tables.
    for path in options.paths.iter() {
        // In case of error report it and continue.
        if let Err(e) = run(path, &options) {
            error!("{e}");
        }
    }
}

fn run(path: &str, options: &Options) -> Result<(), String> {
    let rows = read_weights(path)?;
    let mut rng = RNG::new(options.seed);

    let report = if rows.len() == 1 {
        sample_1d(&rows[0], options.n_samples, &mut rng)?
    } else {
        sample_2d(&rows, options.n_samples, options.threads(), &mut rng)?
    };
    info!("{path}: max deviation = {}", report.max_deviation());

    if !options.quiet {
        println!("{path}: {report}");
    }
    Ok(())
}
