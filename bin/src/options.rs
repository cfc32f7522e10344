//! Command line options

use clap::Parser;

/// Draws samples from piecewise-constant distributions built from weight
/// tables and compares the empirical frequencies with the expected PDFs.
#[derive(Parser, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Options {
    /// Number of samples to draw per distribution.
    #[arg(
        long = "samples",
        short = 'n',
        value_name = "NUM",
        default_value_t = 100_000,
        help = "Number of samples to draw per distribution."
    )]
    pub n_samples: usize,

    /// Random number generator sequence index.
    #[arg(
        long = "seed",
        short = 's',
        value_name = "NUM",
        default_value_t = 0,
        help = "Sequence index for the random number generator."
    )]
    pub seed: u64,

    /// Number of threads to use for building 2D distributions.
    #[arg(
        long = "nthreads",
        short = 't',
        value_name = "NUM",
        default_value_t = 1,
        help = "Use specified number of threads for building 2D distributions."
    )]
    n_threads: usize,

    /// Suppress all text output other than error messages.
    #[arg(long, help = "Suppress all text output other than error messages.")]
    pub quiet: bool,

    /// Input file paths.
    #[arg(required = true, help = "Weight table files")]
    pub paths: Vec<String>,
}

impl Options {
    /// Returns the number of threads to use.
    pub fn threads(&self) -> usize {
        let max_threads = std::thread::available_parallelism().map_or(1, |n| n.get());
        match self.n_threads {
            0 => {
                warn!("Invalid nthreads");
                1
            }
            n if n > max_threads => {
                warn!("Num threads > max logical CPUs {}", max_threads);
                max_threads
            }
            n => n,
        }
    }
}
