use std::{fs::File, io, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use plstat::{
    labelled_batch, par_permutation_test, permutation_test, Discretization, Landscape,
    LabelSequence, PermutationConfig,
};
use plstat_cli::{build_landscapes, read_diagrams, read_labels};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Permutation test for a difference between two labelled groups of landscapes
    PermTest {
        #[command(flatten)]
        series: SeriesArgs,

        /// The two labels to contrast
        #[arg(long, num_args = 2, value_names = ["A", "B"])]
        contrast: Vec<String>,

        /// Number of random relabellings
        #[arg(long, default_value_t = 1500)]
        num_perms: usize,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Spread the permutations over all cores
        #[arg(long)]
        parallel: bool,
    },
    /// Write flattened, equal-length landscape vectors with their labels as CSV on stdout
    Flatten {
        #[command(flatten)]
        series: SeriesArgs,

        /// Labels to keep, in output order
        #[arg(long, num_args = 1.., required = true)]
        targets: Vec<String>,
    },
}

#[derive(Args, Debug)]
struct SeriesArgs {
    /// CSV of `time,birth,death` rows
    #[arg(long)]
    diagrams: PathBuf,

    /// Ground-truth labels, one per line and time index
    #[arg(long)]
    labels: PathBuf,

    /// Homological degree of the diagrams
    #[arg(long, default_value_t = 0)]
    hom_deg: usize,

    #[arg(long, default_value_t = 0.0)]
    start: f64,

    /// End of the landscape domain, inferred from the diagrams when omitted
    #[arg(long)]
    stop: Option<f64>,

    #[arg(long, default_value_t = 1800)]
    num_steps: usize,
}

impl SeriesArgs {
    fn load(&self) -> Result<(Vec<Landscape>, LabelSequence)> {
        let diagrams_file = File::open(&self.diagrams)
            .with_context(|| format!("Could not open {}", self.diagrams.display()))?;
        let mut diagrams = read_diagrams(diagrams_file)?;
        let labels_file = File::open(&self.labels)
            .with_context(|| format!("Could not open {}", self.labels.display()))?;
        let truth = read_labels(labels_file)?;

        // Trailing time indices may have empty diagrams
        if diagrams.len() < truth.len() {
            diagrams.resize_with(truth.len(), Default::default);
        }

        let discretization = Discretization {
            start: Some(self.start),
            stop: self.stop,
            num_steps: self.num_steps,
        };
        let landscapes = build_landscapes(&diagrams, self.hom_deg, &discretization)?;
        Ok((landscapes, truth))
    }
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for results
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::PermTest {
            series,
            contrast,
            num_perms,
            seed,
            parallel,
        } => {
            let (landscapes, truth) = series.load()?;
            let config = PermutationConfig { num_perms, seed };
            let contrast = (&contrast[0], &contrast[1]);
            let outcome = if parallel {
                par_permutation_test(&landscapes, &truth, contrast, &config)?
            } else {
                permutation_test(&landscapes, &truth, contrast, &config)?
            };
            println!("p_value={}", outcome.p_value);
            println!("significance={}", outcome.significance);
            println!("exceed_count={}/{}", outcome.exceed_count, outcome.num_perms);
        }
        Commands::Flatten { series, targets } => {
            let (landscapes, truth) = series.load()?;
            let batch = labelled_batch(&landscapes, &truth, &targets)?;
            let mut wtr = csv::Writer::from_writer(io::stdout());
            for (label, vector) in batch.labels.iter().zip(&batch.vectors) {
                wtr.write_record(
                    std::iter::once(label.clone()).chain(vector.iter().map(f64::to_string)),
                )?;
            }
            wtr.flush()?;
        }
    }
    Ok(())
}
