use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use corpus_rank::pagerank::{IterativeSolver, SamplingEstimator};
use corpus_rank::report::{self, IterationSection, RankReport, SamplingSection};
use corpus_rank::{corpus, DanglingPolicy, RankConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// Rank the pages of an HTML corpus by sampling and by iteration.
#[derive(Debug, Parser)]
#[command(name = "pagerank", version, about)]
struct Cli {
    /// Directory containing the corpus's .html pages
    corpus: PathBuf,

    /// JSON config file; flags given on the command line override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Probability of following a link instead of jumping anywhere
    #[arg(long)]
    damping: Option<f64>,

    /// Visits recorded per sampled chain
    #[arg(long)]
    samples: Option<usize>,

    /// Largest per-page change still counted as converged
    #[arg(long)]
    tolerance: Option<f64>,

    /// Sweep cap for the iterative solver
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Seed for reproducible sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Independent sampling chains to pool
    #[arg(long)]
    chains: Option<usize>,

    /// Spread rank held by pages without links over the whole corpus
    #[arg(long)]
    redistribute_dangling: bool,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn rank_config(&self) -> Result<RankConfig> {
        let mut config = match &self.config {
            Some(path) => RankConfig::from_path(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => RankConfig::default(),
        };

        if let Some(damping) = self.damping {
            config.damping = damping;
        }
        if let Some(samples) = self.samples {
            config.samples = samples;
        }
        if let Some(tolerance) = self.tolerance {
            config.tolerance = tolerance;
        }
        if let Some(max_iterations) = self.max_iterations {
            config.max_iterations = max_iterations;
        }
        if let Some(chains) = self.chains {
            config.chains = chains;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.redistribute_dangling {
            config.dangling = DanglingPolicy::Redistribute;
        }

        config.validate()?;
        Ok(config)
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.rank_config()?;
    let graph = corpus::crawl(&cli.corpus)
        .with_context(|| format!("crawling {}", cli.corpus.display()))?;

    let sampled = SamplingEstimator::with_config(&config).run(&graph)?;
    let solved = IterativeSolver::with_config(&config).run(&graph)?;

    match cli.format {
        Format::Text => {
            let title = format!("PageRank Results from Sampling (n = {})", config.samples);
            print!("{}", report::render_text(&title, &sampled));
            print!(
                "{}",
                report::render_text("PageRank Results from Iteration", &solved.ranks)
            );
        }
        Format::Json => {
            let report = RankReport {
                damping: config.damping,
                sampling: SamplingSection {
                    samples: config.samples,
                    chains: config.chains,
                    ranks: &sampled,
                },
                iteration: IterationSection {
                    iterations: solved.iterations,
                    delta: solved.delta,
                    ranks: &solved.ranks,
                },
            };
            println!("{}", report.to_json_pretty()?);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
