use std::fs;
use std::path::PathBuf;

use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rs_namegen_core::{Corpus, SynthesisConfig, Synthesizer};

/// Invents names resembling a weighted word list.
///
/// The corpus file holds one `word frequency` pair per line. Names are
/// printed uppercased, one per line, on stdout.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Corpus file (`word frequency` per line)
    corpus: PathBuf,

    /// JSON file with synthesis parameters; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Unique names drawn from the left-to-right model
    #[arg(long)]
    forward_pool: Option<usize>,

    /// Unique names drawn from the right-to-left model
    #[arg(long)]
    backward_pool: Option<usize>,

    /// Number of names wanted (fewer may be printed)
    #[arg(long)]
    output: Option<usize>,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Print names as generated instead of uppercased
    #[arg(long)]
    lowercase: bool,
}

impl Args {
    /// Loads the config file, if any, then applies flag overrides.
    fn synthesis_config(&self) -> Result<SynthesisConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
            None => SynthesisConfig::default(),
        };
        if let Some(n) = self.forward_pool {
            config.forward_pool_size = n;
        }
        if let Some(n) = self.backward_pool {
            config.backward_pool_size = n;
        }
        if let Some(n) = self.output {
            config.output_size = n;
        }
        Ok(config)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so stdout stays a clean name list
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    let config = args.synthesis_config()?;

    let corpus = Corpus::load(&args.corpus)?;
    info!(words = corpus.len(), path = %args.corpus.display(), "corpus loaded");

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let synthesizer = Synthesizer::new(&corpus)?;
    let names = synthesizer.synthesize(&config, &mut rng)?;
    info!(requested = config.output_size, generated = names.len(), "synthesis finished");

    for name in names {
        if args.lowercase {
            println!("{name}");
        } else {
            println!("{}", name.to_uppercase());
        }
    }

    Ok(())
}
