//! SOFNN - CLI entry point
//!
//! Trains a self-organizing fuzzy neural network on CSV data.

use clap::{Parser, Subcommand};
use sofnn::network::ModelCheckpoint;
use sofnn::{Config, Dataset, FuzzyNetwork, SelfOrganizer, Termination};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "sofnn")]
#[command(version)]
#[command(about = "Self-organizing fuzzy neural network trainer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a model with self-organization
    Run {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// CSV data file (last column is the target)
        #[arg(short, long)]
        data: PathBuf,

        /// Fraction of samples held out for testing
        #[arg(short, long, default_value = "0.25")]
        test_fraction: f64,

        /// Output directory for the trained model and report
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Random seed for reproducibility
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Quiet mode (minimal output)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },

    /// Inspect a saved model checkpoint
    Analyze {
        /// Checkpoint file
        checkpoint: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            data,
            test_fraction,
            output,
            seed,
            quiet,
        } => run_training(config, data, test_fraction, output, seed, quiet),

        Commands::Init { output } => generate_config(output),

        Commands::Analyze { checkpoint } => analyze_checkpoint(checkpoint),
    }
}

fn run_training(
    config_path: PathBuf,
    data_path: PathBuf,
    test_fraction: f64,
    output: PathBuf,
    seed: u64,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // Load or create config
    let config = if config_path.exists() {
        println!("Loading config from: {:?}", config_path);
        Config::from_file(&config_path)?
    } else {
        println!("Using default configuration");
        Config::default()
    };

    // Load data
    let dataset = Dataset::from_csv(&data_path, test_fraction, seed)?;
    println!("Loaded dataset: {:?}", data_path);
    println!("  Features: {}", dataset.features());
    println!("  Train samples: {}", dataset.train_len());
    println!("  Test samples: {}", dataset.test_len());

    // Create output directory
    std::fs::create_dir_all(&output)?;

    // Build initial network
    let mut network = FuzzyNetwork::new(
        dataset.features(),
        config.network.initial_neurons,
        &config.network,
    );
    if config.network.centers_from_samples {
        network.init_centers_from_samples(dataset.x_train(), seed);
    }

    println!("Starting self-organization");
    println!("  Initial neurons: {}", network.neurons());
    println!("  Max neurons: {}", config.organizer.max_neurons);
    println!();

    let start = Instant::now();
    let report = SelfOrganizer::new(&mut network, &dataset, &config).self_organize()?;
    let elapsed = start.elapsed();

    println!();
    println!("=== Organization Complete ===");
    match report.termination {
        Termination::CriteriaSatisfied => println!("Terminal: criteria satisfied"),
        Termination::NeuronCapReached => println!("Terminal: neuron cap reached"),
        Termination::IterationLimit => println!("Terminal: iteration limit reached"),
    }
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Iterations: {}", report.iterations);
    println!(
        "Neurons: +{} -{} (final {})",
        report.neurons_added,
        report.neurons_pruned,
        network.neurons()
    );
    if report.widen_bailouts > 0 && !quiet {
        println!("Widening bailouts: {}", report.widen_bailouts);
    }
    println!("Initial: {}", report.initial.summary());
    println!("Final:   {}", report.final_eval.summary());

    // Save trained model
    let model_path = output.join("model.bin");
    let checkpoint = ModelCheckpoint::new(config, network);
    checkpoint.save(&model_path)?;
    println!("Model saved: {:?}", model_path);

    // Save organization report
    let report_path = output.join("report.json");
    report.save(report_path.to_str().ok_or("invalid output path")?)?;
    println!("Report saved: {:?}", report_path);

    Ok(())
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save(&output)?;
    println!("Default configuration written to: {:?}", output);
    Ok(())
}

fn analyze_checkpoint(path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let checkpoint = ModelCheckpoint::load(&path)?;
    let network = &checkpoint.network;

    println!("=== Model Checkpoint ===");
    println!("Version: {}", checkpoint.version);
    println!("Features: {}", network.features());
    println!("Neurons: {}", network.neurons());
    println!("Valid parameters: {}", network.is_valid());

    let (c, s, a) = network.parameters();
    println!();
    println!("Centers: {:?}", c.dim());
    println!("Widths: {:?}", s.dim());
    println!("Consequent weights: {:?}", a.dim());
    println!();
    println!("Organizer settings at save time:");
    println!("  ksig: {}", checkpoint.config.organizer.ksig);
    println!("  err_delta: {}", checkpoint.config.organizer.err_delta);
    println!("  ifpart_thresh: {}", checkpoint.config.organizer.ifpart_thresh);
    println!("  max_neurons: {}", checkpoint.config.organizer.max_neurons);

    Ok(())
}
