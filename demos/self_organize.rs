//! End-to-end demo: self-organize a fuzzy network on synthetic
//! two-cluster data and print the resulting topology.
//!
//! Run with: cargo run --example self_organize

use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use sofnn::{Config, Dataset, FuzzyNetwork, SelfOrganizer};

fn synthetic_clusters(samples: usize, seed: u64) -> Dataset {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut x = Vec::with_capacity(samples);
    let mut y = Vec::with_capacity(samples);
    for i in 0..samples {
        let class = i % 2;
        let center = if class == 1 { 0.0 } else { 8.0 };
        x.push(center + rng.gen_range(-0.5..0.5));
        y.push(class as f64);
    }

    let split = samples * 3 / 4;
    let x_train = Array2::from_shape_vec((split, 1), x[..split].to_vec()).unwrap();
    let y_train = Array1::from_vec(y[..split].to_vec());
    let x_test = Array2::from_shape_vec((samples - split, 1), x[split..].to_vec()).unwrap();
    let y_test = Array1::from_vec(y[split..].to_vec());

    Dataset::new(x_train, y_train, x_test, y_test).unwrap()
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = Config::default();
    config.organizer.max_neurons = 10;

    let data = synthetic_clusters(80, 42);
    println!(
        "Dataset: {} train / {} test samples, {} feature(s)",
        data.train_len(),
        data.test_len(),
        data.features()
    );

    let mut network = FuzzyNetwork::new(
        data.features(),
        config.network.initial_neurons,
        &config.network,
    );
    network.init_centers_from_samples(data.x_train(), 42);

    let report = SelfOrganizer::new(&mut network, &data, &config)
        .self_organize()
        .expect("self-organization failed");

    println!();
    println!("Terminated: {:?}", report.termination);
    println!("Iterations: {}", report.iterations);
    println!(
        "Neurons added: {}, pruned: {}, final: {}",
        report.neurons_added,
        report.neurons_pruned,
        network.neurons()
    );
    println!("Initial: {}", report.initial.summary());
    println!("Final:   {}", report.final_eval.summary());

    let (c, s, _) = network.parameters();
    println!();
    println!("Rule centers: {:.3}", c);
    println!("Rule widths:  {:.3}", s);
}
