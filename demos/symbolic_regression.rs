//! Symbolic regression end to end: evolve an expression fitting a known
//! target function over three variables.
//!
//! Run with `cargo run --example symbolic_regression`.

use std::sync::Arc;

use arbor_gp::prelude::*;

/// The function the engine should rediscover
fn target(row: &[f64]) -> f64 {
    let (x, y, z) = (row[0], row[1], row[2]);
    x * x + y * z
}

/// A small grid of sample points over [-2, 2]^3
fn grid(step_count: usize) -> Vec<Vec<f64>> {
    let mut rows = Vec::new();
    let step = 4.0 / (step_count - 1) as f64;
    for i in 0..step_count {
        for j in 0..step_count {
            for k in 0..step_count {
                rows.push(vec![
                    -2.0 + i as f64 * step,
                    -2.0 + j as f64 * step,
                    -2.0 + k as f64 * step,
                ]);
            }
        }
    }
    rows
}

fn main() -> GpResult<()> {
    env_logger::init();

    let variables = vec!["x".to_string(), "y".to_string(), "z".to_string()];
    let training = RegressionData::from_target(variables.clone(), grid(5), target)?;
    let testing = RegressionData::from_target(variables.clone(), grid(4), target)?;
    let train_samples = training.len();
    let test_samples = testing.len();

    let params = Arc::new(TreeInitParameters::with_random_constants(
        variables,
        standard_alphabet(),
        0.05,
        (-1.0, 1.0),
    )?);

    let config = EvolutionConfig {
        seed: 23,
        ..EvolutionConfig::default()
    };

    println!("Creating population...");
    let mut rng = config.rng();
    let mut population = config.initial_population(params, &mut rng);

    let evaluator = Evaluator::new(SquaredError::new(), training, testing)
        .with_tournament_size(config.tournament_k);

    println!("Evolving over {} generations...", config.generations);
    let outcome = Evolution::from_config(&config)?.run(&mut population, &evaluator, &mut rng)?;

    println!("+++ Best individual +++");
    println!(
        "  training error (per sample): {:.6e}",
        outcome.best.fitness().unwrap_or(f64::INFINITY) / train_samples as f64
    );
    println!(
        "  testing error (per sample):  {:.6e}",
        evaluator.testing_error(&outcome.best) / test_samples as f64
    );
    println!("  height: {}", outcome.best.height());
    println!("  learnt function: {}", outcome.best.expression());
    println!("  bloat events: {}", outcome.stats.bloat_events());
    Ok(())
}
