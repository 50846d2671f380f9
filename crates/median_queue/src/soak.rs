use crate::config::Config;
use crate::error::QueueError;
use crate::reference::LinearMedianQueue;
use crate::tester::{DifferentialTester, DivergenceError};
use crate::MedianQueue;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

const PROGRESS_INTERVAL: usize = 1000;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoakReport {
	pub seed: u64,
	pub operations: usize,
	pub inserts: usize,
	pub delete_max: usize,
	pub delete_min: usize,
	pub clears: usize,
	pub checks: usize,
	pub final_count: usize,
}

#[derive(Error, Debug)]
pub enum SoakError {
	#[error("Invalid configuration: {0}")]
	Config(#[from] QueueError),
	#[error("Divergence at operation {step}: {source}")]
	Divergence {
		step: usize,
		#[source]
		source: DivergenceError,
	},
}

/// Applies `config.operations` seeded random operations to a [`MedianQueue`] and a
/// [`LinearMedianQueue`] in lockstep, stopping at the first disagreement.
///
/// # Errors
///
/// Returns `SoakError::Config` for an invalid configuration and `SoakError::Divergence` when the
/// two queues disagree.
pub fn run(config: &Config) -> Result<SoakReport, SoakError> {
	config.validate()?;

	let mut rng = StdRng::seed_from_u64(config.seed);
	let mut tester = DifferentialTester::new(MedianQueue::by_ord(), LinearMedianQueue::by_ord(), |a: &i64, b: &i64| a == b);
	let mut report = SoakReport {
		seed: config.seed,
		..SoakReport::default()
	};

	info!(seed = config.seed, operations = config.operations, "starting soak run");

	for step in 0..config.operations {
		let outcome = if config.clear_every > 0 && step > 0 && step % config.clear_every == 0 {
			report.clears += 1;
			tester.test_clear()
		} else {
			let roll = rng.gen_range(0..100u8);
			if roll < config.insert_weight {
				report.inserts += 1;
				tester.test_insert(rng.gen_range(-config.max_value..=config.max_value))
			} else if roll % 2 == 0 {
				report.delete_max += 1;
				tester.test_delete_max()
			} else {
				report.delete_min += 1;
				tester.test_delete_min()
			}
		};
		outcome.map_err(|source| SoakError::Divergence { step, source })?;
		report.operations += 1;

		if step % PROGRESS_INTERVAL == 0 {
			debug!(step, count = tester.first().len(), "soak progress");
		}
	}

	report.checks = tester.checks();
	report.final_count = tester.first().len();
	info!(checks = report.checks, final_count = report.final_count, "soak run finished");
	Ok(report)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_run_agrees() {
		let config = Config::test();
		let report = run(&config).unwrap();
		assert_eq!(report.operations, config.operations);
		assert_eq!(report.checks, config.operations);
		assert_eq!(report.inserts + report.delete_max + report.delete_min + report.clears, config.operations);
		assert_eq!(report.seed, config.seed);
	}

	#[test]
	fn test_run_is_deterministic() {
		let config = Config::test();
		assert_eq!(run(&config).unwrap(), run(&config).unwrap());
	}

	#[test]
	fn test_run_with_clears() {
		let config = Config {
			clear_every: 100,
			..Config::test()
		};
		let report = run(&config).unwrap();
		assert_eq!(report.clears, 4);
	}

	#[test]
	fn test_insert_only_run_keeps_everything() {
		let config = Config {
			insert_weight: 100,
			operations: 64,
			..Config::test()
		};
		let report = run(&config).unwrap();
		assert_eq!(report.inserts, 64);
		assert_eq!(report.final_count, 64);
	}

	#[test]
	fn test_invalid_config_is_rejected() {
		let config = Config {
			insert_weight: 150,
			..Config::test()
		};
		assert!(matches!(run(&config), Err(SoakError::Config(QueueError::InvalidArgument(_)))));
	}
}
