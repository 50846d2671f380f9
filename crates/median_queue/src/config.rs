use crate::error::QueueError;
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Parser, Clone, Debug, Serialize, Deserialize)]
#[command(author, version, about = "Differential soak run of the median queue against a linear scan", long_about = None)]
pub struct Config {
	#[arg(long, env = "SOAK_SEED", default_value = "42", help = "Seed for the operation generator")]
	pub seed: u64,

	#[arg(long, env = "SOAK_OPERATIONS", default_value = "10000", help = "Number of operations to apply")]
	pub operations: usize,

	#[arg(
        long,
        env = "SOAK_MAX_VALUE",
        default_value = "1000",
        help = "Inserted values are drawn from -max_value..=max_value"
    )]
	pub max_value: i64,

	#[arg(
        long,
        env = "SOAK_INSERT_WEIGHT",
        default_value = "60",
        help = "Percentage of operations that insert; the rest split between delete_max and delete_min"
    )]
	pub insert_weight: u8,

	#[arg(long, env = "SOAK_CLEAR_EVERY", default_value = "0", help = "Clear both queues every N operations (0 disables)")]
	pub clear_every: usize,

	/// Use JSON formatting for tracing
	#[arg(long, env = "LOG_JSON", default_value = "false")]
	pub log_json: bool,

	/// Log level
	#[arg(long, env = "RUST_LOG")]
	pub rust_log: Option<String>,
}

impl Config {
	#[must_use]
	pub fn new() -> Self {
		Self::parse()
	}

	/// # Errors
	///
	/// Returns `QueueError::InvalidArgument` for an insert weight above 100 or a non-positive value
	/// range.
	pub fn validate(&self) -> Result<(), QueueError> {
		if self.insert_weight > 100 {
			return Err(QueueError::InvalidArgument(format!(
				"insert weight must be a percentage, got {}",
				self.insert_weight
			)));
		}
		if self.max_value <= 0 {
			return Err(QueueError::InvalidArgument(format!("max value must be positive, got {}", self.max_value)));
		}
		Ok(())
	}

	#[cfg(test)]
	pub fn test() -> Self {
		Self {
			seed: 7,
			operations: 500,
			max_value: 50,
			insert_weight: 60,
			clear_every: 0,
			log_json: false,
			rust_log: None,
		}
	}
}

impl Default for Config {
	fn default() -> Self {
		Self {
			seed: 42,
			operations: 10_000,
			max_value: 1000,
			insert_weight: 60,
			clear_every: 0,
			log_json: false,
			rust_log: None,
		}
	}
}
