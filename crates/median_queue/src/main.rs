use anyhow::Context;
use median_queue::config::Config;
use median_queue::soak;
use tracing_subscriber::{filter::EnvFilter, fmt::format::JsonFields, util::SubscriberInitExt, Layer};

fn main() -> anyhow::Result<()> {
	dotenv::dotenv().ok();

	let config = Config::new();
	init_tracing(&config)?;

	let report = soak::run(&config).context(format!("soak run with seed {} failed", config.seed))?;
	println!("{}", serde_json::to_string_pretty(&report)?);

	Ok(())
}

/// Installs the global subscriber when `RUST_LOG` is set.
///
/// # Errors
///
/// Fails on a malformed `RUST_LOG` directive or when a subscriber is already installed.
pub fn init_tracing(config: &Config) -> anyhow::Result<()> {
	use std::str::FromStr;
	use tracing_subscriber::layer::SubscriberExt;

	let Some(directives) = config.rust_log.as_deref() else {
		return Ok(());
	};
	let filter = EnvFilter::from_str(directives).with_context(|| format!("invalid RUST_LOG directive {directives:?}"))?;

	tracing_subscriber::registry()
		.with(if config.log_json {
			Box::new(
				tracing_subscriber::fmt::layer()
					.fmt_fields(JsonFields::default())
					.event_format(tracing_subscriber::fmt::format().json().flatten_event(true).with_span_list(false))
					.with_filter(filter),
			) as Box<dyn Layer<_> + Send + Sync>
		} else {
			Box::new(
				tracing_subscriber::fmt::layer()
					.event_format(tracing_subscriber::fmt::format().pretty())
					.with_filter(filter),
			)
		})
		.try_init()
		.context("failed to install tracing subscriber")
}
