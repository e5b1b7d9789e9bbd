//! Logging helper
//!
//! Used by all binaries and tests to implement consistent logging

// Imports
use {
	std::env,
	tracing::level_filters::LevelFilter,
	tracing_subscriber::{EnvFilter, prelude::*},
};

/// Initializes logging
pub fn init() {
	let registry = tracing_subscriber::registry();

	let layer = tracing_subscriber::fmt::layer()
		.with_ansi(self::use_color())
		.with_filter(self::filter());

	registry.with(layer).init();
}

/// Initializes logging for tests.
///
/// Output is captured by the test harness, and calling this more than
/// once (e.g. once per test) is fine.
pub fn init_test() {
	let registry = tracing_subscriber::registry();

	let layer = tracing_subscriber::fmt::layer()
		.with_ansi(self::use_color())
		.with_test_writer()
		.with_filter(self::filter());

	// Note: Only the first test to call this gets to initialize it
	_ = registry.with(layer).try_init();
}

/// Returns whether to use colors
fn use_color() -> bool {
	env::var("RUST_LOG_COLOR").map_or(true, |value| {
		matches!(value.trim().to_uppercase().as_str(), "1" | "YES" | "TRUE")
	})
}

/// Creates the filter from `RUST_LOG`, defaulting to `INFO`
fn filter() -> EnvFilter {
	EnvFilter::builder()
		.with_default_directive(LevelFilter::INFO.into())
		.from_env_lossy()
}
