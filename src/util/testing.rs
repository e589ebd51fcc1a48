//! Logging for tests: one tracing subscriber per test binary.

use std::sync::OnceLock;

use tracing::info;
use tracing_subscriber::{fmt, fmt::format::FmtSpan, prelude::*, EnvFilter};

/// Filter used when `RUST_LOG` is unset: flattree at trace, dependencies at warn.
pub const DEFAULT_TEST_DIRECTIVE: &str = "warn,flattree=trace";

static INSTALLED: OnceLock<bool> = OnceLock::new();

pub fn init_test_setup() {
    init_test_setup_with(DEFAULT_TEST_DIRECTIVE);
}

/// Install the test subscriber with `directive` as the fallback filter.
///
/// Only the first call in a process does anything; later calls report its outcome.
/// Returns false if another global subscriber was already in place.
pub fn init_test_setup_with(directive: &str) -> bool {
    *INSTALLED.get_or_init(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

        // test writer: output is captured per test and shown only on failure
        let installed = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_test_writer()
                    .compact()
                    .with_span_events(FmtSpan::CLOSE)
                    .with_filter(filter),
            )
            .try_init()
            .is_ok();

        if installed {
            info!(directive, "test logging installed");
        }
        installed
    })
}
