//! Common test utilities and logging infrastructure
//!
//! Tests log through `tracing`; the library logs through `log`, which the
//! subscriber picks up via its `tracing-log` bridge.
//!
//! # Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::init_test_logging;
//!
//! #[test]
//! fn my_test() {
//!     init_test_logging();
//!     // test code...
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG=debug` - Enable debug logging in tests
//! - `RUST_LOG=gridbox::solver=debug` - Solved dimensions only
//! - `TEST_LOG_JSON=1` - Output JSON format for CI parsing
//!
//! Not every helper is used by every test binary.

#![allow(dead_code)]

use std::sync::Once;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use gridbox::Table;

static INIT: Once = Once::new();

fn install(env_filter: EnvFilter) {
    if std::env::var("TEST_LOG_JSON").is_ok() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_test_writer())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_test_writer()
                    .with_file(true)
                    .with_line_number(true)
                    .with_thread_ids(true)
                    .with_target(true)
                    .compact(),
            )
            .try_init()
            .ok();
    }
}

/// Initialize test logging infrastructure.
///
/// Output goes to the test writer, so it is captured unless `--nocapture`
/// is passed. Calling it more than once is safe.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("gridbox=debug,test=info"));
        install(env_filter);
    });
}

/// Initialize test logging with a custom filter unless `RUST_LOG` is set.
pub fn init_test_logging_with_filter(filter: &str) {
    INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
        install(env_filter);
    });
}

/// A span guard that logs entry into a test phase.
pub fn test_phase(name: &str) -> tracing::span::EnteredSpan {
    let span = tracing::info_span!("test_phase", phase = name);
    tracing::info!(phase = name, "entering test phase");
    span.entered()
}

/// Log test context information.
pub fn log_test_context(test_name: &str, description: &str) {
    tracing::info!(
        test_name = test_name,
        description = description,
        "test context"
    );
}

/// Render `table` and compare it with `expected`, logging both on mismatch.
#[track_caller]
pub fn assert_rendered(table: &Table<'_>, expected: &str) {
    let output = table.render_to_string();
    if output != expected {
        tracing::error!(output = %output, expected = %expected, "rendering mismatch");
    }
    assert_eq!(output, expected);
}
