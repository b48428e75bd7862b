//! Shared fixtures for the `vertexflow` integration tests.
//!
//! - [`builders`]: small weighted graphs and engine options.
//! - [`recorder`]: a vertex program that logs where it ran.

pub mod builders;
pub mod recorder;

use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Install a test-writer subscriber once per test binary.
///
/// Filtered by `RUST_LOG` (default `warn`); output only shows for failing
/// tests unless run with `--nocapture`. Worker thread names are included so
/// threaded-engine logs stay readable.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

        // Another harness may have installed a subscriber already.
        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_thread_names(true)
            .try_init();
    });
}
