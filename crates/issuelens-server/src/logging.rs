// SPDX-License-Identifier: Apache-2.0

//! Logging initialization for the IssueLens binary.
//!
//! Uses `tracing` with `tracing-subscriber`. Logs go to stderr so `--output json`
//! stays machine-readable on stdout.
//!
//! # Examples
//!
//! ```bash
//! # Default: info for issuelens, errors only for HTTP clients
//! issuelens serve
//!
//! # Debug output for troubleshooting
//! RUST_LOG=issuelens=debug issuelens analyze https://github.com/acme/widgets 42
//! ```

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_FILTER: &str = "issuelens=info,octocrab=error,reqwest=error";
const VERBOSE_FILTER: &str = "issuelens=debug,octocrab=error,reqwest=error";

/// Initialize the logging subsystem.
///
/// `RUST_LOG` takes precedence; otherwise `verbose` selects debug level for
/// IssueLens targets.
pub fn init_logging(verbose: bool) {
    let fmt_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let default_filter = if verbose {
        VERBOSE_FILTER
    } else {
        DEFAULT_FILTER
    };
    let filter_layer = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
