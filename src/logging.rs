//! Logging setup.
//!
//! Components do not derive their log category from where they are
//! called. Each one receives a span at construction, tagged once with a
//! static component name, and enters it for the duration of every
//! operation.

use tracing::Span;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Creates the span a component logs under.
pub fn component_span(component: &'static str) -> Span {
    tracing::info_span!("component", name = component)
}

/// Installs the global subscriber for the binary.
///
/// `RUST_LOG` wins when set; otherwise the crate logs at `info`, or at
/// `debug` when `verbose` is true.
pub fn init_logger(verbose: bool) {
    let fallback = if verbose {
        "payroll_ledger=debug,info"
    } else {
        "payroll_ledger=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .compact(),
        )
        .init();
}
