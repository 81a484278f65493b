//! Structured logging.
//!
//! # Design Decisions
//! - `RUST_LOG` takes precedence when set
//! - Otherwise info for this crate, or debug when verbose

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "backplane_cli=debug,ocm_backplane=debug"
    } else {
        "backplane_cli=info,ocm_backplane=info"
    }
}

/// Install the global tracing subscriber.
pub fn init(verbose: bool) {
    let _ = tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(verbose).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
