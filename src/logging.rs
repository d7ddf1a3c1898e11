use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global subscriber. `RUST_LOG` wins when set; otherwise
/// `verbose` raises this crate to debug.
pub fn init(verbose: bool) {
    let default_directives = if verbose {
        "warn,ticket_lens=debug"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directives.into()),
        )
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}
