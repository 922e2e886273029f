use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `LOG_LEVEL` overrides the default filter.
pub fn init(debug: bool) {
    let default_filter = if debug {
        "debug,html5ever=error,selectors=error,hyper=warn,reqwest=info"
    } else {
        "info,html5ever=error,selectors=error,hyper=warn"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| default_filter.into()))
        .init();
}
