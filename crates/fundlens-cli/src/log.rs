use tracing_subscriber::{fmt, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt, EnvFilter};

const VERBOSE_DIRECTIVES: &str = "fundlens_cli=debug,fundlens_core=debug,fundlens_warehouse=debug";

/// Install the stderr subscriber. `verbose` wins over `RUST_LOG`.
pub fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new(VERBOSE_DIRECTIVES)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"))
    };

    // A second initialisation (tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).without_time())
        .with(env_filter)
        .try_init();
}
