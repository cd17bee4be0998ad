use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::Error;
use crate::config;

/// Installs the global tracing subscriber.
///
/// Events go to stderr, since the host owns stdout. Filter directives come from `RUST_LOG` and
/// fall back to the configured filter.
///
/// # Errors
///
/// Returns [`Error::Tracing`] if another subscriber is already installed, e.g. by the host or
/// by an earlier plugin load in the same process.
pub fn try_init(tracing: &config::TracingConfig) -> Result<(), Error> {
    if !tracing.enabled {
        return Ok(());
    }

    let stderr_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(std::io::stderr);

    // initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing.filter.as_str().into()),
        )
        .with(stderr_layer)
        .try_init()
        .map_err(|err| Error::Tracing(Box::new(err)))?;

    info!("tracing initialized");

    Ok(())
}
