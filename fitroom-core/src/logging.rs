// fitroom-core/src/logging.rs

use tracing_subscriber::{fmt, EnvFilter};

use crate::Error;

/// Installs the global tracing subscriber. Called once by the hosting
/// binary before anything else; respects `RUST_LOG` overrides.
pub fn init_tracing() -> Result<(), Error> {
    let filter = EnvFilter::from_default_env()
        .add_directive("fitroom=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(sub)
        .map_err(|e| Error::Config(format!("failed to set global subscriber: {}", e)))?;
    Ok(())
}
