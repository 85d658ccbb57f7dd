//! Subscriber setup for binaries and tests
//!
//! The library only emits `tracing` events. Whoever runs it decides where they
//! go by holding the guard returned here for as long as output is wanted.

use tracing::subscriber::DefaultGuard;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

fn filter(verbose: bool) -> EnvFilter {
    let fallback = if verbose { "fracflow=debug,info" } else { "fracflow=info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Install a compact fmt subscriber for the current thread
///
/// `RUST_LOG` overrides the level chosen by `verbose`. Dropping the guard
/// restores the previous subscriber.
pub fn scoped_logger(verbose: bool) -> DefaultGuard {
    let subscriber = tracing_subscriber::registry().with(filter(verbose)).with(
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .compact(),
    );
    tracing::subscriber::set_default(subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_scopes_subscriber() {
        {
            let _guard = scoped_logger(true);
            tracing::debug!("inside scope");
        }
        // A second guard after the first is dropped installs cleanly
        let _guard = scoped_logger(false);
        tracing::info!("second scope");
    }
}
