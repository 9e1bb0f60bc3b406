//! Tracing setup for client processes.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// Respects `RUST_LOG`; defaults to INFO when unset. Logs go to stderr so
/// stdout stays free for whatever front-end owns it.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(default_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok()))
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to install tracing subscriber: {err}"))?;

    Ok(())
}

/// `RUST_LOG` verbatim when set; the directives there replace the default
/// rather than compete with it.
fn default_filter(directives: Option<String>) -> EnvFilter {
    match directives {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::new("info"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_directives_replace_the_default() {
        assert_eq!(default_filter(None).to_string(), "info");
        // An explicit quieter level must not be overridden back to info.
        assert_eq!(
            default_filter(Some("error".to_string())).to_string(),
            "error"
        );
    }
}
