//! Logging initialization
//!
//! Logs go to stderr so they never mix with rendered output on stdout.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT_ONCE: Once = Once::new();

const DEFAULT_FILTER: &str = "datacontract=warn";
const VERBOSE_FILTER: &str = "datacontract=debug";

/// Install the fmt subscriber
///
/// `RUST_LOG` takes effect unless `verbose` is set.
pub fn init(verbose: bool) {
    INIT_ONCE.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter(verbose, std::env::var("RUST_LOG").ok()))
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    });
}

fn filter(verbose: bool, env: Option<String>) -> EnvFilter {
    if verbose {
        return EnvFilter::new(VERBOSE_FILTER);
    }
    env.and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_selection() {
        assert_eq!(filter(true, Some("trace".into())).to_string(), VERBOSE_FILTER);
        assert_eq!(filter(false, None).to_string(), DEFAULT_FILTER);
        assert_eq!(
            filter(false, Some("datacontract_core=info".into())).to_string(),
            "datacontract_core=info"
        );
    }

    #[test]
    fn test_init_twice() {
        init(false);
        init(true);
    }
}
