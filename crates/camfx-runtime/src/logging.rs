//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

use camfx_core::{CamfxError, CamfxResult};

use crate::LogConfig;

/// Build the filter: `RUST_LOG` wins over the configured directive
pub fn env_filter(config: &LogConfig) -> CamfxResult<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.filter)
            .map_err(|e| CamfxError::Config(format!("invalid log filter {:?}: {}", config.filter, e))),
    }
}

/// Install the global subscriber.
///
/// Fails if the filter is invalid or a global subscriber is already set.
pub fn init(config: &LogConfig) -> CamfxResult<()> {
    let filter = env_filter(config)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| CamfxError::Config(format!("tracing init failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_directive_is_rejected() {
        let config = LogConfig {
            filter: "camfx=notalevel".to_string(),
            json: false,
        };
        if std::env::var_os("RUST_LOG").is_none() {
            assert!(env_filter(&config).is_err());
        }
    }

    #[test]
    fn test_default_directive_parses() {
        assert!(env_filter(&LogConfig::default()).is_ok());
    }
}
