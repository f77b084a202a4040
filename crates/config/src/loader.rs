use std::path::Path;

use crate::{Config, Error};

pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path.as_ref())?;
    let config = parse(&content)?;

    log::debug!("Loaded configuration from {}", path.as_ref().display());

    Ok(config)
}

pub(crate) fn parse(content: &str) -> crate::Result<Config> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;

    Ok(config)
}

pub(crate) fn validate(config: &Config) -> crate::Result<()> {
    if config.index.max_token_groups == 0 {
        return Err(Error::Invalid {
            field: "index.max_token_groups",
            reason: "must be at least 1".to_string(),
        });
    }

    let hours = config.index.retention_hours;
    if !hours.is_finite() || hours <= 0.0 {
        return Err(Error::Invalid {
            field: "index.retention_hours",
            reason: format!("must be a positive number of hours, got {hours}"),
        });
    }

    if config.sweeper.interval.is_zero() {
        return Err(Error::Invalid {
            field: "sweeper.interval",
            reason: "must be greater than zero".to_string(),
        });
    }

    if config.storage.timeout.is_zero() {
        return Err(Error::Invalid {
            field: "storage.timeout",
            reason: "must be greater than zero".to_string(),
        });
    }

    Ok(())
}
