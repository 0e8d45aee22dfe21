use std::env;
use std::str::FromStr;

use tracing::debug;

use crate::util::error::CacheError;

pub mod error;
pub mod markers;

pub type CacheResult<T> = Result<T, CacheError>;

/// Reads an optional environment variable, falling back to the default when it isn't set.
pub fn env_or<T: FromStr>(key: &str, default: T) -> CacheResult<T> {
    match env::var(key) {
        Ok(value) => {
            debug!("Config option {} set to {:?} from the environment", key, value);
            parse_option(key, &value)
        }
        Err(_) => Ok(default),
    }
}

/// Parses a single config value, mapping failures to an `InvalidConfig` error for that key.
pub fn parse_option<T: FromStr>(key: &str, value: &str) -> CacheResult<T> {
    value.trim().parse().map_err(|_| CacheError::InvalidConfig {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_option_maps_failures_to_config_errors() {
        let parsed: CacheResult<u64> = parse_option("SHARDS", " 12 ");
        assert_eq!(parsed.unwrap(), 12);

        let err = parse_option::<u64>("SHARDS", "twelve").unwrap_err();
        assert!(err.is_config_error());
        assert_eq!(err.to_string(), "Invalid value for config option SHARDS: \"twelve\"");
    }

    #[test]
    fn env_or_falls_back_when_unset() {
        let value: u64 = env_or("GEARCACHE_TEST_SURELY_UNSET_VARIABLE", 7).unwrap();
        assert_eq!(value, 7);
    }
}
