//! Service configuration.
//!
//! Everything is read from the environment at startup, with defaults that
//! run the service locally against artifacts in the working directory.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::artifacts::ArtifactPaths;
use crate::domain::{ArrivalClock, InvalidArrivalClock};

/// Directory holding the model and encoder artifacts.
pub const ARTIFACT_DIR_VAR: &str = "ARTIFACT_DIR";
/// Listener address, `host:port`.
pub const BIND_ADDR_VAR: &str = "BIND_ADDR";
/// Arrival clock convention, `extended` or `wrapped`.
pub const ARRIVAL_CLOCK_VAR: &str = "ARRIVAL_CLOCK";

/// Model file, overriding the default name in the artifact directory.
pub const MODEL_PATH_VAR: &str = "MODEL_PATH";
/// Station encoder file.
pub const STATION_ENCODER_PATH_VAR: &str = "STATION_ENCODER_PATH";
/// Train encoder file.
pub const TRAIN_ENCODER_PATH_VAR: &str = "TRAIN_ENCODER_PATH";
/// Day encoder file.
pub const DAY_ENCODER_PATH_VAR: &str = "DAY_ENCODER_PATH";

/// Default listener address.
const DEFAULT_BIND_ADDR: ([u8; 4], u16) = ([127, 0, 0, 1], 3000);

/// Errors reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Bind address did not parse
    #[error("invalid BIND_ADDR {value:?}: {message}")]
    InvalidBindAddr { value: String, message: String },

    /// Unknown arrival clock convention
    #[error("invalid ARRIVAL_CLOCK: {0}")]
    InvalidArrivalClock(#[from] InvalidArrivalClock),
}

/// Startup configuration for the prediction service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Where the artifacts live.
    pub artifacts: ArtifactPaths,

    /// Address to serve HTTP on.
    pub bind_addr: SocketAddr,

    /// How predicted arrivals past midnight are rendered.
    pub arrival_clock: ArrivalClock,
}

impl ServiceConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through a variable lookup function.
    ///
    /// Unset or empty variables take their defaults. Per-file paths apply
    /// after the artifact directory.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(dir) = get(ARTIFACT_DIR_VAR) {
            config.artifacts = ArtifactPaths::in_dir(PathBuf::from(dir));
        }
        if let Some(path) = get(MODEL_PATH_VAR) {
            config.artifacts = config.artifacts.with_model(path);
        }
        if let Some(path) = get(STATION_ENCODER_PATH_VAR) {
            config.artifacts = config.artifacts.with_station_encoder(path);
        }
        if let Some(path) = get(TRAIN_ENCODER_PATH_VAR) {
            config.artifacts = config.artifacts.with_train_encoder(path);
        }
        if let Some(path) = get(DAY_ENCODER_PATH_VAR) {
            config.artifacts = config.artifacts.with_day_encoder(path);
        }

        if let Some(addr) = get(BIND_ADDR_VAR) {
            config.bind_addr = addr
                .trim()
                .parse::<SocketAddr>()
                .map_err(|e| ConfigError::InvalidBindAddr {
                    value: addr.clone(),
                    message: e.to_string(),
                })?;
        }

        if let Some(clock) = get(ARRIVAL_CLOCK_VAR) {
            config.arrival_clock = clock.parse::<ArrivalClock>()?;
        }

        Ok(config)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            artifacts: ArtifactPaths::default(),
            bind_addr: SocketAddr::from(DEFAULT_BIND_ADDR),
            arrival_clock: ArrivalClock::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config() {
        let config = ServiceConfig::default();

        assert_eq!(config.artifacts, ArtifactPaths::in_dir("."));
        assert_eq!(config.bind_addr, "127.0.0.1:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.arrival_clock, ArrivalClock::Extended);
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = ServiceConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServiceConfig::default());
    }

    #[test]
    fn custom_config() {
        let config = ServiceConfig::from_lookup(lookup(&[
            (ARTIFACT_DIR_VAR, "/srv/delay-model"),
            (BIND_ADDR_VAR, "0.0.0.0:8080"),
            (ARRIVAL_CLOCK_VAR, "wrapped"),
        ]))
        .unwrap();

        assert_eq!(config.artifacts, ArtifactPaths::in_dir("/srv/delay-model"));
        assert_eq!(config.bind_addr, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.arrival_clock, ArrivalClock::Wrapped);
    }

    #[test]
    fn artifact_paths_override_directory() {
        let config = ServiceConfig::from_lookup(lookup(&[
            (ARTIFACT_DIR_VAR, "/srv/delay-model"),
            (MODEL_PATH_VAR, "/opt/models/v2.json"),
            (STATION_ENCODER_PATH_VAR, "/opt/enc/stations.json"),
            (TRAIN_ENCODER_PATH_VAR, "/opt/enc/trains.json"),
            (DAY_ENCODER_PATH_VAR, "/opt/enc/days.json"),
        ]))
        .unwrap();

        let expected = ArtifactPaths::in_dir("/srv/delay-model")
            .with_model("/opt/models/v2.json")
            .with_station_encoder("/opt/enc/stations.json")
            .with_train_encoder("/opt/enc/trains.json")
            .with_day_encoder("/opt/enc/days.json");
        assert_eq!(config.artifacts, expected);
        assert_eq!(config.artifacts.model, PathBuf::from("/opt/models/v2.json"));
    }

    #[test]
    fn single_artifact_override_keeps_other_defaults() {
        let config = ServiceConfig::from_lookup(lookup(&[
            (DAY_ENCODER_PATH_VAR, "days.json"),
            (MODEL_PATH_VAR, " "),
        ]))
        .unwrap();

        assert_eq!(
            config.artifacts,
            ArtifactPaths::default().with_day_encoder("days.json")
        );
    }

    #[test]
    fn blank_values_are_unset() {
        let config = ServiceConfig::from_lookup(lookup(&[(BIND_ADDR_VAR, "  ")])).unwrap();
        assert_eq!(config.bind_addr, ServiceConfig::default().bind_addr);
    }

    #[test]
    fn invalid_bind_addr() {
        let err = ServiceConfig::from_lookup(lookup(&[(BIND_ADDR_VAR, "localhost")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBindAddr { .. }));
        assert!(err.to_string().starts_with("invalid BIND_ADDR \"localhost\""));
    }

    #[test]
    fn invalid_arrival_clock() {
        let err = ServiceConfig::from_lookup(lookup(&[(ARRIVAL_CLOCK_VAR, "modulo")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidArrivalClock(_)));
    }
}
