use std::path::Path;

use dataplane_anonymize::DEFAULT_TRUSTEE;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Address kind handled by the HTTP source and sink factories.
pub const DEFAULT_DATA_TYPE: &str = "HttpDataAnonymize";
/// Parts uploaded per partition, and the per-sink in-flight bound.
pub const DEFAULT_PARTITION_SIZE: usize = 5;
/// Prefix of environment variables overriding file settings.
pub const ENV_PREFIX: &str = "DATAPLANE_";

/// Runtime settings of the HTTP data plane.
///
/// Loaded from defaults, then an optional TOML file, then `DATAPLANE_*`
/// environment variables (nested keys separated by `__`, e.g.
/// `DATAPLANE_ANONYMIZE__ENABLED=false`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataPlaneConfig {
    pub sink_partition_size: usize,
    pub data_type: String,
    pub anonymize: AnonymizeConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnonymizeConfig {
    pub enabled: bool,
    pub trustees: Vec<String>,
}

impl Default for DataPlaneConfig {
    fn default() -> Self {
        Self {
            sink_partition_size: DEFAULT_PARTITION_SIZE,
            data_type: DEFAULT_DATA_TYPE.to_string(),
            anonymize: AnonymizeConfig::default(),
        }
    }
}

impl Default for AnonymizeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            trustees: vec![DEFAULT_TRUSTEE.to_string()],
        }
    }
}

impl DataPlaneConfig {
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(file) = file {
            figment = figment.merge(Toml::file(file));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn load(file: Option<&Path>) -> Result<Self> {
        let config: Self = Self::figment(file).extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sink_partition_size == 0 {
            return Err(Error::Config("sink_partition_size must be a positive integer".into()));
        }
        if self.data_type.trim().is_empty() {
            return Err(Error::Config("data_type must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = DataPlaneConfig::default();
        assert_eq!(config.sink_partition_size, 5);
        assert_eq!(config.data_type, "HttpDataAnonymize");
        assert!(config.anonymize.enabled);
        assert_eq!(config.anonymize.trustees, vec!["aggregationProvider".to_string()]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn loads_file_then_environment() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "dataplane.toml",
                r#"
                sink_partition_size = 8
                data_type = "HttpData"

                [anonymize]
                trustees = ["aggregationProvider", "cityArchive"]
                "#,
            )?;
            jail.set_env("DATAPLANE_SINK_PARTITION_SIZE", "3");
            jail.set_env("DATAPLANE_ANONYMIZE__ENABLED", "false");

            let config = DataPlaneConfig::load(Some(Path::new("dataplane.toml")))
                .map_err(|e| figment::Error::from(e.to_string()))?;
            assert_eq!(config.sink_partition_size, 3);
            assert_eq!(config.data_type, "HttpData");
            assert!(!config.anonymize.enabled);
            assert_eq!(config.anonymize.trustees.len(), 2);
            Ok(())
        });
    }

    #[test]
    fn rejects_zero_partition_size() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("DATAPLANE_SINK_PARTITION_SIZE", "0");
            let err = DataPlaneConfig::load(None).unwrap_err();
            assert!(err.is_config());
            Ok(())
        });
    }
}
