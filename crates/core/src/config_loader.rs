use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;

/// Environment variable prefix; nested keys use `__`, e.g. `MENTION_LAG_PATHS__MERGED_DIR`.
pub const ENV_PREFIX: &str = "MENTION_LAG_";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration by layering defaults, the TOML file at `path`, and
    /// `MENTION_LAG_*` environment variables, then validates the result.
    ///
    /// A missing TOML file is not an error; defaults and environment still apply.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidConfig` if the sources cannot be parsed or
    /// the merged configuration fails validation.
    pub fn load(path: impl AsRef<Path>) -> Result<AnalysisConfig, AnalysisError> {
        let config: AnalysisConfig = Self::figment(path.as_ref())
            .extract()
            .map_err(|e| AnalysisError::InvalidConfig(e.to_string()))?;

        config.validate()?;
        tracing::debug!(
            tickers = config.tickers.len(),
            start = %config.start_date,
            end = %config.end_date,
            "configuration loaded"
        );

        Ok(config)
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(AnalysisConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use figment::Jail;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        Jail::expect_with(|_jail| {
            let config = ConfigLoader::load("does-not-exist.toml")
                .map_err(|e| figment::Error::from(e.to_string()))?;
            assert_eq!(config, AnalysisConfig::default());
            Ok(())
        });
    }

    #[test]
    fn toml_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "Config.toml",
                r#"
                tickers = ["GME", "AMC"]
                start_date = "2021-01-01"
                end_date = "2021-03-31"
                alpha = 0.01

                [paths]
                merged_dir = "out/merged"
                "#,
            )?;

            let config = ConfigLoader::load("Config.toml")
                .map_err(|e| figment::Error::from(e.to_string()))?;
            assert_eq!(config.tickers, vec!["GME".to_string(), "AMC".to_string()]);
            assert_eq!(
                config.start_date,
                NaiveDate::from_ymd_opt(2021, 1, 1).unwrap()
            );
            assert!((config.alpha - 0.01).abs() < 1e-12);
            assert_eq!(config.paths.merged_dir, std::path::PathBuf::from("out/merged"));
            // Untouched nested keys keep their defaults
            assert_eq!(
                config.paths.raw_forum_dir,
                std::path::PathBuf::from("data/raw_wsb")
            );
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("Config.toml", "alpha = 0.01")?;
            jail.set_env("MENTION_LAG_ALPHA", "0.1");
            jail.set_env("MENTION_LAG_PATHS__MERGED_DIR", "env/merged");

            let config = ConfigLoader::load("Config.toml")
                .map_err(|e| figment::Error::from(e.to_string()))?;
            assert!((config.alpha - 0.1).abs() < 1e-12);
            assert_eq!(config.paths.merged_dir, std::path::PathBuf::from("env/merged"));
            Ok(())
        });
    }

    #[test]
    fn invalid_merged_config_is_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("Config.toml", "tickers = []")?;
            let result = ConfigLoader::load("Config.toml");
            assert!(matches!(result, Err(AnalysisError::InvalidConfig(_))));
            Ok(())
        });
    }
}
