use crate::config::AppConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};
use std::path::Path;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Environment prefix; nested keys use `__`, e.g. `REGIME_ODDS_ENGINE__SEED`.
    pub const ENV_PREFIX: &'static str = "REGIME_ODDS_";

    fn base() -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
    }

    /// Loads application configuration by merging defaults, TOML, environment variables, and JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed.
    pub fn load() -> Result<AppConfig> {
        let config: AppConfig = Self::base()
            .merge(Toml::file("config/Config.toml"))
            .merge(Env::prefixed(Self::ENV_PREFIX).split("__"))
            .join(Json::file("config/Config.json"))
            .extract()?;

        Ok(config)
    }

    /// Loads application configuration with a specific profile.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed.
    pub fn load_with_profile(profile: &str) -> Result<AppConfig> {
        let config: AppConfig = Self::base()
            .merge(Toml::file("config/Config.toml"))
            .merge(Toml::file(format!("config/Config.{profile}.toml")))
            .merge(Env::prefixed(Self::ENV_PREFIX).split("__"))
            .join(Json::file("config/Config.json"))
            .extract()?;

        Ok(config)
    }

    /// Loads configuration from an explicit TOML file, still honouring env overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed.
    pub fn load_from(path: impl AsRef<Path>) -> Result<AppConfig> {
        let config: AppConfig = Self::base()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(Self::ENV_PREFIX).split("__"))
            .extract()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_files_yield_defaults() {
        figment::Jail::expect_with(|_jail| {
            let config = ConfigLoader::load().expect("defaults");
            assert_eq!(config.engine.seed, 42);
            assert_eq!(config.venue.quote_timeout_secs, 5);
            Ok(())
        });
    }

    #[test]
    fn toml_and_env_layers_override_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_dir("config")?;
            jail.create_file(
                "config/Config.toml",
                r#"
                [engine]
                seed = 7

                [qualification]
                min_edge_ratio = 2.0
                "#,
            )?;
            jail.set_env("REGIME_ODDS_HISTORY__MIN_OBSERVATIONS", "500");

            let config = ConfigLoader::load().expect("layered config");
            assert_eq!(config.engine.seed, 7);
            assert_eq!(config.qualification.min_edge_ratio, 2.0);
            assert_eq!(config.qualification.max_entry_price, 0.989);
            assert_eq!(config.history.min_observations, 500);
            Ok(())
        });
    }

    #[test]
    fn profile_file_is_layered_on_top() {
        figment::Jail::expect_with(|jail| {
            jail.create_dir("config")?;
            jail.create_file("config/Config.toml", "[engine]\nseed = 1\n")?;
            jail.create_file("config/Config.fast.toml", "[engine]\nseed = 2\n")?;

            let config = ConfigLoader::load_with_profile("fast").expect("profile config");
            assert_eq!(config.engine.seed, 2);
            Ok(())
        });
    }
}
