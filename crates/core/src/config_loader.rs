use crate::config::AppConfig;
use crate::error::ConfigError;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

/// Raw environment variables that carry database credentials.
const DATABASE_ENV_VARS: [&str; 5] = ["DB_USER", "DB_PASSWORD", "DB_NAME", "DB_HOST", "DB_PORT"];

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads application configuration by layering defaults, a TOML file,
    /// `CPA_SYNC_` prefixed variables and the `DB_*` variables.
    ///
    /// A missing TOML file is not an error; defaults apply.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed or a value has the wrong type.
    pub fn load(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
        let config: AppConfig = Self::figment(path.as_ref()).extract()?;
        Ok(config)
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("CPA_SYNC_").split("__"))
            .merge(
                Env::raw()
                    .only(&DATABASE_ENV_VARS)
                    .map(|key| format!("database.{}", &key.as_str()["DB_".len()..]).into()),
            )
    }
}
