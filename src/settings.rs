use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct Server {
    pub bind: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Postgres {
    pub url: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Voice {
    pub url: String,
    pub api_key: String,
    pub model: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SeedAdmin {
    pub name: String,
    pub email: String,
    pub password: String,
    pub company: String,
    pub phone: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub postgres: Postgres,
    pub voice: Voice,
    pub seed_admin: SeedAdmin,
}

impl Settings {
    pub fn new(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("CMV").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
