use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;

/// Server configuration, merged from `clave.toml` and `CLAVE_`-prefixed
/// environment variables. Every field has a default so the server starts
/// with no configuration at all.
#[derive(Deserialize, Debug, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Default materialization window, in weeks.
    #[serde(default = "default_lookahead_weeks")]
    pub lookahead_weeks: u32,
}

fn default_database_path() -> String {
    "clave.db".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_lookahead_weeks() -> u32 {
    4
}

impl ServerConfig {
    pub fn new() -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Toml::file("clave.toml"))
            .merge(Env::prefixed("CLAVE_"))
            .extract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_configuration() {
        figment::Jail::expect_with(|_jail| {
            let config = ServerConfig::new()?;
            assert_eq!(config.database_path, "clave.db");
            assert_eq!(config.host, "127.0.0.1");
            assert_eq!(config.port, 3000);
            assert_eq!(config.lookahead_weeks, 4);
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("CLAVE_PORT", "8080");
            jail.set_env("CLAVE_LOOKAHEAD_WEEKS", "8");
            let config = ServerConfig::new()?;
            assert_eq!(config.port, 8080);
            assert_eq!(config.lookahead_weeks, 8);
            Ok(())
        });
    }
}
