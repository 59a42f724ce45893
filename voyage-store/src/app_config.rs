use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub gateway: GatewayConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 { 5 }

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    /// Name of the environment variable holding the gateway secret. The value
    /// itself is read on every call, never stored in config.
    #[serde(default = "default_secret_key_env")]
    pub secret_key_env: String,
    pub callback_url: String,
    pub payer_email: String,
    #[serde(default = "default_currency")]
    pub default_currency: String,
}

fn default_secret_key_env() -> String { "CHAPA_SECRET_KEY".to_string() }

fn default_currency() -> String { "ETB".to_string() }

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Untracked local overrides
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `VOYAGE__SERVER__PORT=9000`
            .add_source(config::Environment::with_prefix("VOYAGE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_defaults_apply() {
        let raw = r#"
            [server]
            port = 9000
            [database]
            url = "postgres://localhost/test"
            [auth]
            jwt_secret = "s"
            jwt_expiration_seconds = 60
            [gateway]
            base_url = "http://gateway"
            callback_url = "http://cb/"
            payer_email = "a@b.c"
        "#;
        let cfg: Config = config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.database.max_connections, 5);
        assert_eq!(cfg.gateway.secret_key_env, "CHAPA_SECRET_KEY");
        assert_eq!(cfg.gateway.default_currency, "ETB");
    }
}
