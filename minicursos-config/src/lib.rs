use core::fmt::{Debug, Formatter};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;

pub const CONFIG_FILE: &str = "minicursos.toml";
pub const ENV_PREFIX: &str = "MINICURSOS_";

/// Cookie encryption needs at least this much key material.
pub const MIN_SECRET_KEY_LEN: usize = 32;

#[derive(Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_listen_address")]
    pub listen_address: SocketAddr,
    /// Without a database url the registrations are only kept in memory.
    #[serde(default)]
    pub database_url: Option<String>,
    pub admin_password: String,
    #[serde(default)]
    pub secret_key: Option<String>,
    /// Serve `/inscritos` without checking the admin session.
    #[serde(default)]
    pub public_listing: bool,
}

// don't leak the password or the key into logs
impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Config")
            .field("listen_address", &self.listen_address)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("admin_password", &"<redacted>")
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("public_listing", &self.public_listing)
            .finish()
    }
}

const fn default_listen_address() -> SocketAddr {
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 3000))
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("config error: {0}")]
    Figment(#[from] Box<figment::Error>),
    #[error("admin_password must not be empty")]
    EmptyAdminPassword,
    #[error("secret_key must be at least {MIN_SECRET_KEY_LEN} bytes long, got {0}")]
    SecretKeyTooShort(usize),
}

impl Config {
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.admin_password.is_empty() {
            return Err(ConfigError::EmptyAdminPassword);
        }
        if let Some(secret_key) = &self.secret_key {
            if secret_key.len() < MIN_SECRET_KEY_LEN {
                return Err(ConfigError::SecretKeyTooShort(secret_key.len()));
            }
        }
        Ok(self)
    }
}

#[must_use]
pub fn figment() -> Figment {
    Figment::new()
        .merge(Toml::file(CONFIG_FILE))
        .merge(Env::prefixed(ENV_PREFIX))
}

pub fn get_config() -> Result<Config, ConfigError> {
    figment()
        .extract::<Config>()
        .map_err(Box::new)?
        .validate()
}
