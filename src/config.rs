//! Configuration lue dans l'environnement (et le fichier `.env`)

use std::path::PathBuf;

use thiserror::Error;
use url::Url;

use crate::consts::{DEFAULT_API_URL, DEFAULT_LOG_FILE, DEFAULT_SESSION_FILE};

pub const API_URL_VAR: &str = "MEDIRDV_API_URL";
pub const SESSION_FILE_VAR: &str = "MEDIRDV_SESSION_FILE";
pub const LOG_FILE_VAR: &str = "MEDIRDV_LOG_FILE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid MEDIRDV_API_URL '{value}': {source}")]
    InvalidApiUrl {
        value: String,
        source: url::ParseError,
    },
    #[error("MEDIRDV_API_URL must be an http(s) URL, got '{0}'")]
    UnsupportedScheme(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// URL de base de l'API, toujours terminée par `/`
    pub api_url: Url,
    pub session_file: PathBuf,
    pub log_file: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = lookup(API_URL_VAR).unwrap_or_else(|| DEFAULT_API_URL.to_owned());

        // Sans `/` final, `Url::join` remplacerait le dernier segment
        let with_slash = if raw_url.ends_with('/') {
            raw_url.clone()
        } else {
            format!("{raw_url}/")
        };
        let api_url = Url::parse(&with_slash).map_err(|source| ConfigError::InvalidApiUrl {
            value: raw_url.clone(),
            source,
        })?;
        if !matches!(api_url.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(raw_url));
        }

        Ok(Self {
            api_url,
            session_file: lookup(SESSION_FILE_VAR)
                .unwrap_or_else(|| DEFAULT_SESSION_FILE.to_owned())
                .into(),
            log_file: lookup(LOG_FILE_VAR)
                .unwrap_or_else(|| DEFAULT_LOG_FILE.to_owned())
                .into(),
        })
    }
}
