//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.

use anyhow::{Context, Result};
use std::env;

/// Intervalo por defecto del barrido de finalización (15 minutos)
const DEFAULT_FINALIZATION_INTERVAL_SECS: u64 = 900;
/// Desfase por defecto para empresas sin configuración (America/Sao_Paulo)
const DEFAULT_UTC_OFFSET_MINUTES: i32 = -180;

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub cors_origins: Vec<String>,
    pub finalization_interval_secs: u64,
    pub default_utc_offset_minutes: i32,
}

impl EnvironmentConfig {
    /// Leer la configuración desde variables de entorno
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            port: parse_or("PORT", 3000)?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_expiration: parse_or("JWT_EXPIRATION", 86_400)?,
            cors_origins: env::var("CORS_ORIGINS")
                .map(|origins| parse_origins(&origins))
                .unwrap_or_default(),
            finalization_interval_secs: parse_or(
                "FINALIZATION_INTERVAL_SECS",
                DEFAULT_FINALIZATION_INTERVAL_SECS,
            )?,
            default_utc_offset_minutes: parse_or(
                "DEFAULT_UTC_OFFSET_MINUTES",
                DEFAULT_UTC_OFFSET_MINUTES,
            )?,
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Obtener la URL del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number", key)),
        Err(_) => Ok(default),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_trimmed_and_blank_entries_dropped() {
        let origins = parse_origins(" http://a.com, ,http://b.com ");
        assert_eq!(origins, vec!["http://a.com", "http://b.com"]);
    }

    #[test]
    fn server_url_joins_host_and_port() {
        let config = EnvironmentConfig {
            environment: "test".into(),
            port: 8080,
            host: "127.0.0.1".into(),
            jwt_secret: "s".into(),
            jwt_expiration: 60,
            cors_origins: vec![],
            finalization_interval_secs: 900,
            default_utc_offset_minutes: -180,
        };
        assert_eq!(config.server_url(), "127.0.0.1:8080");
        assert!(!config.is_development());
    }
}
