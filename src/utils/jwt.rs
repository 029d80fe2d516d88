//! Utilidades JWT
//!
//! Tokens de sesión de usuario (opcionalmente con empresa seleccionada)
//! y tokens públicos de lavador para la página de consulta.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{config::environment::EnvironmentConfig, utils::errors::AppError};

/// Duración del enlace público del lavador
pub const WASHER_TOKEN_HOURS: i64 = 24;

/// Claims del token de sesión
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String, // user_id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    pub exp: usize,
    pub iat: usize,
}

impl JwtClaims {
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub).map_err(|_| AppError::Jwt("Token inválido".to_string()))
    }

    pub fn company_id(&self) -> Option<Uuid> {
        self.company_id
            .as_deref()
            .and_then(|id| Uuid::parse_str(id).ok())
    }
}

/// Claims del token público de un lavador
#[derive(Debug, Serialize, Deserialize)]
pub struct WasherClaims {
    pub washer_id: Uuid,
    pub company_id: Uuid,
    pub exp: usize,
    pub iat: usize,
}

/// Configuración de JWT
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration: u64,
}

impl From<&EnvironmentConfig> for JwtConfig {
    fn from(config: &EnvironmentConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            expiration: config.jwt_expiration,
        }
    }
}

/// Generar JWT token para un usuario, opcionalmente con empresa seleccionada
pub fn generate_token(
    user_id: Uuid,
    company_id: Option<Uuid>,
    config: &JwtConfig,
) -> Result<String, AppError> {
    let now = chrono::Utc::now();
    let expires_at = now + chrono::Duration::seconds(config.expiration as i64);

    let claims = JwtClaims {
        sub: user_id.to_string(),
        company_id: company_id.map(|id| id.to_string()),
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_ref()),
    )
    .map_err(|e| AppError::Internal(format!("Error generando token: {}", e)))
}

/// Verificar y decodificar JWT token
pub fn verify_token(token: &str, config: &JwtConfig) -> Result<JwtClaims, AppError> {
    let token_data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_ref()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Jwt("Token inválido o expirado".to_string()))?;

    Ok(token_data.claims)
}

/// Generar token público para un lavador (24h)
pub fn generate_washer_token(
    washer_id: Uuid,
    company_id: Uuid,
    config: &JwtConfig,
) -> Result<String, AppError> {
    let now = chrono::Utc::now();
    let claims = WasherClaims {
        washer_id,
        company_id,
        exp: (now + chrono::Duration::hours(WASHER_TOKEN_HOURS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_ref()),
    )
    .map_err(|e| AppError::Internal(format!("Error generando token público: {}", e)))
}

pub fn verify_washer_token(token: &str, config: &JwtConfig) -> Result<WasherClaims, AppError> {
    decode::<WasherClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_ref()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Jwt("Token inválido o expirado".to_string()))
}

/// Extraer token del header Authorization
pub fn extract_token_from_header(auth_header: &str) -> Result<&str, AppError> {
    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::Unauthorized("Token de autenticación no enviado o mal formado".to_string())
    })?;

    if token.trim().is_empty() {
        return Err(AppError::Unauthorized("Token no puede estar vacío".to_string()));
    }

    Ok(token.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".to_string(),
            expiration: 3600,
        }
    }

    #[test]
    fn session_token_round_trips_company_scope() {
        let user_id = Uuid::new_v4();
        let company_id = Uuid::new_v4();
        let token = generate_token(user_id, Some(company_id), &config()).unwrap();

        let claims = verify_token(&token, &config()).unwrap();
        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.company_id(), Some(company_id));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = generate_token(Uuid::new_v4(), None, &config()).unwrap();
        let other = JwtConfig {
            secret: "another".to_string(),
            expiration: 3600,
        };
        assert!(matches!(verify_token(&token, &other), Err(AppError::Jwt(_))));
    }

    #[test]
    fn washer_token_is_not_a_session_token() {
        let token = generate_washer_token(Uuid::new_v4(), Uuid::new_v4(), &config()).unwrap();
        assert!(verify_washer_token(&token, &config()).is_ok());
        assert!(verify_token(&token, &config()).is_err());
    }

    #[test]
    fn bearer_prefix_is_required() {
        assert_eq!(extract_token_from_header("Bearer abc.def.ghi").unwrap(), "abc.def.ghi");
        assert!(extract_token_from_header("Token abc").is_err());
        assert!(extract_token_from_header("Bearer ").is_err());
    }
}
