//! Middleware de autenticación JWT
//!
//! Valida el token Bearer del usuario e inyecta `AuthUser` en las
//! extensions de la request.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{
    state::AppState,
    utils::{
        errors::AppError,
        jwt::{extract_token_from_header, verify_token, JwtClaims, JwtConfig},
    },
};

/// Usuario autenticado que se inyecta en las requests
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
    /// Empresa seleccionada en el token, si la hay
    pub company_id: Option<Uuid>,
}

/// Decodificar las claims del header Authorization
pub fn bearer_claims(headers: &HeaderMap, config: &JwtConfig) -> Result<JwtClaims, AppError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Token de autorización requerido".to_string()))?;

    let token = extract_token_from_header(auth_header)?;
    verify_token(token, config)
}

/// Middleware de autenticación de usuario
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = bearer_claims(request.headers(), &state.jwt)?;

    let user = AuthUser {
        user_id: claims.user_id()?,
        company_id: claims.company_id(),
    };
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::jwt::generate_token;
    use axum::http::HeaderValue;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "secret".into(),
            expiration: 60,
        }
    }

    #[test]
    fn missing_header_is_unauthorized() {
        let err = bearer_claims(&HeaderMap::new(), &config()).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn valid_bearer_yields_claims() {
        let user_id = Uuid::new_v4();
        let token = generate_token(user_id, None, &config()).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );

        let claims = bearer_claims(&headers, &config()).unwrap();
        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.company_id(), None);
    }
}
