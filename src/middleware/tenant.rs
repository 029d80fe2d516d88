//! Resolución de la empresa de cada request
//!
//! Toda ruta de datos de empresa pasa por aquí: token del usuario más
//! empresa en `x-empresa-id` (o en el token). La empresa debe existir,
//! estar activa y pertenecer al usuario.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::debug;
use uuid::Uuid;

use super::auth::bearer_claims;
use crate::{
    repositories::company_repository::CompanyRepository,
    state::AppState,
    utils::{errors::AppError, jwt::JwtClaims},
};

pub const COMPANY_HEADER: &str = "x-empresa-id";

/// Contexto de la request: empresa y usuario ya validados
#[derive(Debug, Clone, Copy)]
pub struct RequestContext {
    pub company_id: Uuid,
    pub user_id: Uuid,
}

/// Empresa pedida: header primero, claim del token después
pub fn requested_company(headers: &HeaderMap, claims: &JwtClaims) -> Result<Uuid, AppError> {
    match headers.get(COMPANY_HEADER) {
        Some(value) => value
            .to_str()
            .ok()
            .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
            .ok_or_else(|| AppError::Unauthorized("Header x-empresa-id inválido".to_string())),
        None => claims.company_id().ok_or_else(|| {
            AppError::Unauthorized("Empresa no informada en x-empresa-id".to_string())
        }),
    }
}

/// Middleware de multi-empresa
pub async fn tenant_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = bearer_claims(request.headers(), &state.jwt)?;
    let user_id = claims.user_id()?;
    let company_id = requested_company(request.headers(), &claims)?;

    CompanyRepository::new(state.pool.clone())
        .find_active_for_user(company_id, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Empresa no encontrada o inactiva".to_string()))?;

    debug!("Request de la empresa {} por el usuario {}", company_id, user_id);
    request
        .extensions_mut()
        .insert(RequestContext { company_id, user_id });

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn claims(company_id: Option<Uuid>) -> JwtClaims {
        JwtClaims {
            sub: Uuid::new_v4().to_string(),
            company_id: company_id.map(|id| id.to_string()),
            exp: 0,
            iat: 0,
        }
    }

    #[test]
    fn header_takes_precedence_over_token() {
        let from_header = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(COMPANY_HEADER, HeaderValue::from_str(&from_header.to_string()).unwrap());

        let resolved = requested_company(&headers, &claims(Some(Uuid::new_v4()))).unwrap();
        assert_eq!(resolved, from_header);
    }

    #[test]
    fn token_claim_is_the_fallback() {
        let from_token = Uuid::new_v4();
        let resolved = requested_company(&HeaderMap::new(), &claims(Some(from_token))).unwrap();
        assert_eq!(resolved, from_token);
    }

    #[test]
    fn missing_or_malformed_company_is_unauthorized() {
        let err = requested_company(&HeaderMap::new(), &claims(None)).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));

        let mut headers = HeaderMap::new();
        headers.insert(COMPANY_HEADER, HeaderValue::from_static("not-a-uuid"));
        assert!(matches!(
            requested_company(&headers, &claims(None)),
            Err(AppError::Unauthorized(_))
        ));
    }
}
