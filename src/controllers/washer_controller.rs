use chrono::{Duration, Utc};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::common::{ApiResponse, PageQuery, Paginated};
use crate::dto::washer_dto::{
    CreateWasherRequest, UpdateWasherRequest, WasherPublicRequest, WasherPublicResponse,
    WasherTokenResponse,
};
use crate::models::washer::{Washer, WasherWithStats};
use crate::repositories::{order_repository::OrderRepository, washer_repository::WasherRepository};
use crate::utils::errors::AppError;
use crate::utils::jwt::{generate_washer_token, verify_washer_token, JwtConfig, WASHER_TOKEN_HOURS};

/// Días de historial en la página pública del lavador
const PUBLIC_HISTORY_DAYS: i64 = 30;

pub struct WasherController {
    repository: WasherRepository,
    orders: OrderRepository,
}

impl WasherController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: WasherRepository::new(pool.clone()),
            orders: OrderRepository::new(pool),
        }
    }

    pub async fn create(
        &self,
        company_id: Uuid,
        request: CreateWasherRequest,
    ) -> Result<ApiResponse<Washer>, AppError> {
        request.validate()?;

        let washer = self
            .repository
            .create(company_id, request.name.trim(), request.commission.round_dp(2))
            .await?;

        Ok(ApiResponse::success_with_message(
            washer,
            "Lavador creado exitosamente",
        ))
    }

    pub async fn list(
        &self,
        company_id: Uuid,
        query: PageQuery,
    ) -> Result<Paginated<WasherWithStats>, AppError> {
        let (washers, total) = self.repository.list(company_id, &query).await?;
        Ok(Paginated::new(washers, &query, total))
    }

    /// Lavadores activos, para selectores
    pub async fn list_active(&self, company_id: Uuid) -> Result<Vec<Washer>, AppError> {
        self.repository.list_active(company_id).await
    }

    pub async fn get(&self, company_id: Uuid, id: Uuid) -> Result<Washer, AppError> {
        self.repository
            .find_by_id(company_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Lavador no encontrado".to_string()))
    }

    pub async fn update(
        &self,
        company_id: Uuid,
        id: Uuid,
        request: UpdateWasherRequest,
    ) -> Result<ApiResponse<Washer>, AppError> {
        request.validate()?;
        let current = self.get(company_id, id).await?;

        let washer = self
            .repository
            .update(
                current,
                request.name.map(|n| n.trim().to_string()),
                request.commission.map(|c| c.round_dp(2)),
                request.active,
            )
            .await?;

        Ok(ApiResponse::success_with_message(
            washer,
            "Lavador actualizado exitosamente",
        ))
    }

    pub async fn toggle(&self, company_id: Uuid, id: Uuid) -> Result<ApiResponse<Washer>, AppError> {
        let current = self.get(company_id, id).await?;
        let active = !current.active;
        let washer = self.repository.update(current, None, None, Some(active)).await?;

        let message = if washer.active {
            "Lavador activado"
        } else {
            "Lavador desactivado"
        };
        Ok(ApiResponse::success_with_message(washer, message))
    }

    pub async fn delete(&self, company_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let washer = self.get(company_id, id).await?;

        ensure_washer_deletable(self.repository.has_orders(washer.id).await?)?;

        self.repository.delete(washer.id).await
    }

    /// Enlace público de consulta para el lavador
    pub async fn public_token(
        &self,
        company_id: Uuid,
        id: Uuid,
        jwt: &JwtConfig,
    ) -> Result<WasherTokenResponse, AppError> {
        let washer = self.get(company_id, id).await?;
        let token = generate_washer_token(washer.id, company_id, jwt)?;
        info!("🔗 Token público generado para el lavador {}", washer.id);

        Ok(WasherTokenResponse {
            token,
            expires_in_hours: WASHER_TOKEN_HOURS,
        })
    }

    /// Órdenes recientes del lavador a partir de su token público
    pub async fn public_view(
        &self,
        request: WasherPublicRequest,
        jwt: &JwtConfig,
    ) -> Result<WasherPublicResponse, AppError> {
        let claims = verify_washer_token(&request.token, jwt)?;

        let washer = self
            .repository
            .find_by_id(claims.company_id, claims.washer_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Lavador no encontrado".to_string()))?;

        let since = Utc::now() - Duration::days(PUBLIC_HISTORY_DAYS);
        let orders = self
            .orders
            .rows_for_washer(claims.company_id, washer.id, since)
            .await?;

        Ok(WasherPublicResponse {
            name: washer.name,
            commission: washer.commission,
            orders,
        })
    }
}

/// Un lavador con órdenes no se borra; se desactiva
pub fn ensure_washer_deletable(has_orders: bool) -> Result<(), AppError> {
    if has_orders {
        return Err(AppError::BadRequest(
            "El lavador tiene órdenes de servicio asociadas".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn washer_with_orders_cannot_be_deleted() {
        let err = ensure_washer_deletable(true).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(ensure_washer_deletable(false).is_ok());
    }
}
