use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::auth_dto::{CompanyAuthRequest, TokenResponse};
use crate::dto::common::ApiResponse;
use crate::dto::company_dto::{CreateCompanyRequest, UpdateCompanyRequest};
use crate::models::company::{
    default_config, default_notification_preferences, Company, CompanySummary,
    DEFAULT_VEHICLE_TYPES,
};
use crate::repositories::company_repository::{CompanyChanges, CompanyRepository};
use crate::repositories::vehicle_type_repository::VehicleTypeRepository;
use crate::utils::errors::AppError;
use crate::utils::jwt::{generate_token, JwtConfig};
use crate::utils::validation::clean_optional;

pub struct CompanyController {
    pool: PgPool,
    repository: CompanyRepository,
    jwt: JwtConfig,
}

impl CompanyController {
    pub fn new(pool: PgPool, jwt: JwtConfig) -> Self {
        Self {
            repository: CompanyRepository::new(pool.clone()),
            pool,
            jwt,
        }
    }

    /// Crea la empresa con sus tipos de vehículo por defecto
    pub async fn create(
        &self,
        user_id: Uuid,
        request: CreateCompanyRequest,
    ) -> Result<ApiResponse<Company>, AppError> {
        request.validate()?;

        let name = request.name.trim();
        if self.repository.name_exists_for_user(user_id, name, None).await? {
            return Err(AppError::BadRequest(
                "Ya tienes una empresa con este nombre".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let company = CompanyRepository::insert(
            &mut tx,
            user_id,
            name,
            merge_config(request.config),
            clean_optional(request.opening_time),
            clean_optional(request.closing_time),
            request.auto_finalize,
            default_notification_preferences(),
        )
        .await?;

        for (type_name, category) in DEFAULT_VEHICLE_TYPES {
            VehicleTypeRepository::insert(&mut tx, company.id, type_name, *category, None).await?;
        }

        tx.commit().await?;
        info!("🏢 Empresa creada: {} ({})", company.name, company.id);

        Ok(ApiResponse::success_with_message(
            company,
            "Empresa creada exitosamente",
        ))
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<CompanySummary>, AppError> {
        self.repository.list_for_user(user_id).await
    }

    pub async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Company, AppError> {
        self.owned(user_id, id).await
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        request: UpdateCompanyRequest,
    ) -> Result<ApiResponse<Company>, AppError> {
        request.validate()?;
        let current = self.owned(user_id, id).await?;

        let name = request.name.map(|n| n.trim().to_string());
        if let Some(name) = &name {
            if self.repository.name_exists_for_user(user_id, name, Some(id)).await? {
                return Err(AppError::BadRequest(
                    "Ya tienes una empresa con este nombre".to_string(),
                ));
            }
        }

        let changes = CompanyChanges {
            name,
            config: request.config,
            opening_time: clean_optional(request.opening_time),
            closing_time: clean_optional(request.closing_time),
            auto_finalize: request.auto_finalize,
            require_washer_to_finalize: request.require_washer_to_finalize,
            notification_preferences: request.notification_preferences,
        };

        let company = self.repository.update(current, changes).await?;
        Ok(ApiResponse::success_with_message(
            company,
            "Empresa actualizada exitosamente",
        ))
    }

    /// Activa o desactiva la empresa
    pub async fn toggle_status(&self, user_id: Uuid, id: Uuid) -> Result<ApiResponse<Company>, AppError> {
        let current = self.owned(user_id, id).await?;
        let company = self.repository.set_active(id, !current.active).await?;

        let message = if company.active {
            "Empresa activada"
        } else {
            "Empresa desactivada"
        };
        Ok(ApiResponse::success_with_message(company, message))
    }

    /// Token de sesión con la empresa seleccionada
    pub async fn authenticate(
        &self,
        user_id: Uuid,
        request: CompanyAuthRequest,
    ) -> Result<TokenResponse, AppError> {
        let company = self
            .repository
            .find_active_for_user(request.company_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Empresa no encontrada o inactiva".to_string()))?;

        let token = generate_token(user_id, Some(company.id), &self.jwt)?;
        Ok(TokenResponse { token })
    }

    async fn owned(&self, user_id: Uuid, id: Uuid) -> Result<Company, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .filter(|company| company.user_id == user_id)
            .ok_or_else(|| AppError::NotFound("Empresa no encontrada".to_string()))
    }
}

/// Configuración enviada sobre los valores por defecto
fn merge_config(config: Option<serde_json::Value>) -> serde_json::Value {
    let mut merged = default_config();
    if let (Some(base), Some(serde_json::Value::Object(extra))) = (merged.as_object_mut(), config) {
        base.extend(extra);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn config_overrides_keep_defaults() {
        let merged = merge_config(Some(json!({"utc_offset_minutes": -240})));
        assert_eq!(merged["utc_offset_minutes"], -240);
        assert_eq!(merged["currency"], "BRL");

        assert_eq!(merge_config(None), default_config());
        assert_eq!(merge_config(Some(json!("x"))), default_config());
    }
}
