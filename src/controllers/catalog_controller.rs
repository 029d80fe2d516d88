//! Servicios y adicionales
//!
//! El mismo controlador atiende ambos catálogos; `ItemKind` elige las tablas.

use std::collections::{HashMap, HashSet};

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::catalog_dto::{
    CatalogItemResponse, CreateCatalogItemRequest, PriceEntry, UpdateCatalogItemRequest,
};
use crate::dto::common::{ApiResponse, PageQuery, Paginated};
use crate::models::catalog::{CatalogItem, CatalogPrice};
use crate::models::order::ItemKind;
use crate::repositories::{
    catalog_repository::CatalogRepository, vehicle_type_repository::VehicleTypeRepository,
};
use crate::utils::errors::AppError;
use crate::utils::validation::clean_optional;

pub struct CatalogController {
    pool: PgPool,
    kind: ItemKind,
    repository: CatalogRepository,
    vehicle_types: VehicleTypeRepository,
}

impl CatalogController {
    pub fn new(pool: PgPool, kind: ItemKind) -> Self {
        Self {
            repository: CatalogRepository::new(pool.clone(), kind),
            vehicle_types: VehicleTypeRepository::new(pool.clone()),
            pool,
            kind,
        }
    }

    pub async fn create(
        &self,
        company_id: Uuid,
        request: CreateCatalogItemRequest,
    ) -> Result<ApiResponse<CatalogItemResponse>, AppError> {
        request.validate()?;

        if request.price.is_none() && request.prices.is_empty() {
            return Err(missing_price());
        }
        self.ensure_vehicle_types(company_id, &request.prices).await?;

        let mut tx = self.pool.begin().await?;
        let item = CatalogRepository::insert(
            &mut tx,
            self.kind,
            company_id,
            request.name.trim(),
            clean_optional(request.description).as_deref(),
            request.duration_minutes,
            request.price.map(|p| p.round_dp(2)),
        )
        .await?;
        CatalogRepository::replace_prices(&mut tx, self.kind, item.id, &request.prices).await?;
        let prices = CatalogRepository::prices_in(&mut tx, self.kind, &[item.id]).await?;
        tx.commit().await?;

        Ok(ApiResponse::success_with_message(
            CatalogItemResponse {
                item,
                prices,
                usage_count: Some(0),
            },
            format!("{} creado exitosamente", self.kind.label()),
        ))
    }

    pub async fn list(
        &self,
        company_id: Uuid,
        query: PageQuery,
    ) -> Result<Paginated<CatalogItemResponse>, AppError> {
        let (items, total) = self.repository.list(company_id, &query).await?;
        let responses = self.with_prices(items).await?;

        Ok(Paginated::new(responses, &query, total))
    }

    /// Ítems activos, para selectores
    pub async fn list_active(&self, company_id: Uuid) -> Result<Vec<CatalogItemResponse>, AppError> {
        let items = self.repository.list_active(company_id).await?;
        self.with_prices(items).await
    }

    pub async fn get(&self, company_id: Uuid, id: Uuid) -> Result<CatalogItemResponse, AppError> {
        let item = self.find(company_id, id).await?;
        let mut responses = self.with_prices(vec![item]).await?;

        responses.pop().ok_or_else(|| self.not_found())
    }

    pub async fn update(
        &self,
        company_id: Uuid,
        id: Uuid,
        request: UpdateCatalogItemRequest,
    ) -> Result<ApiResponse<CatalogItemResponse>, AppError> {
        request.validate()?;
        if let Some(prices) = &request.prices {
            for entry in prices {
                entry.validate()?;
            }
            self.ensure_vehicle_types(company_id, prices).await?;
        }

        let current = self.find(company_id, id).await?;

        // Debe quedar al menos una fuente de precio
        let has_flat = request.price.or(current.price).is_some();
        let has_table = match &request.prices {
            Some(prices) => !prices.is_empty(),
            None => !self.repository.prices_for(&[id]).await?.is_empty(),
        };
        if !has_flat && !has_table {
            return Err(missing_price());
        }

        let mut tx = self.pool.begin().await?;
        let item = CatalogRepository::update(
            &mut tx,
            self.kind,
            current,
            request.name.map(|n| n.trim().to_string()),
            clean_optional(request.description),
            request.duration_minutes,
            request.price.map(|p| p.round_dp(2)),
            request.active,
        )
        .await?;
        if let Some(prices) = &request.prices {
            CatalogRepository::replace_prices(&mut tx, self.kind, item.id, prices).await?;
        }
        tx.commit().await?;

        let mut responses = self.with_prices(vec![item]).await?;
        let response = responses.pop().ok_or_else(|| self.not_found())?;

        Ok(ApiResponse::success_with_message(
            response,
            format!("{} actualizado exitosamente", self.kind.label()),
        ))
    }

    pub async fn delete(&self, company_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let item = self.find(company_id, id).await?;

        ensure_item_deletable(self.kind, self.repository.is_referenced(item.id).await?)?;

        self.repository.delete(item.id).await
    }

    async fn find(&self, company_id: Uuid, id: Uuid) -> Result<CatalogItem, AppError> {
        self.repository
            .find_by_id(company_id, id)
            .await?
            .ok_or_else(|| self.not_found())
    }

    fn not_found(&self) -> AppError {
        AppError::NotFound(format!("{} no encontrado", self.kind.label()))
    }

    /// Los tipos de vehículo deben ser de la empresa y no repetirse
    async fn ensure_vehicle_types(&self, company_id: Uuid, prices: &[PriceEntry]) -> Result<(), AppError> {
        if prices.is_empty() {
            return Ok(());
        }

        let ids: HashSet<Uuid> = prices.iter().map(|p| p.vehicle_type_id).collect();
        if ids.len() != prices.len() {
            return Err(AppError::BadRequest(
                "Tipo de vehículo repetido en la tabla de precios".to_string(),
            ));
        }

        let ids: Vec<Uuid> = ids.into_iter().collect();
        if self.vehicle_types.count_owned(company_id, &ids).await? != ids.len() as i64 {
            return Err(AppError::BadRequest(
                "Tipo de vehículo inválido en la tabla de precios".to_string(),
            ));
        }
        Ok(())
    }

    async fn with_prices(&self, items: Vec<CatalogItem>) -> Result<Vec<CatalogItemResponse>, AppError> {
        let ids: Vec<Uuid> = items.iter().map(|item| item.id).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut prices = group_prices(self.repository.prices_for(&ids).await?);
        let usage: HashMap<Uuid, i64> = self.repository.usage_counts(&ids).await?.into_iter().collect();

        Ok(items
            .into_iter()
            .map(|item| CatalogItemResponse {
                prices: prices.remove(&item.id).unwrap_or_default(),
                usage_count: Some(usage.get(&item.id).copied().unwrap_or(0)),
                item,
            })
            .collect())
    }
}

fn missing_price() -> AppError {
    AppError::BadRequest("Informe un precio base o una tabla de precios".to_string())
}

fn group_prices(prices: Vec<CatalogPrice>) -> HashMap<Uuid, Vec<CatalogPrice>> {
    let mut grouped: HashMap<Uuid, Vec<CatalogPrice>> = HashMap::new();
    for price in prices {
        grouped.entry(price.item_id).or_default().push(price);
    }
    grouped
}

pub fn ensure_item_deletable(kind: ItemKind, referenced: bool) -> Result<(), AppError> {
    if referenced {
        return Err(AppError::BadRequest(format!(
            "{} en uso por órdenes de servicio",
            kind.label()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn referenced_items_cannot_be_deleted() {
        for kind in [ItemKind::Service, ItemKind::Addon] {
            let err = ensure_item_deletable(kind, true).unwrap_err();
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
            assert!(ensure_item_deletable(kind, false).is_ok());
        }
    }
}
