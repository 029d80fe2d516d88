use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::notification_dto::NotificationList;
use crate::models::notification::Notification;
use crate::repositories::notification_repository::NotificationRepository;
use crate::utils::errors::AppError;

pub struct NotificationController {
    repository: NotificationRepository,
}

impl NotificationController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: NotificationRepository::new(pool),
        }
    }

    /// Últimas notificaciones y cantidad sin leer
    pub async fn list(&self, company_id: Uuid) -> Result<NotificationList, AppError> {
        let notifications = self.repository.list_recent(company_id).await?;
        let unread_count = self.repository.unread_count(company_id).await?;

        Ok(NotificationList {
            notifications,
            unread_count,
        })
    }

    pub async fn mark_read(&self, company_id: Uuid, id: Uuid) -> Result<Notification, AppError> {
        self.repository
            .mark_read(company_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Notificación no encontrada".to_string()))
    }

    pub async fn mark_all_read(&self, company_id: Uuid) -> Result<u64, AppError> {
        self.repository.mark_all_read(company_id).await
    }
}
