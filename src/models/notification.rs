//! Modelo de Notification

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    OrderCreated,
    OrderUpdated,
    OrderDeleted,
    AutoFinalization,
}

impl NotificationKind {
    /// Clave en `notification_preferences` de la empresa
    pub fn preference_key(self) -> &'static str {
        match self {
            NotificationKind::OrderCreated => "order_created",
            NotificationKind::OrderUpdated => "order_updated",
            NotificationKind::OrderDeleted => "order_deleted",
            NotificationKind::AutoFinalization => "auto_finalization",
        }
    }

    /// Los borrados son opt-in, el resto se emite salvo que se desactive
    pub fn enabled_by_default(self) -> bool {
        !matches!(self, NotificationKind::OrderDeleted)
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub company_id: Uuid,
    pub message: String,
    pub kind: NotificationKind,
    pub link: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
