//! Servicio de notificaciones
//!
//! Persiste notificaciones in-app según las preferencias de la empresa.
//! Los errores se registran y nunca interrumpen la operación que notifica.

use serde_json::Value;
use sqlx::PgPool;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::models::notification::NotificationKind;
use crate::repositories::{
    company_repository::CompanyRepository, notification_repository::NotificationRepository,
};

/// Un tipo se emite salvo que esté desactivado; los borrados requieren opt-in
pub fn is_enabled(preferences: &Value, kind: NotificationKind) -> bool {
    match preferences.get(kind.preference_key()).and_then(Value::as_bool) {
        Some(flag) => flag,
        None => kind.enabled_by_default(),
    }
}

pub struct NotificationService {
    companies: CompanyRepository,
    notifications: NotificationRepository,
}

impl NotificationService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            companies: CompanyRepository::new(pool.clone()),
            notifications: NotificationRepository::new(pool),
        }
    }

    pub async fn notify(&self, company_id: Uuid, kind: NotificationKind, message: &str, link: Option<&str>) {
        let preferences = match self.companies.notification_preferences(company_id).await {
            Ok(Some(preferences)) => preferences,
            Ok(None) => {
                debug!("Empresa {} no encontrada para notificar", company_id);
                return;
            }
            Err(e) => {
                error!("❌ Error leyendo preferencias de notificación: {}", e);
                return;
            }
        };

        if !is_enabled(&preferences, kind) {
            debug!("Notificación {:?} desactivada para la empresa {}", kind, company_id);
            return;
        }

        match self.notifications.create(company_id, kind, message, link).await {
            Ok(_) => info!("🔔 Notificación creada para la empresa {}: {}", company_id, message),
            Err(e) => error!("❌ Error creando notificación: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_preferences_use_defaults() {
        let prefs = json!({});
        assert!(is_enabled(&prefs, NotificationKind::OrderCreated));
        assert!(is_enabled(&prefs, NotificationKind::AutoFinalization));
        assert!(!is_enabled(&prefs, NotificationKind::OrderDeleted));
    }

    #[test]
    fn explicit_flags_override_defaults() {
        let prefs = json!({"order_created": false, "order_deleted": true});
        assert!(!is_enabled(&prefs, NotificationKind::OrderCreated));
        assert!(is_enabled(&prefs, NotificationKind::OrderDeleted));
    }

    #[test]
    fn non_boolean_values_fall_back_to_default() {
        let prefs = json!({"order_updated": "no", "order_deleted": 1});
        assert!(is_enabled(&prefs, NotificationKind::OrderUpdated));
        assert!(!is_enabled(&prefs, NotificationKind::OrderDeleted));
    }
}
