use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

use crate::utils::validation::validate_hour;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCompanyRequest {
    #[validate(length(min = 2, max = 255, message = "El nombre debe tener entre 2 y 255 caracteres"))]
    pub name: String,
    pub config: Option<Value>,
    #[validate(custom = "validate_hour")]
    pub opening_time: Option<String>,
    #[validate(custom = "validate_hour")]
    pub closing_time: Option<String>,
    #[serde(default)]
    pub auto_finalize: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCompanyRequest {
    #[validate(length(min = 2, max = 255, message = "El nombre debe tener entre 2 y 255 caracteres"))]
    pub name: Option<String>,
    pub config: Option<Value>,
    #[validate(custom = "validate_hour")]
    pub opening_time: Option<String>,
    #[validate(custom = "validate_hour")]
    pub closing_time: Option<String>,
    pub auto_finalize: Option<bool>,
    pub require_washer_to_finalize: Option<bool>,
    pub notification_preferences: Option<Value>,
}
