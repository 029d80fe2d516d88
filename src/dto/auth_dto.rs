use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::user::User;

// Request para registrar un usuario
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterUserRequest {
    #[validate(length(min = 3, max = 255, message = "El nombre debe tener entre 3 y 255 caracteres"))]
    pub name: String,
    #[validate(email(message = "E-mail inválido"))]
    pub email: String,
    #[validate(length(min = 6, message = "La contraseña debe tener al menos 6 caracteres"))]
    pub password: String,
}

// Login por nombre o e-mail
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Usuario requerido"))]
    pub login: String,
    #[validate(length(min = 1, message = "Contraseña requerida"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct CompanyRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: User,
    pub companies: Vec<CompanyRef>,
    pub token: String,
}

// Token con la empresa seleccionada
#[derive(Debug, Deserialize)]
pub struct CompanyAuthRequest {
    #[serde(alias = "empresaId")]
    pub company_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}
