use bcrypt::{hash, verify, DEFAULT_COST};
use sqlx::PgPool;
use tracing::info;
use validator::Validate;

use crate::dto::auth_dto::{CompanyRef, LoginRequest, LoginResponse, RegisterUserRequest};
use crate::dto::common::ApiResponse;
use crate::models::user::User;
use crate::repositories::{company_repository::CompanyRepository, user_repository::UserRepository};
use crate::utils::errors::AppError;
use crate::utils::jwt::{generate_token, JwtConfig};

pub struct UserController {
    repository: UserRepository,
    companies: CompanyRepository,
    jwt: JwtConfig,
}

impl UserController {
    pub fn new(pool: PgPool, jwt: JwtConfig) -> Self {
        Self {
            repository: UserRepository::new(pool.clone()),
            companies: CompanyRepository::new(pool),
            jwt,
        }
    }

    pub async fn register(&self, request: RegisterUserRequest) -> Result<ApiResponse<User>, AppError> {
        request.validate()?;

        let name = request.name.trim();
        let email = request.email.trim().to_lowercase();

        if self.repository.name_or_email_exists(name, &email).await? {
            return Err(AppError::BadRequest("Usuario o e-mail ya registrado".to_string()));
        }

        // Hash de la contraseña
        let password_hash = hash(&request.password, DEFAULT_COST)
            .map_err(|e| AppError::Hash(format!("Error hashing password: {}", e)))?;

        let user = self.repository.create(name, &email, &password_hash).await?;
        info!("👤 Usuario registrado: {}", user.name);

        Ok(ApiResponse::success_with_message(
            user,
            "Usuario registrado exitosamente",
        ))
    }

    /// Login por nombre o e-mail
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AppError> {
        request.validate()?;

        let user = self
            .repository
            .find_by_login(request.login.trim())
            .await?
            .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_string()))?;

        let valid = verify(&request.password, &user.password_hash)
            .map_err(|e| AppError::Hash(format!("Error verifying password: {}", e)))?;

        if !valid {
            return Err(AppError::Unauthorized("Contraseña incorrecta".to_string()));
        }

        let companies = self
            .companies
            .refs_for_user(user.id)
            .await?
            .into_iter()
            .map(|(id, name)| CompanyRef { id, name })
            .collect();

        let token = generate_token(user.id, None, &self.jwt)?;

        Ok(LoginResponse {
            user,
            companies,
            token,
        })
    }
}
