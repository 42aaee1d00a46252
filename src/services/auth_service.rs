use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use password_hash::rand_core::OsRng;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::{
    dto::auth::{LoginRequest, TokenResponse},
    entity::users::{Column as UserCol, Entity as Users},
    error::{AppError, AppResult},
    middleware::auth::JwtKeys,
    response::{ApiResponse, Meta},
};

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();
    Ok(hash)
}

fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Exchange email and password for a token scoped to the user's organization.
pub async fn login_user(
    db: &DatabaseConnection,
    keys: &JwtKeys,
    payload: LoginRequest,
) -> AppResult<ApiResponse<TokenResponse>> {
    let LoginRequest { email, password } = payload;
    let user = Users::find()
        .filter(UserCol::Email.eq(email.trim()))
        .one(db)
        .await?;

    let user = match user {
        Some(u) if verify_password(&password, &u.password_hash)? => u,
        _ => {
            tracing::warn!(email = %email, "login failed");
            return Err(AppError::Unauthorized);
        }
    };

    let access_token = keys.issue(user.id, user.organization_id, &user.email)?;
    tracing::info!(
        user_id = user.id,
        organization_id = user.organization_id,
        "user logged in"
    );

    Ok(ApiResponse::success(
        "Logged in",
        TokenResponse {
            access_token,
            token_type: "bearer".to_string(),
        },
        Some(Meta::empty()),
    ))
}
