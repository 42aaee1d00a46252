use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::{
    dto::auth::Claims,
    error::{AppError, AppResult},
    state::AppState,
};

/// Signing material shared by the token issuer and the tenant resolver.
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtKeys {
    pub fn new(secret: &str, ttl_minutes: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    /// Mint a token carrying the user and the organization it belongs to.
    pub fn issue(&self, user_id: i32, organization_id: i32, email: &str) -> AppResult<String> {
        let expiration = Utc::now()
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

        let claims = Claims {
            sub: Some(email.to_string()),
            user_id: Some(user_id),
            org_id: Some(organization_id),
            exp: expiration.timestamp() as usize,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
    }
}

/// Identity of the authenticated caller. The organization id in here is the
/// only one tenant-scoped operations ever act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantContext {
    pub user_id: i32,
    pub organization_id: i32,
}

/// Verify `token` and pull the caller's identity out of it.
pub fn resolve(token: &str, keys: &JwtKeys) -> AppResult<TenantContext> {
    let decoded = decode::<Claims>(token, &keys.decoding, &Validation::new(Algorithm::HS256))
        .map_err(|err| {
            tracing::warn!(error = %err, "rejected token");
            AppError::Unauthorized
        })?;

    match (decoded.claims.user_id, decoded.claims.org_id) {
        (Some(user_id), Some(organization_id)) => Ok(TenantContext {
            user_id,
            organization_id,
        }),
        _ => {
            tracing::warn!("rejected token: user_id or org_id claim missing");
            Err(AppError::Unauthorized)
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> AppResult<&str> {
    let auth_str = headers
        .get(header::AUTHORIZATION)
        .ok_or(AppError::Unauthorized)?
        .to_str()
        .map_err(|_| AppError::Unauthorized)?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or(AppError::Unauthorized)?;
    if token.is_empty() {
        return Err(AppError::Unauthorized);
    }
    Ok(token)
}

impl FromRequestParts<AppState> for TenantContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(ctx) = parts.extensions.get::<TenantContext>() {
            return Ok(*ctx);
        }

        let ctx = resolve(bearer_token(&parts.headers)?, &state.keys)?;

        // Fields are declared empty on the request span by the trace layer.
        let span = tracing::Span::current();
        span.record("user_id", ctx.user_id);
        span.record("organization_id", ctx.organization_id);

        parts.extensions.insert(ctx);
        Ok(ctx)
    }
}
