use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::entities::user::Entity as UserEntity;

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => match header.strip_prefix("Bearer ") {
            Some(token) => token,
            None => return Err(StatusCode::UNAUTHORIZED),
        },
        _ => return Err(StatusCode::UNAUTHORIZED),
    };

    let claims = match validate_token(state.db.clone(), token, state.require_staff).await {
        Ok(claims) => claims,
        Err(AuthMiddlewareError::StaffRequired) => {
            return Err(StatusCode::FORBIDDEN);
        }
        Err(err) => {
            debug!("Rejected bearer token: {err}");
            return Err(StatusCode::UNAUTHORIZED);
        }
    };

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

//Verified identity carried into every handler behind the middleware.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i32,
    pub is_staff: bool,
    pub kind: TokenKind,
    pub exp: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Clone)]
pub struct AuthState {
    pub db: Arc<DatabaseConnection>,
    pub require_staff: bool,
}

#[derive(Clone, Debug)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

pub fn issue_token_pair(user_id: i32, is_staff: bool) -> Result<TokenPair, AuthMiddlewareError> {
    Ok(TokenPair {
        access: generate_token(user_id, is_staff, TokenKind::Access)?,
        refresh: generate_token(user_id, is_staff, TokenKind::Refresh)?,
    })
}

pub fn generate_token(
    user_id: i32,
    is_staff: bool,
    kind: TokenKind,
) -> Result<String, AuthMiddlewareError> {
    let lifetime = match kind {
        TokenKind::Access => Duration::hours(24),
        TokenKind::Refresh => Duration::days(7),
    };

    let exp = Utc::now()
        .checked_add_signed(lifetime)
        .ok_or(AuthMiddlewareError::GenerationFail)?
        .timestamp() as usize;

    let claims = Claims {
        user_id,
        is_staff,
        kind,
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(get_secret_key()?.as_bytes()),
    )
    .map_err(|_| AuthMiddlewareError::GenerationFail)
}

pub async fn validate_token(
    db: Arc<DatabaseConnection>,
    token: &str,
    require_staff: bool,
) -> Result<Claims, AuthMiddlewareError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(get_secret_key()?.as_bytes()),
        &validation,
    )
    .map_err(|_| AuthMiddlewareError::ValidationFail)?;

    let claims = token_data.claims;

    if claims.kind != TokenKind::Access {
        return Err(AuthMiddlewareError::NotAnAccessToken);
    }

    //Confirm against the database: the token may outlive the account or its
    //staff flag.
    match UserEntity::find_by_id(claims.user_id).one(&*db).await {
        Ok(Some(user)) => {
            if require_staff && !user.is_staff {
                return Err(AuthMiddlewareError::StaffRequired);
            }
            Ok(Claims {
                is_staff: user.is_staff,
                ..claims
            })
        }
        Ok(None) => Err(AuthMiddlewareError::UnknownUser),
        Err(_) => Err(AuthMiddlewareError::InternalServerError),
    }
}

#[derive(Error, Debug)]
pub enum AuthMiddlewareError {
    #[error("No such user")]
    UnknownUser,
    #[error("Staff privileges required")]
    StaffRequired,
    #[error("Refresh tokens cannot authenticate requests")]
    NotAnAccessToken,
    #[error("Failed to validate token")]
    ValidationFail,
    #[error("Failed to generate token")]
    GenerationFail,
    #[error("SECRET is not configured")]
    MissingSecret,
    #[error("Internal server error")]
    InternalServerError,
}

fn get_secret_key() -> Result<String, AuthMiddlewareError> {
    std::env::var("SECRET").map_err(|_| AuthMiddlewareError::MissingSecret)
}
