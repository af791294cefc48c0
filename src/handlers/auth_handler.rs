use actix_web::{post, web, HttpResponse};

use crate::app::AppState;
use crate::auth::verify_password;
use crate::message::AppError;
use crate::models::user::{AccessToken, LoginRequest, RefreshRequest, TokenType};

#[post("/token")]
pub async fn obtain_token(
    state: web::Data<AppState>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let LoginRequest { username, password } = payload.into_inner();

    let user = state
        .repo
        .find_user_by_username(&username)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(password, user.password_hash.clone()).await? {
        tracing::info!(user_id = user.id, "rejected login");
        return Err(AppError::InvalidCredentials);
    }

    let tokens = state.tokens.issue_pair(user.id)?;
    Ok(HttpResponse::Ok().json(tokens))
}

#[post("/token/refresh")]
pub async fn refresh_token(
    state: web::Data<AppState>,
    payload: web::Json<RefreshRequest>,
) -> Result<HttpResponse, AppError> {
    let claims = state.tokens.decode(&payload.refresh, TokenType::Refresh)?;

    if state.repo.find_user(claims.user_id).await?.is_none() {
        return Err(AppError::InvalidToken);
    }

    let access = state.tokens.issue(claims.user_id, TokenType::Access)?;
    Ok(HttpResponse::Ok().json(AccessToken { access }))
}
