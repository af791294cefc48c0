use actix_web::{delete, get, patch, post, put, web, HttpResponse};

use crate::app::AppState;
use crate::auth::{hash_password, AuthenticatedUser};
use crate::message::{AppError, FileType};
use crate::models::user::{NewUser, UserChanges, UserCreateRequest, UserResponse, UserUpdateRequest};

#[post("/users")]
pub async fn register(
    state: web::Data<AppState>,
    payload: web::Json<UserCreateRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate()?;
    let UserCreateRequest { username, email, password, .. } = payload.into_inner();

    let password_hash = hash_password(password, state.bcrypt_cost).await?;
    let user = state
        .repo
        .create_user(NewUser { username, email, password_hash })
        .await?;

    tracing::info!(user_id = user.id, "registered user");
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// Only the caller is ever listed.
#[get("/users")]
pub async fn list_users(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let users: Vec<UserResponse> = state
        .repo
        .find_user(auth.user_id)
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(users))
}

#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = own_user_id(&auth, path.into_inner())?;

    let user = state
        .repo
        .find_user(id)
        .await?
        .ok_or(AppError::NotFound(FileType::User))?;

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i32>,
    payload: web::Json<UserUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    apply_update(&state, &auth, path.into_inner(), payload.into_inner(), true).await
}

#[patch("/users/{id}")]
pub async fn patch_user(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i32>,
    payload: web::Json<UserUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    apply_update(&state, &auth, path.into_inner(), payload.into_inner(), false).await
}

#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = own_user_id(&auth, path.into_inner())?;

    let images = state
        .repo
        .delete_user(id)
        .await?
        .ok_or(AppError::NotFound(FileType::User))?;
    state.media.delete_all(&images).await;

    tracing::info!(user_id = id, photos = images.len(), "deleted user");
    Ok(HttpResponse::NoContent().finish())
}

async fn apply_update(
    state: &AppState,
    auth: &AuthenticatedUser,
    id: i32,
    payload: UserUpdateRequest,
    full: bool,
) -> Result<HttpResponse, AppError> {
    let id = own_user_id(auth, id)?;
    payload.validate(full)?;

    let password_hash = match payload.password {
        Some(password) => Some(hash_password(password, state.bcrypt_cost).await?),
        None => None,
    };
    let changes = UserChanges {
        username: payload.username,
        email: payload.email,
        password_hash,
    };

    let user = state
        .repo
        .update_user(id, changes)
        .await?
        .ok_or(AppError::NotFound(FileType::User))?;

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// Other users are invisible: any id but the caller's is a 404.
fn own_user_id(auth: &AuthenticatedUser, id: i32) -> Result<i32, AppError> {
    if id == auth.user_id {
        Ok(id)
    } else {
        Err(AppError::NotFound(FileType::User))
    }
}
