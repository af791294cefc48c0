use actix_web::{delete, get, patch, post, put, web, HttpResponse};

use crate::app::AppState;
use crate::auth::AuthenticatedUser;
use crate::message::{AppError, FileType};
use crate::models::folder::{
    validate_folder_name, FolderCreateRequest, FolderResponse, FolderUpdateRequest,
};

#[get("/folders")]
pub async fn list_folders(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let folders: Vec<FolderResponse> = state
        .repo
        .list_folders(auth.user_id)
        .await?
        .into_iter()
        .map(FolderResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(folders))
}

#[post("/folders")]
pub async fn create_folder(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    payload: web::Json<FolderCreateRequest>,
) -> Result<HttpResponse, AppError> {
    validate_folder_name(&payload.name)?;

    let folder = state.repo.create_folder(auth.user_id, &payload.name).await?;

    tracing::info!(folder_id = folder.id, user_id = auth.user_id, "created folder");
    Ok(HttpResponse::Created().json(FolderResponse::from(folder)))
}

#[get("/folders/{id}")]
pub async fn get_folder(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    get_folder_response(&state, &auth, path.into_inner()).await
}

#[put("/folders/{id}")]
pub async fn update_folder(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i32>,
    payload: web::Json<FolderUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    let name = payload
        .into_inner()
        .name
        .ok_or_else(|| AppError::validation("name is required"))?;
    rename(&state, &auth, path.into_inner(), &name).await
}

#[patch("/folders/{id}")]
pub async fn patch_folder(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i32>,
    payload: web::Json<FolderUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    match payload.into_inner().name {
        Some(name) => rename(&state, &auth, id, &name).await,
        // nothing to change
        None => get_folder_response(&state, &auth, id).await,
    }
}

/// Deletes the folder together with every photo filed under it.
#[delete("/folders/{id}")]
pub async fn delete_folder(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let images = state
        .repo
        .delete_folder(id, auth.user_id)
        .await?
        .ok_or(AppError::NotFound(FileType::Folder))?;
    state.media.delete_all(&images).await;

    tracing::info!(folder_id = id, photos = images.len(), "deleted folder and its photos");
    Ok(HttpResponse::NoContent().finish())
}

async fn rename(
    state: &AppState,
    auth: &AuthenticatedUser,
    id: i32,
    name: &str,
) -> Result<HttpResponse, AppError> {
    validate_folder_name(name)?;

    let folder = state
        .repo
        .rename_folder(id, auth.user_id, name)
        .await?
        .ok_or(AppError::NotFound(FileType::Folder))?;

    Ok(HttpResponse::Ok().json(FolderResponse::from(folder)))
}

async fn get_folder_response(
    state: &AppState,
    auth: &AuthenticatedUser,
    id: i32,
) -> Result<HttpResponse, AppError> {
    let folder = state
        .repo
        .find_folder(id, auth.user_id)
        .await?
        .ok_or(AppError::NotFound(FileType::Folder))?;

    Ok(HttpResponse::Ok().json(FolderResponse::from(folder)))
}
