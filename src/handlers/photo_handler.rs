use actix_multipart::Multipart;
use actix_web::{delete, get, patch, post, put, web, HttpResponse};

use crate::app::AppState;
use crate::auth::AuthenticatedUser;
use crate::message::{AppError, FileType};
use crate::models::photo::{validate_title, NewPhoto, Photo, PhotoChanges, PhotoResponse};
use crate::utils::multipart::{read_photo_form, UploadedImage};

#[get("/folders/{folder_id}/photos")]
pub async fn list_photos(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let photos: Vec<PhotoResponse> = state
        .repo
        .list_photos(auth.user_id, path.into_inner())
        .await?
        .into_iter()
        .map(|photo| PhotoResponse::new(photo, &state.media))
        .collect();

    Ok(HttpResponse::Ok().json(photos))
}

/// Multipart upload: `filename` names the photo, `image` carries the file.
#[post("/folders/{folder_id}/photos")]
pub async fn create_photo(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<i32>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let form = read_photo_form(payload, state.media.max_upload_bytes()).await?;

    let filename = form
        .text("filename")
        .ok_or_else(|| AppError::validation("filename is required"))?
        .to_string();
    let description = form.text("description").map(str::to_string);
    let image = form
        .image
        .ok_or_else(|| AppError::validation("Image file is required"))?;
    validate_title(&filename)?;

    let folder = state
        .repo
        .find_folder(path.into_inner(), auth.user_id)
        .await?
        .ok_or(AppError::NotFound(FileType::Folder))?;

    let photo = store_photo(&state, auth.user_id, folder.id, filename, description, image).await?;
    Ok(HttpResponse::Created().json(PhotoResponse::new(photo, &state.media)))
}

#[get("/folders/{folder_id}/photos/{id}")]
pub async fn get_photo(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<(i32, i32)>,
) -> Result<HttpResponse, AppError> {
    let (folder_id, id) = path.into_inner();
    let photo = find_in_folder(&state, &auth, folder_id, id).await?;

    Ok(HttpResponse::Ok().json(PhotoResponse::new(photo, &state.media)))
}

#[put("/folders/{folder_id}/photos/{id}")]
pub async fn update_photo(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<(i32, i32)>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let (folder_id, id) = path.into_inner();
    apply_update(&state, &auth, folder_id, id, payload, true).await
}

#[patch("/folders/{folder_id}/photos/{id}")]
pub async fn patch_photo(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<(i32, i32)>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let (folder_id, id) = path.into_inner();
    apply_update(&state, &auth, folder_id, id, payload, false).await
}

#[delete("/folders/{folder_id}/photos/{id}")]
pub async fn delete_photo(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    path: web::Path<(i32, i32)>,
) -> Result<HttpResponse, AppError> {
    let (folder_id, id) = path.into_inner();
    find_in_folder(&state, &auth, folder_id, id).await?;

    let photo = state
        .repo
        .delete_photo(id, auth.user_id)
        .await?
        .ok_or(AppError::NotFound(FileType::Photo))?;
    state.media.delete_all(&[photo.image]).await;

    tracing::info!(photo_id = id, folder_id, "deleted photo");
    Ok(HttpResponse::NoContent().finish())
}

/// Saves the image and records the photo. The stored file is removed again
/// if the row cannot be written.
pub async fn store_photo(
    state: &AppState,
    user_id: i32,
    folder_id: i32,
    title: String,
    description: Option<String>,
    image: UploadedImage,
) -> Result<Photo, AppError> {
    let path = state.media.save(&title, &image.bytes).await?;

    let new_photo = NewPhoto {
        user_id,
        folder_id: Some(folder_id),
        title,
        description,
        image: path.clone(),
    };

    match state.repo.create_photo(new_photo).await {
        Ok(photo) => {
            tracing::info!(photo_id = photo.id, folder_id, user_id, "uploaded photo");
            Ok(photo)
        }
        Err(e) => {
            state.media.delete_all(&[path]).await;
            Err(e.into())
        }
    }
}

/// The caller's photo, provided it is filed under `folder_id`.
async fn find_in_folder(
    state: &AppState,
    auth: &AuthenticatedUser,
    folder_id: i32,
    id: i32,
) -> Result<Photo, AppError> {
    let photo = state
        .repo
        .find_photo(id, auth.user_id)
        .await?
        .ok_or(AppError::NotFound(FileType::Photo))?;

    if photo.folder_id != Some(folder_id) {
        return Err(AppError::PhotoNotInFolder);
    }
    Ok(photo)
}

async fn apply_update(
    state: &AppState,
    auth: &AuthenticatedUser,
    folder_id: i32,
    id: i32,
    payload: Multipart,
    full: bool,
) -> Result<HttpResponse, AppError> {
    let existing = find_in_folder(state, auth, folder_id, id).await?;
    let form = read_photo_form(payload, state.media.max_upload_bytes()).await?;

    let title = form.text("title").map(str::to_string);
    // a blank description clears it
    let description = form
        .sent("description")
        .map(|value| (!value.trim().is_empty()).then(|| value.to_string()));
    match &title {
        Some(title) => validate_title(title)?,
        None if full => return Err(AppError::validation("title is required")),
        None => {}
    }

    let new_image = match form.image {
        Some(image) => {
            let name = title.as_deref().unwrap_or(&existing.title);
            Some(state.media.save(name, &image.bytes).await?)
        }
        None => None,
    };

    let changes = PhotoChanges {
        title,
        description,
        image: new_image.clone(),
    };
    let updated = match state.repo.update_photo(id, auth.user_id, changes).await {
        Ok(Some(photo)) => photo,
        result => {
            if let Some(path) = new_image {
                state.media.delete_all(&[path]).await;
            }
            return match result {
                Err(e) => Err(e.into()),
                _ => Err(AppError::NotFound(FileType::Photo)),
            };
        }
    };

    if new_image.is_some() {
        state.media.delete_all(&[existing.image]).await;
    }

    Ok(HttpResponse::Ok().json(PhotoResponse::new(updated, &state.media)))
}
