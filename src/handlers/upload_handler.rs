use actix_multipart::{Multipart, MultipartError};
use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use serde_with::{serde_as, NoneAsEmptyString};

use crate::app::AppState;
use crate::auth::AuthenticatedUser;
use crate::handlers::photo_handler::store_photo;
use crate::message::AppError;
use crate::models::folder::validate_folder_name;
use crate::models::photo::{validate_title, PhotoResponse};
use crate::utils::multipart::{read_photo_form, PhotoForm};

#[serde_as]
#[derive(Debug, Deserialize)]
pub struct AddPhotoQuery {
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub foldername: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub filename: Option<String>,
}

#[get("/test")]
pub async fn test_api() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "message": "API is working!" }))
}

/// Uploads into the caller's folder called `foldername`, creating the folder
/// on first use.
#[post("/addphoto")]
pub async fn add_photo(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    query: web::Query<AddPhotoQuery>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    // no body at all is just a missing image here
    let form = match read_photo_form(payload, state.media.max_upload_bytes()).await {
        Err(AppError::Multipart(MultipartError::NoContentType)) => PhotoForm::default(),
        result => result?,
    };
    let AddPhotoQuery { foldername, filename } = query.into_inner();

    let (Some(foldername), Some(filename), Some(image)) = (foldername, filename, form.image) else {
        return Err(AppError::validation("Missing foldername, filename or image"));
    };
    validate_folder_name(&foldername)?;
    validate_title(&filename)?;

    let (folder, created) = state
        .repo
        .get_or_create_folder(auth.user_id, &foldername)
        .await?;
    if created {
        tracing::info!(folder_id = folder.id, user_id = auth.user_id, "created folder for upload");
    }

    let photo = store_photo(&state, auth.user_id, folder.id, filename, None, image).await?;
    Ok(HttpResponse::Created().json(PhotoResponse::new(photo, &state.media)))
}
