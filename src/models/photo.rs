use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::AppError;
use crate::utils::media::MediaStorage;

const TITLE_MAX_LEN: usize = 255;

/// A photo row joined with the name of its folder.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Photo {
    pub id: i32,
    pub user_id: i32,
    pub folder_id: Option<i32>,
    pub folder_name: Option<String>,
    pub title: String,
    pub description: Option<String>,
    /// Path relative to the media root.
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PhotoResponse {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub image: String,
    pub folder: Option<i32>,
    pub folder_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PhotoResponse {
    pub fn new(photo: Photo, media: &MediaStorage) -> Self {
        PhotoResponse {
            id: photo.id,
            image: media.url_for(&photo.image),
            title: photo.title,
            description: photo.description,
            folder: photo.folder_id,
            folder_name: photo.folder_name,
            created_at: photo.created_at,
            updated_at: photo.updated_at,
        }
    }
}

#[derive(Debug)]
pub struct NewPhoto {
    pub user_id: i32,
    pub folder_id: Option<i32>,
    pub title: String,
    pub description: Option<String>,
    pub image: String,
}

#[derive(Debug, Default)]
pub struct PhotoChanges {
    pub title: Option<String>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
    pub image: Option<String>,
}

pub fn validate_title(title: &str) -> Result<(), AppError> {
    if title.trim().is_empty() {
        return Err(AppError::validation("title may not be blank"));
    }
    if title.chars().count() > TITLE_MAX_LEN {
        return Err(AppError::validation(format!(
            "title may not exceed {TITLE_MAX_LEN} characters"
        )));
    }
    Ok(())
}
