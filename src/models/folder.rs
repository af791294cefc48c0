use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::AppError;

const NAME_MAX_LEN: usize = 255;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Folder {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FolderResponse {
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Folder> for FolderResponse {
    fn from(folder: Folder) -> Self {
        FolderResponse {
            id: folder.id,
            name: folder.name,
            created_at: folder.created_at,
            updated_at: folder.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FolderCreateRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct FolderUpdateRequest {
    pub name: Option<String>,
}

pub fn validate_folder_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::validation("name may not be blank"));
    }
    if name.chars().count() > NAME_MAX_LEN {
        return Err(AppError::validation(format!(
            "name may not exceed {NAME_MAX_LEN} characters"
        )));
    }
    Ok(())
}
