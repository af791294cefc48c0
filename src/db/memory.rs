use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::{Repository, RepositoryError};
use crate::models::folder::Folder;
use crate::models::photo::{NewPhoto, Photo, PhotoChanges};
use crate::models::user::{NewUser, User, UserChanges};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    folders: Vec<Folder>,
    photos: Vec<Photo>,
    next_id: i32,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn folder_name(&self, folder_id: Option<i32>) -> Option<String> {
        let folder_id = folder_id?;
        self.folders
            .iter()
            .find(|f| f.id == folder_id)
            .map(|f| f.name.clone())
    }

    fn with_folder_name(&self, photo: &Photo) -> Photo {
        Photo {
            folder_name: self.folder_name(photo.folder_id),
            ..photo.clone()
        }
    }
}

/// In-memory repository backing the HTTP tests.
#[derive(Clone, Default)]
pub struct MemoryRepository {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn photo_count(&self) -> usize {
        self.tables.lock().await.photos.len()
    }

    pub async fn stored_password_hash(&self, user_id: i32) -> Option<String> {
        let tables = self.tables.lock().await;
        tables
            .users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| u.password_hash.clone())
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn create_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(RepositoryError::UsernameTaken);
        }

        let user = User {
            id: tables.next_id(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            date_joined: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: i32) -> Result<Option<User>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn update_user(
        &self,
        id: i32,
        changes: UserChanges,
    ) -> Result<Option<User>, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if let Some(username) = &changes.username {
            if tables.users.iter().any(|u| u.id != id && &u.username == username) {
                return Err(RepositoryError::UsernameTaken);
            }
        }

        let Some(user) = tables.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(username) = changes.username {
            user.username = username;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(password_hash) = changes.password_hash {
            user.password_hash = password_hash;
        }
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: i32) -> Result<Option<Vec<String>>, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if !tables.users.iter().any(|u| u.id == id) {
            return Ok(None);
        }

        let images = tables
            .photos
            .iter()
            .filter(|p| p.user_id == id)
            .map(|p| p.image.clone())
            .collect();

        let owned_folders: Vec<i32> = tables
            .folders
            .iter()
            .filter(|f| f.user_id == id)
            .map(|f| f.id)
            .collect();

        tables.users.retain(|u| u.id != id);
        tables.folders.retain(|f| f.user_id != id);
        tables.photos.retain(|p| p.user_id != id);
        for photo in tables.photos.iter_mut() {
            if photo.folder_id.is_some_and(|f| owned_folders.contains(&f)) {
                photo.folder_id = None;
            }
        }
        Ok(Some(images))
    }

    async fn list_folders(&self, user_id: i32) -> Result<Vec<Folder>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .folders
            .iter()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_folder(&self, id: i32, user_id: i32) -> Result<Option<Folder>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .folders
            .iter()
            .find(|f| f.id == id && f.user_id == user_id)
            .cloned())
    }

    async fn create_folder(&self, user_id: i32, name: &str) -> Result<Folder, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        let folder = Folder {
            id: tables.next_id(),
            user_id,
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.folders.push(folder.clone());
        Ok(folder)
    }

    async fn rename_folder(
        &self,
        id: i32,
        user_id: i32,
        name: &str,
    ) -> Result<Option<Folder>, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let Some(folder) = tables
            .folders
            .iter_mut()
            .find(|f| f.id == id && f.user_id == user_id)
        else {
            return Ok(None);
        };
        folder.name = name.to_string();
        folder.updated_at = Utc::now();
        Ok(Some(folder.clone()))
    }

    async fn get_or_create_folder(
        &self,
        user_id: i32,
        name: &str,
    ) -> Result<(Folder, bool), RepositoryError> {
        let mut tables = self.tables.lock().await;
        if let Some(folder) = tables
            .folders
            .iter()
            .find(|f| f.user_id == user_id && f.name == name)
        {
            return Ok((folder.clone(), false));
        }

        let now = Utc::now();
        let folder = Folder {
            id: tables.next_id(),
            user_id,
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.folders.push(folder.clone());
        Ok((folder, true))
    }

    async fn delete_folder(
        &self,
        id: i32,
        user_id: i32,
    ) -> Result<Option<Vec<String>>, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if !tables.folders.iter().any(|f| f.id == id && f.user_id == user_id) {
            return Ok(None);
        }

        let images = tables
            .photos
            .iter()
            .filter(|p| p.folder_id == Some(id))
            .map(|p| p.image.clone())
            .collect();
        tables.photos.retain(|p| p.folder_id != Some(id));
        tables.folders.retain(|f| f.id != id);
        Ok(Some(images))
    }

    async fn list_photos(
        &self,
        user_id: i32,
        folder_id: i32,
    ) -> Result<Vec<Photo>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .photos
            .iter()
            .filter(|p| p.user_id == user_id && p.folder_id == Some(folder_id))
            .map(|p| tables.with_folder_name(p))
            .collect())
    }

    async fn find_photo(&self, id: i32, user_id: i32) -> Result<Option<Photo>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .photos
            .iter()
            .find(|p| p.id == id && p.user_id == user_id)
            .map(|p| tables.with_folder_name(p)))
    }

    async fn create_photo(&self, photo: NewPhoto) -> Result<Photo, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        let photo = Photo {
            id: tables.next_id(),
            user_id: photo.user_id,
            folder_id: photo.folder_id,
            folder_name: tables.folder_name(photo.folder_id),
            title: photo.title,
            description: photo.description,
            image: photo.image,
            created_at: now,
            updated_at: now,
        };
        tables.photos.push(photo.clone());
        Ok(photo)
    }

    async fn update_photo(
        &self,
        id: i32,
        user_id: i32,
        changes: PhotoChanges,
    ) -> Result<Option<Photo>, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let Some(photo) = tables
            .photos
            .iter_mut()
            .find(|p| p.id == id && p.user_id == user_id)
        else {
            return Ok(None);
        };
        if let Some(title) = changes.title {
            photo.title = title;
        }
        if let Some(description) = changes.description {
            photo.description = description;
        }
        if let Some(image) = changes.image {
            photo.image = image;
        }
        photo.updated_at = Utc::now();

        let photo = photo.clone();
        Ok(Some(tables.with_folder_name(&photo)))
    }

    async fn delete_photo(&self, id: i32, user_id: i32) -> Result<Option<Photo>, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let Some(index) = tables
            .photos
            .iter()
            .position(|p| p.id == id && p.user_id == user_id)
        else {
            return Ok(None);
        };
        let photo = tables.photos.remove(index);
        Ok(Some(tables.with_folder_name(&photo)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: String::new(),
            password_hash: "hash".to_string(),
        }
    }

    fn new_photo(user_id: i32, folder_id: i32, title: &str) -> NewPhoto {
        NewPhoto {
            user_id,
            folder_id: Some(folder_id),
            title: title.to_string(),
            description: None,
            image: format!("photos/{title}"),
        }
    }

    #[tokio::test]
    async fn test_duplicate_username_is_rejected() {
        let repo = MemoryRepository::new();
        repo.create_user(new_user("alice")).await.unwrap();
        let err = repo.create_user(new_user("alice")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::UsernameTaken));
    }

    #[tokio::test]
    async fn test_get_or_create_reuses_existing_folder() {
        let repo = MemoryRepository::new();
        let user = repo.create_user(new_user("alice")).await.unwrap();

        let (first, created) = repo.get_or_create_folder(user.id, "inbox").await.unwrap();
        assert!(created);
        let (second, created) = repo.get_or_create_folder(user.id, "inbox").await.unwrap();
        assert!(!created);
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_delete_folder_removes_only_its_photos() {
        let repo = MemoryRepository::new();
        let user = repo.create_user(new_user("alice")).await.unwrap();
        let trip = repo.create_folder(user.id, "trip").await.unwrap();
        let home = repo.create_folder(user.id, "home").await.unwrap();
        repo.create_photo(new_photo(user.id, trip.id, "a.jpg")).await.unwrap();
        repo.create_photo(new_photo(user.id, trip.id, "b.jpg")).await.unwrap();
        let kept = repo.create_photo(new_photo(user.id, home.id, "c.jpg")).await.unwrap();

        let images = repo.delete_folder(trip.id, user.id).await.unwrap().unwrap();
        assert_eq!(images, vec!["photos/a.jpg", "photos/b.jpg"]);
        assert_eq!(repo.photo_count().await, 1);
        assert!(repo.find_photo(kept.id, user.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_folder_of_another_user_is_a_miss() {
        let repo = MemoryRepository::new();
        let alice = repo.create_user(new_user("alice")).await.unwrap();
        let bob = repo.create_user(new_user("bob")).await.unwrap();
        let folder = repo.create_folder(alice.id, "private").await.unwrap();

        assert!(repo.delete_folder(folder.id, bob.id).await.unwrap().is_none());
        assert!(repo.find_folder(folder.id, alice.id).await.unwrap().is_some());
    }
}
