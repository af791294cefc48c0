use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::config::MediaSettings;

const UPLOAD_DIR: &str = "photos";
/// Keeps `photos/<uuid>-<name>` well inside both the filesystem's 255-byte
/// name limit and the `image` column.
const MAX_NAME_BYTES: usize = 100;
const MAX_EXTENSION_BYTES: usize = 16;

/// Local filesystem storage for uploaded images.
#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
    url: String,
    max_upload_bytes: usize,
}

impl MediaStorage {
    pub fn new(settings: &MediaSettings) -> Self {
        let mut url = settings.url.clone();
        if !url.ends_with('/') {
            url.push('/');
        }

        Self {
            root: settings.root.clone(),
            url,
            max_upload_bytes: settings.max_upload_bytes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    pub fn url_for(&self, image: &str) -> String {
        format!("{}{}", self.url, image)
    }

    /// Writes `bytes` under a unique name derived from `filename` and returns
    /// the path relative to the media root.
    pub async fn save(&self, filename: &str, bytes: &[u8]) -> io::Result<String> {
        let relative = format!("{}/{}-{}", UPLOAD_DIR, Uuid::new_v4(), sanitize_filename(filename));

        tokio::fs::create_dir_all(self.root.join(UPLOAD_DIR)).await?;
        tokio::fs::write(self.root.join(&relative), bytes).await?;

        Ok(relative)
    }

    pub async fn delete(&self, image: &str) -> io::Result<()> {
        match tokio::fs::remove_file(self.root.join(image)).await {
            Ok(()) => Ok(()),
            // already gone
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Deletes each stored file, logging failures instead of returning them.
    pub async fn delete_all(&self, images: &[String]) {
        for image in images {
            if let Err(e) = self.delete(image).await {
                tracing::warn!(image = %image, error = %e, "failed to remove stored image");
            }
        }
    }
}

/// Reduces a client-supplied name to a single safe path component.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or_default();

    let cleaned: String = base
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        truncate_name(cleaned, MAX_NAME_BYTES)
    }
}

/// Cuts `name` to at most `max_bytes`, keeping a short extension intact.
fn truncate_name(name: &str, max_bytes: usize) -> String {
    if name.len() <= max_bytes {
        return name.to_string();
    }

    let (stem, extension) = match name.rfind('.') {
        Some(dot) if name.len() - dot <= MAX_EXTENSION_BYTES => name.split_at(dot),
        _ => (name, ""),
    };

    let budget = max_bytes - extension.len();
    let mut end = budget.min(stem.len());
    while !stem.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}{}", &stem[..end], extension)
}
