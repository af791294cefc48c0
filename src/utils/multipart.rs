use std::collections::HashMap;

use actix_multipart::Multipart;
use futures_util::StreamExt;

use crate::message::AppError;

const IMAGE_FIELD: &str = "image";

#[derive(Debug)]
pub struct UploadedImage {
    pub bytes: Vec<u8>,
}

/// Text fields plus the optional `image` part of a photo form.
#[derive(Debug, Default)]
pub struct PhotoForm {
    fields: HashMap<String, String>,
    pub image: Option<UploadedImage>,
}

impl PhotoForm {
    /// A text field, with blank values treated as absent.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.sent(name).filter(|value| !value.trim().is_empty())
    }

    /// A text field exactly as sent, blank or not.
    pub fn sent(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Drains a multipart body. Parts other than `image` are read as UTF-8 text;
/// the whole body is capped at `max_bytes`.
pub async fn read_photo_form(mut payload: Multipart, max_bytes: usize) -> Result<PhotoForm, AppError> {
    let mut form = PhotoForm::default();
    let mut total = 0usize;

    while let Some(item) = payload.next().await {
        let mut field = item?;

        let name = field
            .content_disposition()
            .get_name()
            .unwrap_or_default()
            .to_string();
        let is_image = name == IMAGE_FIELD;

        if is_image {
            let content_type = field.content_type();
            if !content_type.is_some_and(|ct| ct.type_() == mime::IMAGE) {
                return Err(AppError::validation("Upload a valid image."));
            }
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk?;
            total += chunk.len();
            if total > max_bytes {
                return Err(AppError::PayloadTooLarge(max_bytes));
            }
            bytes.extend_from_slice(&chunk);
        }

        if is_image {
            if bytes.is_empty() {
                return Err(AppError::validation("The submitted file is empty."));
            }
            form.image = Some(UploadedImage { bytes });
        } else if !name.is_empty() {
            let value = String::from_utf8(bytes)
                .map_err(|_| AppError::validation(format!("{name} must be valid UTF-8 text")))?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}
