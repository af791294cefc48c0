pub mod media;
pub mod multipart;
