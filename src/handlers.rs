pub mod auth_handler;
pub mod folder_handler;
pub mod photo_handler;
pub mod upload_handler;
pub mod user_handler;
