pub mod folder;
pub mod photo;
pub mod user;
