use actix_web::web;

use crate::handlers::auth_handler::{obtain_token, refresh_token};
use crate::handlers::folder_handler::{
    create_folder, delete_folder, get_folder, list_folders, patch_folder, update_folder,
};
use crate::handlers::photo_handler::{
    create_photo, delete_photo, get_photo, list_photos, patch_photo, update_photo,
};
use crate::handlers::upload_handler::{add_photo, test_api};
use crate::handlers::user_handler::{
    delete_user, get_user, list_users, patch_user, register, update_user,
};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(test_api)
        .service(obtain_token)
        .service(refresh_token)
        .service(register)
        .service(list_users)
        .service(get_user)
        .service(update_user)
        .service(patch_user)
        .service(delete_user)
        .service(list_folders)
        .service(create_folder)
        .service(get_folder)
        .service(update_folder)
        .service(patch_folder)
        .service(delete_folder)
        .service(list_photos)
        .service(create_photo)
        .service(get_photo)
        .service(update_photo)
        .service(patch_photo)
        .service(delete_photo)
        .service(add_photo);
}
