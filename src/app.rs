use std::sync::Arc;

use actix_web::web;

use crate::auth::TokenService;
use crate::config::Settings;
use crate::db::Repository;
use crate::message::AppError;
use crate::routes;
use crate::utils::media::MediaStorage;

/// Shared by every worker; handlers receive it as `web::Data<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn Repository>,
    pub tokens: TokenService,
    pub media: MediaStorage,
    pub bcrypt_cost: u32,
}

impl AppState {
    pub fn new(repo: Arc<dyn Repository>, settings: &Settings) -> Self {
        Self {
            repo,
            tokens: TokenService::new(&settings.jwt),
            media: MediaStorage::new(&settings.media),
            bcrypt_cost: settings.bcrypt_cost,
        }
    }
}

/// Registers state, extractor configuration and every route. Extractor
/// failures render through [`AppError`] like every other error.
pub fn configure_app(state: web::Data<AppState>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(state)
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                AppError::validation(err.to_string()).into()
            }))
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                AppError::validation(err.to_string()).into()
            }))
            // an id that does not parse names no resource
            .app_data(web::PathConfig::default().error_handler(|_err, _req| {
                AppError::UnknownResource.into()
            }))
            .configure(routes::config);
    }
}
