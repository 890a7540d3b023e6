use crate::http::controllers::{
    change_password_handler, dataset_charts_handler, dataset_view_handler, health_handler,
    list_datasets_handler, list_users_handler, login_handler, logout_handler, me_handler,
    register_handler, root_handler, update_me_handler, upload_dataset_handler,
};
use crate::DeckEngine;
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub struct AppServer {
    pub router: Router,
    pub engine: Arc<DeckEngine>,
}

pub const PATH_ROOT: &str = "/";
pub const PATH_HEALTH: &str = "/health";
pub const PATH_REGISTER: &str = "/auth/register";
pub const PATH_LOGIN: &str = "/auth/login";
pub const PATH_LOGOUT: &str = "/auth/logout";
pub const PATH_ME: &str = "/auth/me";
pub const PATH_CHANGE_PASSWORD: &str = "/auth/change-password";
pub const PATH_USERS: &str = "/auth/users";
pub const PATH_DATASETS: &str = "/datasets";
pub const PATH_DATASET_UPLOAD: &str = "/datasets/upload";
pub const PATH_DATASET_VIEW: &str = "/datasets/:id/view";
pub const PATH_DATASET_CHARTS: &str = "/datasets/:id/charts";

/// Raw request cap for the upload route. The per-file and per-account
/// limits are enforced after multipart decoding; this only bounds the body.
const UPLOAD_BODY_LIMIT: usize = 4 * 1024 * 1024;

impl AppServer {
    pub fn new(engine: DeckEngine, allowed_origins: &[String]) -> Self {
        let engine = Arc::new(engine);

        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Ignoring unparseable CORS origin '{}'", origin);
                    None
                }
            })
            .collect();

        // Credentialed CORS forbids wildcards, so everything is listed
        // explicitly.
        let cors = CorsLayer::new()
            .allow_origin(origins)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST, Method::PUT])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

        AppServer {
            router: Router::new()
                .route(PATH_ROOT, get(root_handler))
                .route(PATH_HEALTH, get(health_handler))
                .route(PATH_REGISTER, post(register_handler))
                .route(PATH_LOGIN, post(login_handler))
                .route(PATH_LOGOUT, post(logout_handler))
                .route(PATH_ME, get(me_handler).put(update_me_handler))
                .route(PATH_CHANGE_PASSWORD, post(change_password_handler))
                .route(PATH_USERS, get(list_users_handler))
                .route(PATH_DATASETS, get(list_datasets_handler))
                .route(
                    PATH_DATASET_UPLOAD,
                    post(upload_dataset_handler)
                        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
                )
                .route(PATH_DATASET_VIEW, get(dataset_view_handler))
                .route(PATH_DATASET_CHARTS, get(dataset_charts_handler))
                .layer(cors)
                .with_state(engine.clone()),
            engine,
        }
    }
}
