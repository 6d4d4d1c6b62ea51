use std::sync::Arc;

pub mod watches;
pub mod account;
pub mod check;

use axum::http::HeaderMap;

use crate::checker::WatchChecker;
use crate::config::Config;
use crate::error::{ AppError, Result };
use crate::services::auth_service::{ bearer_token, AuthenticatedUser };
use crate::services::{ AuthService, GeoService, ProfileService, WatchService };

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub watch_service: WatchService,
    pub profile_service: ProfileService,
    pub auth_service: Arc<AuthService>,
    pub geo_service: Arc<GeoService>,
    pub checker: Arc<WatchChecker>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        watch_service: WatchService,
        profile_service: ProfileService,
        auth_service: Arc<AuthService>,
        geo_service: Arc<GeoService>,
        checker: Arc<WatchChecker>
    ) -> Self {
        Self {
            config,
            watch_service,
            profile_service,
            auth_service,
            geo_service,
            checker,
        }
    }
}

/// Resolve the request's bearer token to a user, or fail with 401.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<AuthenticatedUser> {
    let header_value = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let token = bearer_token(header_value).ok_or(AppError::Unauthorized)?;
    state.auth_service.authenticate(token).await
}
