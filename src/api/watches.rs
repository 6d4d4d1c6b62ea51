use axum::{ extract::{ Path, State }, http::HeaderMap, http::StatusCode, Json };
use serde::{ Deserialize, Serialize };
use uuid::Uuid;

use crate::checker::RunSummary;
use crate::db::entity::watch;
use crate::error::{ AppError, Result };
use crate::services::watch_service::CreateWatchRequest;

use super::{ authenticate, AppState };

#[derive(Deserialize)]
pub struct CreateWatchBody {
    pub store_id: String,
    pub article_number: String,
    #[serde(default)]
    pub desired_quantity: Option<i32>,
}

#[derive(Serialize)]
pub struct WatchResponse {
    pub id: Uuid,
    pub email: String,
    pub store_id: String,
    pub store_name: String,
    pub article_number: String,
    pub desired_quantity: i32,
    pub created_at: String,
}

impl From<watch::Model> for WatchResponse {
    fn from(model: watch::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            store_id: model.store_id,
            store_name: model.store_name,
            article_number: model.article_number,
            desired_quantity: model.desired_quantity,
            created_at: model.created_at.to_rfc3339(),
        }
    }
}

pub async fn create_watch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateWatchBody>
) -> Result<(StatusCode, Json<WatchResponse>)> {
    let user = authenticate(&state, &headers).await?;

    // Watches only fire emails; an unverified address cannot receive them.
    if !user.email_verified {
        return Err(AppError::EmailNotVerified);
    }

    let watch = state.watch_service.create_watch(CreateWatchRequest {
        email: user.email,
        store_id: body.store_id,
        article_number: body.article_number,
        desired_quantity: body.desired_quantity,
    }).await?;

    Ok((StatusCode::CREATED, Json(watch.into())))
}

pub async fn list_watches(
    State(state): State<AppState>,
    headers: HeaderMap
) -> Result<Json<Vec<WatchResponse>>> {
    let user = authenticate(&state, &headers).await?;

    let watches = state.watch_service.list_watches(&user.email).await?;
    Ok(Json(watches.into_iter().map(WatchResponse::from).collect()))
}

pub async fn delete_watch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(watch_id): Path<Uuid>
) -> Result<StatusCode> {
    let user = authenticate(&state, &headers).await?;

    state.watch_service.deactivate_watch(watch_id, &user.email).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// On-demand check of one watch's (user, store) group. Sends real
/// notifications and writes ledger rows, exactly like a scheduled pass.
pub async fn check_watch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(watch_id): Path<Uuid>
) -> Result<Json<RunSummary>> {
    let user = authenticate(&state, &headers).await?;

    let watch = state.watch_service.get_watch(watch_id, &user.email).await?;
    let summary = state.checker.run_user_store_pass(&user.email, &watch.store_id).await?;
    Ok(Json(summary))
}
