use axum::{ extract::{ Path, State }, http::HeaderMap, http::StatusCode, response::IntoResponse, Json };
use serde_json::json;

use crate::error::{ AppError, Result };
use crate::stores::get_store;

use super::AppState;

/// The trigger routes are meant for schedulers, not browsers: they are
/// gated by a shared secret when one is configured.
fn verify_trigger(state: &AppState, headers: &HeaderMap) -> Result<()> {
    let Some(expected) = state.config.check_secret.as_deref() else {
        return Ok(());
    };

    let provided = headers.get("x-check-secret").and_then(|v| v.to_str().ok());
    if provided == Some(expected) {
        Ok(())
    } else {
        Err(AppError::Unauthorized)
    }
}

/// Run one full polling pass. Idempotent and safe to invoke on a fixed
/// interval; the ledger prevents duplicate notifications.
pub async fn run_check(
    State(state): State<AppState>,
    headers: HeaderMap
) -> Result<axum::response::Response> {
    verify_trigger(&state, &headers)?;

    if state.config.check_disabled {
        return Ok(
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "message": "Watch checking is temporarily disabled" })),
            ).into_response()
        );
    }

    let summary = state.checker.run_pass().await?;
    Ok(Json(summary).into_response())
}

/// Run a polling pass limited to one store's watches.
pub async fn run_store_check(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(store_id): Path<String>
) -> Result<axum::response::Response> {
    verify_trigger(&state, &headers)?;

    if state.config.check_disabled {
        return Ok(
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "message": "Watch checking is temporarily disabled" })),
            ).into_response()
        );
    }

    if get_store(&store_id).is_none() {
        return Err(AppError::UnknownStore(store_id));
    }

    let summary = state.checker.run_store_pass(&store_id).await?;
    Ok(Json(summary).into_response())
}
