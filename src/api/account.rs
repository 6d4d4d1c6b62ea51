use axum::{ extract::State, http::HeaderMap, Json };
use serde::{ Deserialize, Serialize };

use crate::db::entity::profile;
use crate::error::Result;
use crate::services::profile_service::UpdateProfileRequest;

use super::{ authenticate, AppState };

#[derive(Serialize)]
pub struct AccountResponse {
    pub email: String,
    pub street: String,
    pub house_number: String,
    pub postal_code: String,
    pub city: String,
    pub gas_usage: Option<f64>,
    pub fuel_price: Option<f64>,
    pub has_coordinates: bool,
    pub watch_count: u64,
}

fn account_response(email: &str, profile: Option<&profile::Model>, watch_count: u64) -> AccountResponse {
    AccountResponse {
        email: email.to_string(),
        street: profile
            .and_then(|p| p.street.clone())
            .unwrap_or_default(),
        house_number: profile
            .and_then(|p| p.house_number.clone())
            .unwrap_or_default(),
        postal_code: profile
            .and_then(|p| p.postal_code.clone())
            .unwrap_or_default(),
        city: profile
            .and_then(|p| p.city.clone())
            .unwrap_or_default(),
        gas_usage: profile.and_then(|p| p.gas_usage),
        fuel_price: profile.and_then(|p| p.fuel_price),
        has_coordinates: profile.map(|p| p.address_lat.is_some() && p.address_lng.is_some())
            .unwrap_or(false),
        watch_count,
    }
}

pub async fn get_account(
    State(state): State<AppState>,
    headers: HeaderMap
) -> Result<Json<AccountResponse>> {
    let user = authenticate(&state, &headers).await?;

    let profile = state.profile_service.get_profile(&user.id).await?;
    let watch_count = state.watch_service.count_active_watches(&user.email).await?;

    Ok(Json(account_response(&user.email, profile.as_ref(), watch_count)))
}

#[derive(Deserialize)]
pub struct UpdateAccountBody {
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub house_number: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub gas_usage: Option<f64>,
    #[serde(default)]
    pub fuel_price: Option<f64>,
}

pub async fn update_account(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<UpdateAccountBody>
) -> Result<Json<AccountResponse>> {
    let user = authenticate(&state, &headers).await?;

    let profile = state.profile_service.update_profile(
        &user.id,
        &user.email,
        UpdateProfileRequest {
            street: body.street,
            house_number: body.house_number,
            postal_code: body.postal_code,
            city: body.city,
            gas_usage: body.gas_usage,
            fuel_price: body.fuel_price,
        },
        &state.geo_service
    ).await?;
    let watch_count = state.watch_service.count_active_watches(&user.email).await?;

    Ok(Json(account_response(&user.email, Some(&profile), watch_count)))
}
