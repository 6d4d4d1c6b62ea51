use chrono::Utc;
use sea_orm::{ ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter };

use crate::db::entity::profile;
use crate::error::Result;
use crate::services::geo_service::GeoService;

#[derive(Clone)]
pub struct ProfileService {
    db: DatabaseConnection,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateProfileRequest {
    pub street: Option<String>,
    pub house_number: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub gas_usage: Option<f64>,
    pub fuel_price: Option<f64>,
}

impl ProfileService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<Option<profile::Model>> {
        let profile = profile::Entity::find_by_id(user_id).one(&self.db).await?;
        Ok(profile)
    }

    pub async fn get_profile_by_email(&self, email: &str) -> Result<Option<profile::Model>> {
        let profile = profile::Entity
            ::find()
            .filter(profile::Column::Email.eq(email))
            .one(&self.db).await?;
        Ok(profile)
    }

    /// Upsert the user's profile. When the address parts change, the
    /// assembled address is re-geocoded; a geocoding miss clears the
    /// stored coordinates rather than failing the update.
    pub async fn update_profile(
        &self,
        user_id: &str,
        email: &str,
        req: UpdateProfileRequest,
        geo: &GeoService
    ) -> Result<profile::Model> {
        let now = Utc::now();
        let existing = self.get_profile(user_id).await?;
        let is_new = existing.is_none();

        let previous_address = existing.as_ref().map(assemble_address).unwrap_or_default();

        let mut active: profile::ActiveModel = match existing {
            Some(model) => model.into(),
            None =>
                profile::ActiveModel {
                    user_id: ActiveValue::Set(user_id.to_string()),
                    email: ActiveValue::Set(email.to_string()),
                    created_at: ActiveValue::Set(now),
                    ..Default::default()
                },
        };

        if let Some(street) = req.street {
            active.street = ActiveValue::Set(non_empty(street));
        }
        if let Some(house_number) = req.house_number {
            active.house_number = ActiveValue::Set(non_empty(house_number));
        }
        if let Some(postal_code) = req.postal_code {
            active.postal_code = ActiveValue::Set(non_empty(postal_code));
        }
        if let Some(city) = req.city {
            active.city = ActiveValue::Set(non_empty(city));
        }
        active.gas_usage = ActiveValue::Set(req.gas_usage.filter(|&v| v > 0.0));
        active.fuel_price = ActiveValue::Set(req.fuel_price.filter(|&v| v > 0.0));
        active.updated_at = ActiveValue::Set(now);

        let new_address = assemble_address_from_active(&active);
        if is_new || new_address != previous_address {
            let coords = if new_address.is_empty() {
                None
            } else {
                geo.geocode_address(&new_address).await
            };
            active.address_lat = ActiveValue::Set(coords.as_ref().map(|c| c.lat));
            active.address_lng = ActiveValue::Set(coords.as_ref().map(|c| c.lng));
        }

        let saved = if is_new {
            active.insert(&self.db).await?
        } else {
            active.update(&self.db).await?
        };

        Ok(saved)
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim().to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn assemble_address(profile: &profile::Model) -> String {
    join_address_parts(
        profile.street.as_deref(),
        profile.house_number.as_deref(),
        profile.postal_code.as_deref(),
        profile.city.as_deref()
    )
}

fn assemble_address_from_active(active: &profile::ActiveModel) -> String {
    let part = |v: &ActiveValue<Option<String>>| -> Option<String> {
        match v {
            ActiveValue::Set(value) | ActiveValue::Unchanged(value) => value.clone(),
            ActiveValue::NotSet => None,
        }
    };

    join_address_parts(
        part(&active.street).as_deref(),
        part(&active.house_number).as_deref(),
        part(&active.postal_code).as_deref(),
        part(&active.city).as_deref()
    )
}

fn join_address_parts(
    street: Option<&str>,
    house_number: Option<&str>,
    postal_code: Option<&str>,
    city: Option<&str>
) -> String {
    let street_line = match (street, house_number) {
        (Some(street), Some(number)) => format!("{} {}", street, number),
        (Some(street), None) => street.to_string(),
        _ => String::new(),
    };

    [street_line.as_str(), postal_code.unwrap_or(""), city.unwrap_or("")]
        .iter()
        .filter(|part| !part.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_address_parts() {
        assert_eq!(
            join_address_parts(Some("Euroweg"), Some("101"), Some("3825 HA"), Some("Amersfoort")),
            "Euroweg 101, 3825 HA, Amersfoort"
        );
        assert_eq!(join_address_parts(None, None, None, Some("Amersfoort")), "Amersfoort");
        assert_eq!(join_address_parts(None, None, None, None), "");
    }
}
