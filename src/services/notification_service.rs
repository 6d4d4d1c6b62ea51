use chrono::Utc;
use sea_orm::{ ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter };
use uuid::Uuid;

use crate::db::entity::notification;
use crate::error::Result;

/// The ledger: one row per (watch, item) pair that has been notified.
/// A row's existence makes the pair ineligible for any future send.
#[derive(Clone)]
pub struct NotificationService {
    db: DatabaseConnection,
}

/// A ledger row planned during aggregation, written only after the
/// email for its group is confirmed sent.
#[derive(Debug, Clone)]
pub struct PlannedNotification {
    pub watch_id: Uuid,
    pub item_id: String,
    pub product_name: String,
    pub product_price: f64,
    pub product_image: Option<String>,
}

impl NotificationService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Whether this (watch, item) pair has already been notified.
    /// A read failure degrades to "not notified"; the rare duplicate
    /// email is preferred over silently dropping a legitimate match.
    pub async fn already_notified(&self, watch_id: Uuid, item_id: &str) -> bool {
        let lookup = notification::Entity
            ::find()
            .filter(notification::Column::WatchId.eq(watch_id))
            .filter(notification::Column::ItemId.eq(item_id))
            .one(&self.db).await;

        match lookup {
            Ok(existing) => existing.is_some(),
            Err(e) => {
                tracing::warn!(%watch_id, item_id, "ledger lookup failed, treating as unsent: {}", e);
                false
            }
        }
    }

    /// Persist one row per planned notification, after a confirmed send.
    pub async fn record_batch(&self, planned: &[PlannedNotification]) -> Result<usize> {
        if planned.is_empty() {
            return Ok(0);
        }

        let now = Utc::now();
        let rows: Vec<notification::ActiveModel> = planned
            .iter()
            .map(|p| notification::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                watch_id: ActiveValue::Set(p.watch_id),
                item_id: ActiveValue::Set(p.item_id.clone()),
                product_name: ActiveValue::Set(p.product_name.clone()),
                product_price: ActiveValue::Set(p.product_price),
                product_image: ActiveValue::Set(p.product_image.clone()),
                created_at: ActiveValue::Set(now),
            })
            .collect();

        notification::Entity::insert_many(rows).exec(&self.db).await?;
        Ok(planned.len())
    }
}
