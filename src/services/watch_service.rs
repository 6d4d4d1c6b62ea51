use chrono::Utc;
use sea_orm::{
    ActiveModelTrait,
    ActiveValue,
    ColumnTrait,
    DatabaseConnection,
    EntityTrait,
    QueryFilter,
    QueryOrder,
};
use uuid::Uuid;

use crate::db::entity::watch;
use crate::error::{ AppError, Result };
use crate::matching::normalize_article_number;
use crate::stores;

#[derive(Clone)]
pub struct WatchService {
    db: DatabaseConnection,
}

#[derive(Debug, Clone)]
pub struct CreateWatchRequest {
    pub email: String,
    pub store_id: String,
    pub article_number: String,
    pub desired_quantity: Option<i32>,
}

impl WatchService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a new watch. The article number must normalize to 8 digits;
    /// the desired quantity is coerced to at least 1.
    pub async fn create_watch(&self, req: CreateWatchRequest) -> Result<watch::Model> {
        let store = stores
            ::get_store(&req.store_id)
            .ok_or_else(|| AppError::UnknownStore(req.store_id.clone()))?;

        let normalized = normalize_article_number(&req.article_number);
        if normalized.len() != 8 {
            return Err(
                AppError::InvalidInput("Article number must contain exactly 8 digits".to_string())
            );
        }

        let desired_quantity = req.desired_quantity.filter(|&q| q > 0).unwrap_or(1);
        let now = Utc::now();

        let watch = watch::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            email: ActiveValue::Set(req.email),
            store_id: ActiveValue::Set(req.store_id),
            store_name: ActiveValue::Set(store.name.to_string()),
            article_number: ActiveValue::Set(req.article_number),
            desired_quantity: ActiveValue::Set(desired_quantity),
            is_active: ActiveValue::Set(true),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        };

        let watch = watch.insert(&self.db).await?;
        Ok(watch)
    }

    /// List a user's active watches, newest first.
    pub async fn list_watches(&self, email: &str) -> Result<Vec<watch::Model>> {
        let watches = watch::Entity
            ::find()
            .filter(watch::Column::Email.eq(email))
            .filter(watch::Column::IsActive.eq(true))
            .order_by_desc(watch::Column::CreatedAt)
            .all(&self.db).await?;
        Ok(watches)
    }

    /// Get one watch, scoped to its owner.
    pub async fn get_watch(&self, id: Uuid, email: &str) -> Result<watch::Model> {
        watch::Entity
            ::find_by_id(id)
            .filter(watch::Column::Email.eq(email))
            .one(&self.db).await?
            .ok_or(AppError::WatchNotFound)
    }

    /// Soft-deactivate a watch, scoped to its owner.
    pub async fn deactivate_watch(&self, id: Uuid, email: &str) -> Result<()> {
        let watch = self.get_watch(id, email).await?;

        let mut active: watch::ActiveModel = watch.into();
        active.is_active = ActiveValue::Set(false);
        active.updated_at = ActiveValue::Set(Utc::now());
        active.update(&self.db).await?;

        Ok(())
    }

    /// All active watches, across all users. Failure here aborts a
    /// polling pass; it is the only fatal condition in a run.
    pub async fn get_active_watches(&self) -> Result<Vec<watch::Model>> {
        let watches = watch::Entity
            ::find()
            .filter(watch::Column::IsActive.eq(true))
            .all(&self.db).await?;
        Ok(watches)
    }

    /// Active watches targeting one store.
    pub async fn get_active_watches_for_store(&self, store_id: &str) -> Result<Vec<watch::Model>> {
        let watches = watch::Entity
            ::find()
            .filter(watch::Column::IsActive.eq(true))
            .filter(watch::Column::StoreId.eq(store_id))
            .all(&self.db).await?;
        Ok(watches)
    }

    /// Count of a user's active watches, for the account view.
    pub async fn count_active_watches(&self, email: &str) -> Result<u64> {
        use sea_orm::PaginatorTrait;

        let count = watch::Entity
            ::find()
            .filter(watch::Column::Email.eq(email))
            .filter(watch::Column::IsActive.eq(true))
            .count(&self.db).await?;
        Ok(count)
    }
}
