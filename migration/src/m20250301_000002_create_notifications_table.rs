use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(Notifications::Table)
                .if_not_exists()
                .col(ColumnDef::new(Notifications::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(Notifications::WatchId).uuid().not_null())
                .col(ColumnDef::new(Notifications::ItemId).string().not_null())
                .col(ColumnDef::new(Notifications::ProductName).string().not_null())
                .col(ColumnDef::new(Notifications::ProductPrice).double().not_null())
                .col(ColumnDef::new(Notifications::ProductImage).string())
                .col(ColumnDef::new(Notifications::CreatedAt).timestamp_with_time_zone().not_null())
                .to_owned()
        ).await?;

        // Ledger lookups are always by (watch_id, item_id)
        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_notifications_watch_item")
                .table(Notifications::Table)
                .col(Notifications::WatchId)
                .col(Notifications::ItemId)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Notifications::Table).to_owned()).await
    }
}

#[derive(Iden)]
enum Notifications {
    Table,
    Id,
    WatchId,
    ItemId,
    ProductName,
    ProductPrice,
    ProductImage,
    CreatedAt,
}
