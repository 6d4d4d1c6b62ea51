use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(Watches::Table)
                .if_not_exists()
                .col(ColumnDef::new(Watches::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(Watches::Email).string().not_null())
                .col(ColumnDef::new(Watches::StoreId).string().not_null())
                .col(ColumnDef::new(Watches::StoreName).string().not_null())
                .col(ColumnDef::new(Watches::ArticleNumber).string().not_null())
                .col(ColumnDef::new(Watches::DesiredQuantity).integer().not_null().default(1))
                .col(ColumnDef::new(Watches::IsActive).boolean().not_null().default(true))
                .col(ColumnDef::new(Watches::CreatedAt).timestamp_with_time_zone().not_null())
                .col(ColumnDef::new(Watches::UpdatedAt).timestamp_with_time_zone().not_null())
                .to_owned()
        ).await?;

        // Create indexes
        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_watches_email")
                .table(Watches::Table)
                .col(Watches::Email)
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_watches_is_active")
                .table(Watches::Table)
                .col(Watches::IsActive)
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_watches_store_id")
                .table(Watches::Table)
                .col(Watches::StoreId)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Watches::Table).to_owned()).await
    }
}

#[derive(Iden)]
enum Watches {
    Table,
    Id,
    Email,
    StoreId,
    StoreName,
    ArticleNumber,
    DesiredQuantity,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
