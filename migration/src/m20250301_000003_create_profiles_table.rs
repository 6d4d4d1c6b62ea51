use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(Profiles::Table)
                .if_not_exists()
                .col(ColumnDef::new(Profiles::UserId).string().not_null().primary_key())
                .col(ColumnDef::new(Profiles::Email).string().not_null())
                .col(ColumnDef::new(Profiles::Street).string())
                .col(ColumnDef::new(Profiles::HouseNumber).string())
                .col(ColumnDef::new(Profiles::PostalCode).string())
                .col(ColumnDef::new(Profiles::City).string())
                .col(ColumnDef::new(Profiles::AddressLat).double())
                .col(ColumnDef::new(Profiles::AddressLng).double())
                .col(ColumnDef::new(Profiles::GasUsage).double())
                .col(ColumnDef::new(Profiles::FuelPrice).double())
                .col(ColumnDef::new(Profiles::CreatedAt).timestamp_with_time_zone().not_null())
                .col(ColumnDef::new(Profiles::UpdatedAt).timestamp_with_time_zone().not_null())
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_profiles_email")
                .table(Profiles::Table)
                .col(Profiles::Email)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Profiles::Table).to_owned()).await
    }
}

#[derive(Iden)]
enum Profiles {
    Table,
    UserId,
    Email,
    Street,
    HouseNumber,
    PostalCode,
    City,
    AddressLat,
    AddressLng,
    GasUsage,
    FuelPrice,
    CreatedAt,
    UpdatedAt,
}
