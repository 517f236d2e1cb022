use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_table_types::Migration),
            Box::new(m20240601_000002_create_table_inventory::Migration),
            Box::new(m20240601_000003_create_bottles::Migration),
            Box::new(m20240601_000004_create_pricing_rules::Migration),
            Box::new(m20240601_000005_create_reservations::Migration),
            Box::new(m20240601_000006_create_notifications::Migration),
            Box::new(m20240601_000007_create_settings::Migration),
        ]
    }
}

mod m20240601_000001_create_table_types {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000001_create_table_types"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(TableTypes::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(TableTypes::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(TableTypes::Name).string().not_null())
                        .col(
                            ColumnDef::new(TableTypes::Slug)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(TableTypes::Description).text().not_null())
                        .col(ColumnDef::new(TableTypes::ShortDescription).string().not_null())
                        .col(ColumnDef::new(TableTypes::Capacity).integer().not_null())
                        .col(
                            ColumnDef::new(TableTypes::BaseMinimumSpend)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(ColumnDef::new(TableTypes::Amenities).json().not_null())
                        .col(ColumnDef::new(TableTypes::Images).json().not_null())
                        .col(ColumnDef::new(TableTypes::Section).string().null())
                        .col(
                            ColumnDef::new(TableTypes::SortOrder)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(TableTypes::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(TableTypes::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TableTypes::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(TableTypes::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum TableTypes {
        Table,
        Id,
        Name,
        Slug,
        Description,
        ShortDescription,
        Capacity,
        BaseMinimumSpend,
        Amenities,
        Images,
        Section,
        SortOrder,
        Active,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240601_000002_create_table_inventory {
    use super::m20240601_000001_create_table_types::TableTypes;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000002_create_table_inventory"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(TableInventory::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(TableInventory::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(TableInventory::TableTypeId).uuid().not_null())
                        .col(ColumnDef::new(TableInventory::Date).date().not_null())
                        .col(ColumnDef::new(TableInventory::TotalCount).integer().not_null())
                        .col(ColumnDef::new(TableInventory::Available).integer().not_null())
                        .col(
                            ColumnDef::new(TableInventory::Blocked)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(TableInventory::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TableInventory::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_table_inventory_table_type_id")
                                .from(TableInventory::Table, TableInventory::TableTypeId)
                                .to(TableTypes::Table, TableTypes::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            // one row per table type per calendar day
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_table_inventory_type_date")
                        .table(TableInventory::Table)
                        .col(TableInventory::TableTypeId)
                        .col(TableInventory::Date)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_table_inventory_date")
                        .table(TableInventory::Table)
                        .col(TableInventory::Date)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(TableInventory::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum TableInventory {
        Table,
        Id,
        TableTypeId,
        Date,
        TotalCount,
        Available,
        Blocked,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240601_000003_create_bottles {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000003_create_bottles"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Bottles::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Bottles::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Bottles::Sku).string().null())
                        .col(ColumnDef::new(Bottles::Name).string().not_null())
                        .col(ColumnDef::new(Bottles::Brand).string().not_null())
                        .col(ColumnDef::new(Bottles::Category).string().not_null())
                        .col(ColumnDef::new(Bottles::Size).string().not_null())
                        .col(ColumnDef::new(Bottles::Price).decimal_len(16, 4).not_null())
                        .col(ColumnDef::new(Bottles::Description).text().null())
                        .col(ColumnDef::new(Bottles::Image).string().null())
                        .col(
                            ColumnDef::new(Bottles::InStock)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Bottles::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Bottles::SortOrder)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Bottles::OnHand)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Bottles::Par).integer().not_null().default(0))
                        .col(
                            ColumnDef::new(Bottles::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Bottles::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_bottles_sku")
                        .table(Bottles::Table)
                        .col(Bottles::Sku)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_bottles_category")
                        .table(Bottles::Table)
                        .col(Bottles::Category)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Bottles::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Bottles {
        Table,
        Id,
        Sku,
        Name,
        Brand,
        Category,
        Size,
        Price,
        Description,
        Image,
        InStock,
        Active,
        SortOrder,
        OnHand,
        Par,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240601_000004_create_pricing_rules {
    use super::m20240601_000001_create_table_types::TableTypes;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000004_create_pricing_rules"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PricingRules::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PricingRules::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PricingRules::TableTypeId).uuid().not_null())
                        .col(ColumnDef::new(PricingRules::DayType).string_len(20).not_null())
                        .col(ColumnDef::new(PricingRules::EventName).string().null())
                        .col(ColumnDef::new(PricingRules::StartDate).date().null())
                        .col(ColumnDef::new(PricingRules::EndDate).date().null())
                        .col(
                            ColumnDef::new(PricingRules::Priority)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PricingRules::MinimumSpend)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PricingRules::DepositRate)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PricingRules::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(PricingRules::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PricingRules::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_pricing_rules_table_type_id")
                                .from(PricingRules::Table, PricingRules::TableTypeId)
                                .to(TableTypes::Table, TableTypes::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_pricing_rules_table_type_id")
                        .table(PricingRules::Table)
                        .col(PricingRules::TableTypeId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PricingRules::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum PricingRules {
        Table,
        Id,
        TableTypeId,
        DayType,
        EventName,
        StartDate,
        EndDate,
        Priority,
        MinimumSpend,
        DepositRate,
        Active,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240601_000005_create_reservations {
    use super::m20240601_000001_create_table_types::TableTypes;
    use super::m20240601_000003_create_bottles::Bottles;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000005_create_reservations"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Reservations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Reservations::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Reservations::ConfirmationCode)
                                .string_len(16)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Reservations::TableTypeId).uuid().not_null())
                        .col(
                            ColumnDef::new(Reservations::Date)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Reservations::CustomerName).string().not_null())
                        .col(ColumnDef::new(Reservations::CustomerEmail).string().not_null())
                        .col(ColumnDef::new(Reservations::CustomerPhone).string().not_null())
                        .col(ColumnDef::new(Reservations::PartySize).integer().not_null())
                        .col(ColumnDef::new(Reservations::Occasion).string().null())
                        .col(ColumnDef::new(Reservations::SpecialRequests).text().null())
                        .col(ColumnDef::new(Reservations::Status).string_len(20).not_null())
                        .col(
                            ColumnDef::new(Reservations::MinimumSpend)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Reservations::BottleSubtotal)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Reservations::DepositAmount)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Reservations::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Reservations::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_reservations_table_type_id")
                                .from(Reservations::Table, Reservations::TableTypeId)
                                .to(TableTypes::Table, TableTypes::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            for (name, col) in [
                ("idx_reservations_table_type_id", Reservations::TableTypeId),
                ("idx_reservations_date", Reservations::Date),
                ("idx_reservations_status", Reservations::Status),
                ("idx_reservations_customer_email", Reservations::CustomerEmail),
            ] {
                manager
                    .create_index(
                        Index::create()
                            .if_not_exists()
                            .name(name)
                            .table(Reservations::Table)
                            .col(col)
                            .to_owned(),
                    )
                    .await?;
            }

            manager
                .create_table(
                    Table::create()
                        .table(ReservationBottles::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ReservationBottles::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ReservationBottles::ReservationId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ReservationBottles::BottleId).uuid().not_null())
                        .col(ColumnDef::new(ReservationBottles::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(ReservationBottles::PricePerUnit)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ReservationBottles::TotalPrice)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_reservation_bottles_reservation_id")
                                .from(ReservationBottles::Table, ReservationBottles::ReservationId)
                                .to(Reservations::Table, Reservations::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_reservation_bottles_bottle_id")
                                .from(ReservationBottles::Table, ReservationBottles::BottleId)
                                .to(Bottles::Table, Bottles::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_reservation_bottles_reservation_id")
                        .table(ReservationBottles::Table)
                        .col(ReservationBottles::ReservationId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_reservation_bottles_bottle_id")
                        .table(ReservationBottles::Table)
                        .col(ReservationBottles::BottleId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ReservationBottles::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Reservations::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Reservations {
        Table,
        Id,
        ConfirmationCode,
        TableTypeId,
        Date,
        CustomerName,
        CustomerEmail,
        CustomerPhone,
        PartySize,
        Occasion,
        SpecialRequests,
        Status,
        MinimumSpend,
        BottleSubtotal,
        DepositAmount,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum ReservationBottles {
        Table,
        Id,
        ReservationId,
        BottleId,
        Quantity,
        PricePerUnit,
        TotalPrice,
    }
}

mod m20240601_000006_create_notifications {
    use super::m20240601_000005_create_reservations::Reservations;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000006_create_notifications"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Notifications::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Notifications::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Notifications::ReservationId).uuid().not_null())
                        .col(
                            ColumnDef::new(Notifications::NotificationType)
                                .string_len(20)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Notifications::Recipient).string().not_null())
                        .col(ColumnDef::new(Notifications::Subject).string().not_null())
                        .col(ColumnDef::new(Notifications::Content).text().not_null())
                        .col(
                            ColumnDef::new(Notifications::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_notifications_reservation_id")
                                .from(Notifications::Table, Notifications::ReservationId)
                                .to(Reservations::Table, Reservations::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_notifications_reservation_id")
                        .table(Notifications::Table)
                        .col(Notifications::ReservationId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Notifications::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Notifications {
        Table,
        Id,
        ReservationId,
        NotificationType,
        Recipient,
        Subject,
        Content,
        CreatedAt,
    }
}

mod m20240601_000007_create_settings {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000007_create_settings"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Settings::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Settings::Key)
                                .string_len(100)
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Settings::Value).json().not_null())
                        .col(ColumnDef::new(Settings::Description).string().null())
                        .col(
                            ColumnDef::new(Settings::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Settings::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Settings {
        Table,
        Key,
        Value,
        Description,
        UpdatedAt,
    }
}
