use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_users_table::Migration),
            Box::new(m20250301_000002_create_pickup_points_table::Migration),
            Box::new(m20250301_000003_create_receptions_table::Migration),
            Box::new(m20250301_000004_create_products_table::Migration),
        ]
    }
}

// Migration implementations

mod m20250301_000001_create_users_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000001_create_users_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Users::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Users::Email)
                                .string_len(255)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::PasswordHash).string_len(255).not_null())
                        .col(ColumnDef::new(Users::Role).string_len(32).not_null())
                        .col(
                            ColumnDef::new(Users::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Users {
        Table,
        Id,
        Email,
        PasswordHash,
        Role,
        CreatedAt,
    }
}

mod m20250301_000002_create_pickup_points_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000002_create_pickup_points_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PickupPoints::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PickupPoints::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PickupPoints::City).string_len(64).not_null())
                        .col(
                            ColumnDef::new(PickupPoints::RegistrationDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PickupPoints::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum PickupPoints {
        Table,
        Id,
        City,
        RegistrationDate,
    }
}

mod m20250301_000003_create_receptions_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000003_create_receptions_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Receptions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Receptions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Receptions::PvzId).uuid().not_null())
                        .col(
                            ColumnDef::new(Receptions::DateTime)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Receptions::Status).string_len(32).not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_receptions_pvz_id")
                                .from(Receptions::Table, Receptions::PvzId)
                                .to(PickupPoints::Table, PickupPoints::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_receptions_pvz_id")
                        .table(Receptions::Table)
                        .col(Receptions::PvzId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_receptions_date_time")
                        .table(Receptions::Table)
                        .col(Receptions::DateTime)
                        .to_owned(),
                )
                .await?;

            // At most one open reception per pickup point. A partial unique
            // index makes the loser of a concurrent open/open race fail with
            // a unique constraint violation instead of corrupting state.
            // sea-query's index builder has no partial-index support, so this
            // is raw SQL; the statement is valid on both SQLite and Postgres.
            manager
                .get_connection()
                .execute_unprepared(
                    "CREATE UNIQUE INDEX IF NOT EXISTS ux_receptions_open_per_pvz \
                     ON receptions (pvz_id) WHERE status = 'open'",
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Receptions::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Receptions {
        Table,
        Id,
        PvzId,
        DateTime,
        Status,
    }

    #[derive(DeriveIden)]
    enum PickupPoints {
        Table,
        Id,
    }
}

mod m20250301_000004_create_products_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000004_create_products_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Products::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Products::ReceptionId).uuid().not_null())
                        .col(ColumnDef::new(Products::Type).string_len(32).not_null())
                        .col(
                            ColumnDef::new(Products::DateTime)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Products::Seq).big_integer().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_products_reception_id")
                                .from(Products::Table, Products::ReceptionId)
                                .to(Receptions::Table, Receptions::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_reception_id")
                        .table(Products::Table)
                        .col(Products::ReceptionId)
                        .to_owned(),
                )
                .await?;

            // Insertion order within a reception must be unambiguous.
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("ux_products_reception_seq")
                        .table(Products::Table)
                        .col(Products::ReceptionId)
                        .col(Products::Seq)
                        .unique()
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Products {
        Table,
        Id,
        ReceptionId,
        Type,
        DateTime,
        Seq,
    }

    #[derive(DeriveIden)]
    enum Receptions {
        Table,
        Id,
    }
}
