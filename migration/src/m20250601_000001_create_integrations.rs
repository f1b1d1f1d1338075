// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Integrations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Integrations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Integrations::UserId).string().not_null())
                    .col(ColumnDef::new(Integrations::Name).string().not_null())
                    .col(ColumnDef::new(Integrations::SourceType).string().not_null())
                    .col(ColumnDef::new(Integrations::SourceConfig).json().not_null())
                    .col(
                        ColumnDef::new(Integrations::DestinationType)
                            .string()
                            .not_null()
                            .default("yandex_messenger"),
                    )
                    .col(
                        ColumnDef::new(Integrations::DestinationConfig)
                            .json()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Integrations::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Integrations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Integrations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_integrations_user")
                    .table(Integrations::Table)
                    .col(Integrations::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Integrations::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Integrations {
    Table,
    Id,
    UserId,
    Name,
    SourceType,
    SourceConfig,
    DestinationType,
    DestinationConfig,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
