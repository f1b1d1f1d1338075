// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DbBackend;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DeliveryLogs::Table)
                    .if_not_exists()
                    .col(id_column(manager.get_database_backend()))
                    .col(ColumnDef::new(DeliveryLogs::IntegrationId).uuid().not_null())
                    .col(ColumnDef::new(DeliveryLogs::SourceEventId).string().not_null())
                    .col(ColumnDef::new(DeliveryLogs::RequestPayload).json().not_null())
                    .col(ColumnDef::new(DeliveryLogs::PayloadDigest).string().not_null())
                    .col(
                        ColumnDef::new(DeliveryLogs::ResponseStatus)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(DeliveryLogs::ResponseBody).text().not_null())
                    .col(ColumnDef::new(DeliveryLogs::Error).text().not_null())
                    .col(
                        ColumnDef::new(DeliveryLogs::Phase)
                            .string()
                            .not_null()
                            .default("initial"),
                    )
                    .col(
                        ColumnDef::new(DeliveryLogs::Attempts)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(DeliveryLogs::DeliveredAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(DeliveryLogs::DurationMs)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_delivery_logs_integration_time")
                    .table(DeliveryLogs::Table)
                    .col(DeliveryLogs::IntegrationId)
                    .col(DeliveryLogs::DeliveredAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DeliveryLogs::Table).to_owned())
            .await
    }
}

/// SQLite 只允许 INTEGER 主键自增，两者都是 64 位
fn id_column(backend: DbBackend) -> ColumnDef {
    let mut column = ColumnDef::new(DeliveryLogs::Id);
    match backend {
        DbBackend::Sqlite => column.integer(),
        _ => column.big_integer(),
    };
    column.not_null().auto_increment().primary_key().to_owned()
}

#[derive(DeriveIden)]
enum DeliveryLogs {
    Table,
    Id,
    IntegrationId,
    SourceEventId,
    RequestPayload,
    PayloadDigest,
    ResponseStatus,
    ResponseBody,
    Error,
    Phase,
    Attempts,
    DeliveredAt,
    DurationMs,
}
