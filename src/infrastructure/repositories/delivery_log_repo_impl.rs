// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::delivery_log::{DeliveryLog, DeliveryPhase, NewDeliveryLog};
use crate::domain::repositories::delivery_log_repository::DeliveryLogRepository;
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::database::entities::delivery_log;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::*;
use std::sync::Arc;
use uuid::Uuid;

/// 投递日志仓库实现
#[derive(Clone)]
pub struct DeliveryLogRepoImpl {
    db: Arc<DatabaseConnection>,
}

impl DeliveryLogRepoImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DeliveryLogRepository for DeliveryLogRepoImpl {
    async fn create(&self, log: &NewDeliveryLog) -> Result<DeliveryLog, RepositoryError> {
        let model = delivery_log::ActiveModel {
            id: NotSet,
            integration_id: Set(log.integration_id),
            source_event_id: Set(log.source_event_id.clone()),
            request_payload: Set(log.request_payload.clone()),
            payload_digest: Set(log.payload_digest.clone()),
            response_status: Set(log.response_status),
            response_body: Set(log.response_body.clone()),
            error: Set(log.error.clone()),
            phase: Set(log.phase.as_str().to_string()),
            attempts: Set(log.attempts),
            delivered_at: Set(Utc::now().into()),
            duration_ms: Set(log.duration_ms),
        };

        let saved = model.insert(self.db.as_ref()).await?;
        Ok(saved.into())
    }

    async fn list_by_integration(
        &self,
        integration_id: Uuid,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<DeliveryLog>, u64), RepositoryError> {
        let query = delivery_log::Entity::find()
            .filter(delivery_log::Column::IntegrationId.eq(integration_id));

        let total = query.clone().count(self.db.as_ref()).await?;
        let models = query
            .order_by_desc(delivery_log::Column::DeliveredAt)
            .order_by_desc(delivery_log::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await?;

        Ok((models.into_iter().map(Into::into).collect(), total))
    }
}

impl From<delivery_log::Model> for DeliveryLog {
    fn from(model: delivery_log::Model) -> Self {
        Self {
            id: model.id,
            integration_id: model.integration_id,
            source_event_id: model.source_event_id,
            request_payload: model.request_payload,
            payload_digest: model.payload_digest,
            response_status: model.response_status,
            response_body: model.response_body,
            error: model.error,
            phase: model.phase.parse().unwrap_or(DeliveryPhase::Initial),
            attempts: model.attempts,
            delivered_at: model.delivered_at.into(),
            duration_ms: model.duration_ms,
        }
    }
}
