// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::config::settings::Settings;
use crate::domain::models::integration::{Integration, IntegrationView, SourceType};
use crate::domain::use_cases::manage_integration::{
    IntegrationChanges, ManageIntegrationUseCase, NewIntegration,
};
use crate::presentation::errors::AppError;
use crate::presentation::extractors::user_id::UserId;

/// 创建集成的请求DTO
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateIntegrationRequest {
    #[validate(length(min = 1, max = 255, message = "name cannot be empty"))]
    pub name: String,
    pub source_type: SourceType,
    #[serde(default)]
    pub source_config: Value,
    #[validate(length(min = 1, message = "chat_id cannot be empty"))]
    pub chat_id: String,
    #[validate(length(min = 1, message = "bot_token cannot be empty"))]
    pub bot_token: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// 更新集成的请求DTO，缺省字段保持原值
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateIntegrationRequest {
    #[validate(length(min = 1, max = 255, message = "name cannot be empty"))]
    pub name: Option<String>,
    pub source_config: Option<Value>,
    pub chat_id: Option<String>,
    pub bot_token: Option<String>,
    pub is_active: Option<bool>,
}

/// 日志分页参数
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogQuery {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

fn view(settings: &Settings, integration: &Integration) -> IntegrationView {
    integration.to_view(settings.webhook_url(&integration.id.to_string(), integration.source_type))
}

/// 列出当前用户的集成
pub async fn list_integrations(
    Extension(use_case): Extension<Arc<ManageIntegrationUseCase>>,
    Extension(settings): Extension<Arc<Settings>>,
    user: UserId,
) -> Result<Json<Value>, AppError> {
    let integrations = use_case.list(user.as_str()).await?;
    let views: Vec<_> = integrations.iter().map(|i| view(&settings, i)).collect();
    Ok(Json(json!({ "total": views.len(), "data": views })))
}

/// 创建集成
pub async fn create_integration(
    Extension(use_case): Extension<Arc<ManageIntegrationUseCase>>,
    Extension(settings): Extension<Arc<Settings>>,
    user: UserId,
    Json(request): Json<CreateIntegrationRequest>,
) -> Result<(StatusCode, Json<IntegrationView>), AppError> {
    request.validate()?;

    let created = use_case
        .create(
            user.as_str(),
            NewIntegration {
                name: request.name,
                source_type: request.source_type,
                source_config: request.source_config,
                chat_id: request.chat_id,
                bot_token: request.bot_token,
                is_active: request.is_active,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(view(&settings, &created))))
}

pub async fn get_integration(
    Extension(use_case): Extension<Arc<ManageIntegrationUseCase>>,
    Extension(settings): Extension<Arc<Settings>>,
    user: UserId,
    Path(id): Path<Uuid>,
) -> Result<Json<IntegrationView>, AppError> {
    let integration = use_case.get(user.as_str(), id).await?;
    Ok(Json(view(&settings, &integration)))
}

/// 更新集成
///
/// `bot_token` 为空或为 `***` 时保留已存储的凭据
pub async fn update_integration(
    Extension(use_case): Extension<Arc<ManageIntegrationUseCase>>,
    Extension(settings): Extension<Arc<Settings>>,
    user: UserId,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateIntegrationRequest>,
) -> Result<Json<IntegrationView>, AppError> {
    request.validate()?;

    let updated = use_case
        .update(
            user.as_str(),
            id,
            IntegrationChanges {
                name: request.name,
                source_config: request.source_config,
                chat_id: request.chat_id,
                bot_token: request.bot_token,
                is_active: request.is_active,
            },
        )
        .await?;

    Ok(Json(view(&settings, &updated)))
}

pub async fn delete_integration(
    Extension(use_case): Extension<Arc<ManageIntegrationUseCase>>,
    user: UserId,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    use_case.delete(user.as_str(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// 分页查询投递日志
pub async fn integration_logs(
    Extension(use_case): Extension<Arc<ManageIntegrationUseCase>>,
    user: UserId,
    Path(id): Path<Uuid>,
    Query(query): Query<LogQuery>,
) -> Result<Json<Value>, AppError> {
    let page = use_case
        .logs(user.as_str(), id, query.limit, query.offset)
        .await?;

    Ok(Json(json!({
        "data": page.logs,
        "total": page.total,
        "limit": page.limit,
        "offset": page.offset,
    })))
}

/// 发送测试消息
pub async fn test_integration(
    Extension(use_case): Extension<Arc<ManageIntegrationUseCase>>,
    user: UserId,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let receipt = use_case.send_test(user.as_str(), id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Test message sent",
        "message_id": receipt.message_id,
    })))
}
