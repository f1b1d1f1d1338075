// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::Settings;
use crate::domain::repositories::api_key_repository::ApiKeyRepository;
use crate::domain::use_cases::manage_integration::ManageIntegrationUseCase;
use crate::domain::use_cases::process_webhook::ProcessWebhookUseCase;
use crate::presentation::handlers::{integration_handler, webhook_handler};
use crate::presentation::middleware::auth_middleware::{auth_middleware, AuthState};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// 路由依赖
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub webhooks: Arc<ProcessWebhookUseCase>,
    pub integrations: Arc<ManageIntegrationUseCase>,
    pub api_keys: Arc<dyn ApiKeyRepository>,
}

/// 创建应用路由
///
/// # 返回值
///
/// 返回配置好的路由：公开的健康检查、入站 Webhook 和需要 API 密钥的管理接口
pub fn routes(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/v1/version", get(version));

    let max_body_bytes = state.settings.webhook.max_body_bytes;

    let webhook_routes = Router::new()
        .route("/webhook/{id}/jira", post(webhook_handler::jira_webhook))
        .route(
            "/webhook/{id}/alertmanager",
            post(webhook_handler::alertmanager_webhook),
        )
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_bytes));

    // GitLab 必须始终得到 2xx，超限交给提取器拒绝，由处理器改写为 200
    let gitlab_routes = Router::new()
        .route("/webhook/{id}/gitlab", post(webhook_handler::gitlab_webhook))
        .layer(DefaultBodyLimit::max(max_body_bytes));

    let webhook_routes = webhook_routes
        .merge(gitlab_routes)
        .layer(Extension(state.webhooks.clone()));

    let auth_state = AuthState {
        api_keys: state.api_keys.clone(),
    };

    let protected_routes = Router::new()
        .route(
            "/api/v1/integrations",
            get(integration_handler::list_integrations)
                .post(integration_handler::create_integration),
        )
        .route(
            "/api/v1/integrations/{id}",
            get(integration_handler::get_integration)
                .put(integration_handler::update_integration)
                .delete(integration_handler::delete_integration),
        )
        .route(
            "/api/v1/integrations/{id}/logs",
            get(integration_handler::integration_logs),
        )
        .route(
            "/api/v1/integrations/{id}/test",
            post(integration_handler::test_integration),
        )
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ))
        .layer(Extension(state.integrations.clone()));

    Router::new()
        .merge(public_routes)
        .merge(webhook_routes)
        .merge(protected_routes)
        .layer(Extension(state.settings.clone()))
        .layer(TraceLayer::new_for_http())
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回"OK"字符串
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息端点
///
/// # 返回值
///
/// 返回应用版本号
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
