// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::adapters::InboundRequest;
use crate::config::settings::Settings;
use crate::domain::models::integration::SourceType;
use crate::domain::use_cases::process_webhook::{ProcessWebhookUseCase, WebhookOutcome};
use crate::infrastructure::metrics;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Path},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

/// 在来源的同步预算内执行处理流程
///
/// 预算由用例内部施加：超出预算的发送按投递失败记录并转入重试
async fn process(
    use_case: &ProcessWebhookUseCase,
    settings: &Settings,
    source: SourceType,
    integration_id: &str,
    headers: &HeaderMap,
    body: &[u8],
) -> WebhookOutcome {
    let budget = settings.webhook.timeout_for(source);
    let request = InboundRequest::new(headers, body);
    use_case.execute(source, integration_id, request, budget).await
}

fn reply(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

/// 需要准确状态码的来源（Jira、Alertmanager）的响应映射
fn strict_reply(outcome: WebhookOutcome, delivered: impl FnOnce(usize) -> Value) -> Response {
    match outcome {
        WebhookOutcome::Delivered { matched, .. } => reply(StatusCode::OK, delivered(matched)),
        WebhookOutcome::Filtered | WebhookOutcome::Rejected | WebhookOutcome::Unsupported(_) => {
            reply(StatusCode::OK, json!({"status": "ok", "filtered": true}))
        }
        WebhookOutcome::Unresolved(e) if e.is_not_found() => reply(
            StatusCode::NOT_FOUND,
            json!({"error": "integration not found"}),
        ),
        WebhookOutcome::Malformed(_) => {
            reply(StatusCode::BAD_REQUEST, json!({"error": "invalid payload"}))
        }
        WebhookOutcome::DeliveryFailed {
            retry_scheduled, ..
        } => reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"error": "failed to deliver message", "retry_scheduled": retry_scheduled}),
        ),
        WebhookOutcome::Unresolved(_) => reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"error": "internal server error"}),
        ),
        WebhookOutcome::TimedOut => reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"error": "processing timed out"}),
        ),
    }
}

/// GitLab Webhook
///
/// GitLab 在连续收到非 2xx 响应后会停用 Webhook，因此无论内部结果如何都返回 200，
/// 包括请求体超限或读取失败
pub async fn gitlab_webhook(
    Extension(use_case): Extension<Arc<ProcessWebhookUseCase>>,
    Extension(settings): Extension<Arc<Settings>>,
    Path(integration_id): Path<String>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(e) => {
            warn!(%integration_id, status = %e.status(), "Failed to read GitLab webhook body");
            metrics::record_webhook(SourceType::Gitlab.as_str(), "unreadable");
            return reply(StatusCode::OK, json!({"status": "ok", "filtered": true}));
        }
    };

    let outcome = process(
        &use_case,
        &settings,
        SourceType::Gitlab,
        &integration_id,
        &headers,
        &body,
    )
    .await;

    // 只有被过滤或丢弃的事件才带 filtered 标记
    let attempted = matches!(
        outcome,
        WebhookOutcome::Delivered { .. }
            | WebhookOutcome::DeliveryFailed { .. }
            | WebhookOutcome::TimedOut
    );
    if attempted {
        reply(StatusCode::OK, json!({"status": "ok"}))
    } else {
        reply(StatusCode::OK, json!({"status": "ok", "filtered": true}))
    }
}

/// Jira Webhook
pub async fn jira_webhook(
    Extension(use_case): Extension<Arc<ProcessWebhookUseCase>>,
    Extension(settings): Extension<Arc<Settings>>,
    Path(integration_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let outcome = process(
        &use_case,
        &settings,
        SourceType::Jira,
        &integration_id,
        &headers,
        &body,
    )
    .await;
    strict_reply(outcome, |_| json!({"status": "ok"}))
}

/// Alertmanager Webhook
///
/// 成功时返回实际发送的告警条数
pub async fn alertmanager_webhook(
    Extension(use_case): Extension<Arc<ProcessWebhookUseCase>>,
    Extension(settings): Extension<Arc<Settings>>,
    Path(integration_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let outcome = process(
        &use_case,
        &settings,
        SourceType::Alertmanager,
        &integration_id,
        &headers,
        &body,
    )
    .await;
    strict_reply(outcome, |matched| json!({"status": "ok", "alerts_sent": matched}))
}
