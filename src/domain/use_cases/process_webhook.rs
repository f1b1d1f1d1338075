// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::adapters::{AdapterError, AdapterRegistry, InboundRequest};
use crate::domain::models::delivery_log::DeliveryPhase;
use crate::domain::models::integration::SourceType;
use crate::domain::services::delivery_client::{DeliveryClient, DeliveryError, DeliveryReceipt};
use crate::domain::services::delivery_recorder::{AuditContext, DeliveryOutcome, DeliveryRecorder};
use crate::domain::services::format_engine::FormatEngine;
use crate::domain::services::integration_resolver::{IntegrationResolver, ResolveError};
use crate::infrastructure::metrics;
use crate::workers::retry_supervisor::{RetryJob, RetryQueue};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, error, info, warn};

/// 一次入站 Webhook 调用的处理结果
#[derive(Debug)]
pub enum WebhookOutcome {
    /// 集成不存在、已停用、来源不符或凭据无法解密
    Unresolved(ResolveError),
    /// 共享密钥不匹配
    Rejected,
    /// 负载无法解码
    Malformed(String),
    /// 来源声明了不支持的事件类型
    Unsupported(String),
    /// 没有消息需要发送
    Filtered,
    /// 全部消息首次投递成功
    Delivered { messages: usize, matched: usize },
    /// 同步预算在投递开始前已耗尽
    TimedOut,
    /// 首次投递失败（含超出同步预算），剩余消息已交给重试队列
    DeliveryFailed {
        error: DeliveryError,
        matched: usize,
        retry_scheduled: bool,
    },
}

impl WebhookOutcome {
    /// 指标标签
    pub fn label(&self) -> &'static str {
        match self {
            WebhookOutcome::Unresolved(e) if e.is_not_found() => "not_found",
            WebhookOutcome::Unresolved(_) => "error",
            WebhookOutcome::Rejected => "rejected",
            WebhookOutcome::Malformed(_) => "malformed",
            WebhookOutcome::Unsupported(_) => "unsupported",
            WebhookOutcome::Filtered => "filtered",
            WebhookOutcome::TimedOut => "timeout",
            WebhookOutcome::Delivered { .. } => "delivered",
            WebhookOutcome::DeliveryFailed { .. } => "delivery_failed",
        }
    }
}

/// 处理入站 Webhook 用例
///
/// 解析集成、鉴权、解码、过滤格式化后同步完成首次投递；
/// 失败的消息交给重试队列，不阻塞响应
#[derive(Clone)]
pub struct ProcessWebhookUseCase {
    resolver: IntegrationResolver,
    registry: Arc<AdapterRegistry>,
    engine: FormatEngine,
    client: Arc<dyn DeliveryClient>,
    recorder: DeliveryRecorder,
    retry_queue: RetryQueue,
}

impl ProcessWebhookUseCase {
    pub fn new(
        resolver: IntegrationResolver,
        registry: Arc<AdapterRegistry>,
        client: Arc<dyn DeliveryClient>,
        recorder: DeliveryRecorder,
        retry_queue: RetryQueue,
    ) -> Self {
        Self {
            resolver,
            engine: FormatEngine::new(registry.clone()),
            registry,
            client,
            recorder,
            retry_queue,
        }
    }

    /// 执行用例并记录指标
    ///
    /// # 参数
    ///
    /// * `source` - 路由声明的来源类型，必须与集成的来源一致
    /// * `integration_id` - 路径中的集成标识符
    /// * `request` - 原始请求头和请求体
    /// * `budget` - 同步处理预算；超出预算的发送按投递失败处理并转入重试
    pub async fn execute(
        &self,
        source: SourceType,
        integration_id: &str,
        request: InboundRequest<'_>,
        budget: Duration,
    ) -> WebhookOutcome {
        let deadline = Instant::now() + budget;
        let outcome = self.run(source, integration_id, request, deadline, budget).await;
        metrics::record_webhook(source.as_str(), outcome.label());
        outcome
    }

    async fn run(
        &self,
        source: SourceType,
        integration_id: &str,
        request: InboundRequest<'_>,
        deadline: Instant,
        budget: Duration,
    ) -> WebhookOutcome {
        let Ok(resolution) = timeout_at(deadline, self.resolver.resolve(integration_id)).await
        else {
            warn!(%integration_id, %source, ?budget, "Integration lookup exceeded the sync budget");
            return WebhookOutcome::TimedOut;
        };
        let resolved = match resolution {
            Ok(resolved) => resolved,
            Err(e) => {
                if e.is_not_found() {
                    debug!(%integration_id, %source, error = %e, "Integration unavailable");
                } else {
                    error!(%integration_id, %source, error = %e, "Failed to resolve integration");
                }
                return WebhookOutcome::Unresolved(e);
            }
        };
        let integration = &resolved.integration;

        if integration.source_type != source {
            debug!(
                %integration_id,
                expected = %integration.source_type,
                %source,
                "Webhook posted to the wrong source endpoint"
            );
            return WebhookOutcome::Unresolved(ResolveError::NotFound);
        }

        let Some(adapter) = self.registry.get(source) else {
            return WebhookOutcome::Unsupported(source.to_string());
        };
        let config = &integration.source_config;

        if let Err(e) = adapter.authenticate(&request, config) {
            warn!(%integration_id, %source, error = %e, "Webhook authentication failed");
            return WebhookOutcome::Rejected;
        }

        let event = match adapter.decode(&request) {
            Ok(event) => event,
            Err(AdapterError::MalformedPayload(msg)) => {
                warn!(%integration_id, %source, error = %msg, "Malformed webhook payload");
                return WebhookOutcome::Malformed(msg);
            }
            Err(AdapterError::UnsupportedEvent(kind)) => {
                debug!(%integration_id, %source, kind = %kind, "Unsupported event kind");
                return WebhookOutcome::Unsupported(kind);
            }
            Err(AdapterError::AuthMismatch) => return WebhookOutcome::Rejected,
        };

        let rendered = self.engine.render(&event, config);
        if rendered.is_empty() {
            debug!(%integration_id, %source, "No messages after filtering");
            return WebhookOutcome::Filtered;
        }

        let context = AuditContext::from_body(
            integration.id,
            adapter.idempotency_key(&request, &event),
            request.body,
        );
        let chat_id = integration.destination_config.chat_id.as_str();
        let started = Instant::now();
        let mut last_receipt: Option<DeliveryReceipt> = None;

        for (index, text) in rendered.messages.iter().enumerate() {
            let attempt_started = Instant::now();
            let sent = timeout_at(deadline, self.client.send(&resolved.bot_token, chat_id, text))
                .await
                .unwrap_or(Err(DeliveryError::Timeout(budget)));
            match sent {
                Ok(receipt) => {
                    metrics::record_delivery(attempt_started.elapsed(), None);
                    last_receipt = Some(receipt);
                }
                Err(e) => {
                    metrics::record_delivery(attempt_started.elapsed(), Some(e.reason()));
                    warn!(
                        %integration_id,
                        %source,
                        message = index + 1,
                        total = rendered.messages.len(),
                        error = %e,
                        "Initial delivery failed"
                    );

                    let retry_scheduled =
                        self.schedule_retries(&context, &rendered.messages[index..], &e);
                    self.recorder
                        .record(
                            &context,
                            DeliveryOutcome::Failed(&e),
                            DeliveryPhase::Initial,
                            1,
                            started.elapsed(),
                        )
                        .await;

                    return WebhookOutcome::DeliveryFailed {
                        error: e,
                        matched: rendered.matched,
                        retry_scheduled,
                    };
                }
            }
        }

        if let Some(receipt) = &last_receipt {
            self.recorder
                .record(
                    &context,
                    DeliveryOutcome::Delivered(receipt),
                    DeliveryPhase::Initial,
                    1,
                    started.elapsed(),
                )
                .await;
        }

        info!(
            %integration_id,
            %source,
            messages = rendered.messages.len(),
            "Webhook delivered"
        );
        WebhookOutcome::Delivered {
            messages: rendered.messages.len(),
            matched: rendered.matched,
        }
    }

    /// 为失败的消息及其后尚未发送的消息排入重试
    fn schedule_retries(
        &self,
        context: &AuditContext,
        pending: &[String],
        error: &DeliveryError,
    ) -> bool {
        pending.iter().all(|text| {
            let job = RetryJob {
                integration_id: context.integration_id,
                context: context.clone(),
                text: text.clone(),
                last_error: error.clone(),
            };
            match self.retry_queue.enqueue(job) {
                Ok(()) => true,
                Err(e) => {
                    error!(integration_id = %context.integration_id, error = %e, "Failed to schedule retry");
                    false
                }
            }
        })
    }
}
