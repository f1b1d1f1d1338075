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

use crate::domain::models::delivery_log::DeliveryPhase;
use crate::domain::services::delivery_client::{DeliveryClient, DeliveryError};
use crate::domain::services::delivery_recorder::{AuditContext, DeliveryOutcome, DeliveryRecorder};
use crate::domain::services::integration_resolver::IntegrationResolver;
use crate::infrastructure::metrics;
use crate::utils::retry_policy::RetryPolicy;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Instant};
use tracing::{error, info, warn};
use uuid::Uuid;

const OUTCOME_CHANNEL_CAPACITY: usize = 256;

/// 一条首次投递失败的消息
#[derive(Debug, Clone)]
pub struct RetryJob {
    pub integration_id: Uuid,
    pub context: AuditContext,
    pub text: String,
    /// 首次投递的错误
    pub last_error: DeliveryError,
}

/// 重试序列的终态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryOutcome {
    /// 某次重试成功
    Delivered { integration_id: Uuid, attempts: u32 },
    /// 重试预算耗尽
    Exhausted { integration_id: Uuid, attempts: u32 },
    /// 集成在重试期间被删除、停用或凭据失效
    Abandoned { integration_id: Uuid, attempts: u32 },
}

impl RetryOutcome {
    pub fn integration_id(&self) -> Uuid {
        match self {
            RetryOutcome::Delivered { integration_id, .. }
            | RetryOutcome::Exhausted { integration_id, .. }
            | RetryOutcome::Abandoned { integration_id, .. } => *integration_id,
        }
    }
}

#[derive(Error, Debug)]
#[error("retry supervisor is not running")]
pub struct SupervisorStopped;

/// 重试队列句柄
///
/// 入站请求只负责投递任务，任务的执行与请求生命周期无关
#[derive(Clone)]
pub struct RetryQueue {
    tx: mpsc::UnboundedSender<RetryJob>,
    outcomes: broadcast::Sender<RetryOutcome>,
}

impl RetryQueue {
    pub fn enqueue(&self, job: RetryJob) -> Result<(), SupervisorStopped> {
        self.tx.send(job).map_err(|_| SupervisorStopped)
    }

    /// 订阅之后产生的终态
    pub fn subscribe(&self) -> broadcast::Receiver<RetryOutcome> {
        self.outcomes.subscribe()
    }
}

/// 重试监督器
///
/// 每个任务在独立的 tokio 任务中运行，任务之间没有共享的可变状态
#[derive(Clone)]
pub struct RetrySupervisor {
    resolver: IntegrationResolver,
    client: Arc<dyn DeliveryClient>,
    recorder: DeliveryRecorder,
    policy: RetryPolicy,
}

impl RetrySupervisor {
    pub fn new(
        resolver: IntegrationResolver,
        client: Arc<dyn DeliveryClient>,
        recorder: DeliveryRecorder,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            resolver,
            client,
            recorder,
            policy,
        }
    }

    /// 启动监督器
    ///
    /// # 返回值
    ///
    /// 队列句柄和调度循环的句柄；全部队列句柄被丢弃后调度循环退出
    pub fn start(self) -> (RetryQueue, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<RetryJob>();
        let (outcomes, _) = broadcast::channel(OUTCOME_CHANNEL_CAPACITY);
        let queue = RetryQueue {
            tx,
            outcomes: outcomes.clone(),
        };

        let handle = tokio::spawn(async move {
            info!(
                max_retries = self.policy.max_retries,
                "Retry supervisor started"
            );
            while let Some(job) = rx.recv().await {
                let supervisor = self.clone();
                let outcomes = outcomes.clone();
                tokio::spawn(async move {
                    let outcome = supervisor.run_job(job).await;
                    // 没有订阅者时发送失败是正常的
                    let _ = outcomes.send(outcome);
                });
            }
            info!("Retry supervisor stopped");
        });

        (queue, handle)
    }

    /// 执行一条重试序列直到终态
    ///
    /// 第 k 次重试前等待 `calculate_backoff(k)`，每次都重新解析集成并使用独立超时
    pub async fn run_job(&self, job: RetryJob) -> RetryOutcome {
        let started = Instant::now();
        let integration_id = job.integration_id;
        let mut last_error = job.last_error;
        let mut retries: u32 = 0;

        while self.policy.should_retry(retries) {
            retries += 1;
            sleep(self.policy.calculate_backoff(retries)).await;

            let resolved = match self.resolver.resolve_id(integration_id).await {
                Ok(resolved) => resolved,
                Err(e) => {
                    warn!(%integration_id, attempt = retries, error = %e, "Abandoning retry");
                    self.recorder
                        .record(
                            &job.context,
                            DeliveryOutcome::Failed(&last_error),
                            DeliveryPhase::Retry,
                            retries,
                            started.elapsed(),
                        )
                        .await;
                    return RetryOutcome::Abandoned {
                        integration_id,
                        attempts: retries,
                    };
                }
            };

            let attempt_started = Instant::now();
            let chat_id = &resolved.integration.destination_config.chat_id;
            let result = match timeout(
                self.policy.attempt_timeout,
                self.client.send(&resolved.bot_token, chat_id, &job.text),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(DeliveryError::Timeout(self.policy.attempt_timeout)),
            };

            match result {
                Ok(receipt) => {
                    metrics::record_delivery(attempt_started.elapsed(), None);
                    info!(%integration_id, attempt = retries, "Retry delivered");
                    self.recorder
                        .record(
                            &job.context,
                            DeliveryOutcome::Delivered(&receipt),
                            DeliveryPhase::Retry,
                            retries + 1,
                            started.elapsed(),
                        )
                        .await;
                    return RetryOutcome::Delivered {
                        integration_id,
                        attempts: retries + 1,
                    };
                }
                Err(e) => {
                    metrics::record_delivery(attempt_started.elapsed(), Some(e.reason()));
                    warn!(%integration_id, attempt = retries, error = %e, "Retry failed");
                    last_error = e;
                }
            }
        }

        error!(%integration_id, attempts = retries + 1, error = %last_error, "Retries exhausted");
        metrics::record_retry_exhausted();
        self.recorder
            .record(
                &job.context,
                DeliveryOutcome::Failed(&last_error),
                DeliveryPhase::Retry,
                retries + 1,
                started.elapsed(),
            )
            .await;

        RetryOutcome::Exhausted {
            integration_id,
            attempts: retries + 1,
        }
    }
}
