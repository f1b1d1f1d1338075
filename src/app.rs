// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::adapters::AdapterRegistry;
use crate::config::settings::Settings;
use crate::domain::services::credential_cipher::CredentialCipher;
use crate::domain::services::delivery_client::DeliveryClient;
use crate::domain::services::delivery_recorder::DeliveryRecorder;
use crate::domain::services::integration_resolver::IntegrationResolver;
use crate::domain::use_cases::manage_integration::ManageIntegrationUseCase;
use crate::domain::use_cases::process_webhook::ProcessWebhookUseCase;
use crate::infrastructure::crypto::aes_gcm_cipher::AesGcmCipher;
use crate::infrastructure::repositories::api_key_repo_impl::ApiKeyRepoImpl;
use crate::infrastructure::repositories::delivery_log_repo_impl::DeliveryLogRepoImpl;
use crate::infrastructure::repositories::integration_repo_impl::IntegrationRepoImpl;
use crate::presentation::routes::AppState;
use crate::workers::retry_supervisor::RetrySupervisor;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// 组装全部组件并启动重试监督器
///
/// # 参数
///
/// * `settings` - 已校验的配置
/// * `db` - 已迁移的数据库连接
/// * `client` - 目标消息平台客户端
///
/// # 返回值
///
/// 路由依赖和重试监督器的调度句柄
pub fn assemble(
    settings: Arc<Settings>,
    db: Arc<DatabaseConnection>,
    client: Arc<dyn DeliveryClient>,
) -> (AppState, JoinHandle<()>) {
    let cipher: Arc<dyn CredentialCipher> =
        Arc::new(AesGcmCipher::from_passphrase(&settings.encryption.key));
    let integration_repo = Arc::new(IntegrationRepoImpl::new(db.clone()));
    let log_repo = Arc::new(DeliveryLogRepoImpl::new(db.clone()));
    let api_keys = Arc::new(ApiKeyRepoImpl::new(db));

    let resolver = IntegrationResolver::new(integration_repo.clone(), cipher.clone());
    let recorder = DeliveryRecorder::new(log_repo.clone());
    let registry = Arc::new(AdapterRegistry::with_defaults());

    let (retry_queue, supervisor_handle) = RetrySupervisor::new(
        resolver.clone(),
        client.clone(),
        recorder.clone(),
        settings.retry.policy(),
    )
    .start();

    let webhooks = Arc::new(ProcessWebhookUseCase::new(
        resolver,
        registry,
        client.clone(),
        recorder,
        retry_queue,
    ));
    let integrations = Arc::new(ManageIntegrationUseCase::new(
        integration_repo,
        log_repo,
        cipher,
        client,
    ));

    let state = AppState {
        settings,
        webhooks,
        integrations,
        api_keys,
    };
    (state, supervisor_handle)
}
