// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum_test::TestServer;
use chrono::Utc;
use hookrelay::app;
use hookrelay::config::settings::{
    DatabaseSettings, EncryptionSettings, LoggingSettings, MessengerSettings, MetricsSettings,
    RetrySettings, ServerSettings, Settings, WebhookSettings,
};
use hookrelay::domain::models::api_key::ApiKey;
use hookrelay::domain::models::delivery_log::DeliveryLog;
use hookrelay::domain::repositories::api_key_repository::ApiKeyRepository;
use hookrelay::domain::repositories::delivery_log_repository::DeliveryLogRepository;
use hookrelay::infrastructure::database::connection;
use hookrelay::infrastructure::messenger::client::MessengerClient;
use hookrelay::infrastructure::repositories::api_key_repo_impl::ApiKeyRepoImpl;
use hookrelay::infrastructure::repositories::delivery_log_repo_impl::DeliveryLogRepoImpl;
use hookrelay::presentation::routes;
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SEND_TEXT_PATH: &str = "/messages/sendText/";

#[allow(dead_code)]
pub struct TestApp {
    pub server: TestServer,
    pub db: Arc<DatabaseConnection>,
    pub api_key: String,
    pub messenger: MockServer,
    pub settings: Arc<Settings>,
}

fn test_settings(messenger_url: String) -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            base_url: "http://relay.test".to_string(),
        },
        database: DatabaseSettings {
            url: "sqlite::memory:".to_string(),
            // 内存库每个连接独立，只能使用单连接
            max_connections: Some(1),
            min_connections: Some(1),
            connect_timeout: Some(5),
            idle_timeout: None,
        },
        encryption: EncryptionSettings {
            key: "integration-test-passphrase".to_string(),
        },
        messenger: MessengerSettings {
            base_url: messenger_url,
            request_timeout_secs: 2,
        },
        webhook: WebhookSettings {
            gitlab_timeout_secs: 5,
            jira_timeout_secs: 5,
            alertmanager_timeout_secs: 5,
            max_body_bytes: 64 * 1024,
        },
        retry: RetrySettings {
            max_retries: 3,
            base_delay_ms: 10,
            max_delay_ms: 100,
            attempt_timeout_secs: 2,
            jitter: false,
        },
        metrics: MetricsSettings {
            enabled: false,
            listen_addr: "127.0.0.1:0".to_string(),
        },
        logging: LoggingSettings {
            format: "pretty".to_string(),
            filter: "info".to_string(),
        },
    }
}

/// 为指定用户写入一个新的 API 密钥，返回明文
async fn seed_api_key(db: &Arc<DatabaseConnection>, user_id: &str) -> String {
    let api_key = format!("hr_{}", Uuid::new_v4().simple());
    ApiKeyRepoImpl::new(db.clone())
        .create(&ApiKey {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            key_hash: ApiKey::hash_key(&api_key),
            name: "integration tests".to_string(),
            last_used_at: None,
            created_at: Utc::now(),
            expires_at: None,
        })
        .await
        .expect("Failed to seed API key");
    api_key
}

pub async fn create_test_app() -> TestApp {
    create_test_app_with(|_| {}).await
}

/// 在默认测试配置上调整后创建应用
pub async fn create_test_app_with(configure: impl FnOnce(&mut Settings)) -> TestApp {
    let messenger = MockServer::start().await;
    let mut settings = test_settings(messenger.uri());
    configure(&mut settings);
    let settings = Arc::new(settings);

    let db = Arc::new(
        connection::connect_and_migrate(&settings.database)
            .await
            .expect("Failed to migrate test database"),
    );

    let api_key = seed_api_key(&db, "user-1").await;

    let client = Arc::new(
        MessengerClient::from_settings(&settings.messenger)
            .expect("Failed to build messenger client"),
    );
    let (state, _supervisor) = app::assemble(settings.clone(), db.clone(), client);
    let server = TestServer::new(routes::routes(state)).expect("Failed to start test server");

    TestApp {
        server,
        db,
        api_key,
        messenger,
        settings,
    }
}

impl TestApp {
    pub async fn seed_api_key(&self, user_id: &str) -> String {
        seed_api_key(&self.db, user_id).await
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.api_key)
    }

    /// 消息平台始终返回成功
    pub async fn messenger_accepts(&self) {
        Mock::given(method("POST"))
            .and(path(SEND_TEXT_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "message_id": 42})))
            .mount(&self.messenger)
            .await;
    }

    /// 消息平台延迟 `delay` 后才返回成功
    pub async fn messenger_slow(&self, delay: Duration) {
        Mock::given(method("POST"))
            .and(path(SEND_TEXT_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"ok": true, "message_id": 42}))
                    .set_delay(delay),
            )
            .mount(&self.messenger)
            .await;
    }

    /// 消息平台始终返回 503
    pub async fn messenger_unavailable(&self) {
        Mock::given(method("POST"))
            .and(path(SEND_TEXT_PATH))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&self.messenger)
            .await;
    }

    /// 消息平台收到的全部请求体
    pub async fn sent_messages(&self) -> Vec<Value> {
        self.messenger
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|request| serde_json::from_slice(&request.body).ok())
            .collect()
    }

    /// 通过管理接口创建集成，返回其标识符
    pub async fn create_integration(&self, source_type: &str, source_config: Value) -> String {
        let response = self
            .server
            .post("/api/v1/integrations")
            .add_header("Authorization", self.bearer())
            .json(&json!({
                "name": format!("{} integration", source_type),
                "source_type": source_type,
                "source_config": source_config,
                "chat_id": "chat-42",
                "bot_token": "plain-bot-token",
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json::<Value>()["id"]
            .as_str()
            .expect("integration id")
            .to_string()
    }

    pub async fn delivery_logs(&self, integration_id: &str) -> Vec<DeliveryLog> {
        let id = Uuid::parse_str(integration_id).expect("uuid");
        DeliveryLogRepoImpl::new(self.db.clone())
            .list_by_integration(id, 100, 0)
            .await
            .expect("Failed to list delivery logs")
            .0
    }
}
