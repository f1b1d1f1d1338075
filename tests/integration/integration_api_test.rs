// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_test_app, SEND_TEXT_PATH};
use axum::http::StatusCode;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

/// 测试创建集成
///
/// 验证返回体中凭据已脱敏，并附带完整的 Webhook 地址
#[tokio::test]
async fn test_create_integration_masks_token() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/api/v1/integrations")
        .add_header("Authorization", app.bearer())
        .json(&json!({
            "name": "prod alerts",
            "source_type": "alertmanager",
            "source_config": {"min_severity": "warning", "group_mode": "single"},
            "chat_id": "chat-42",
            "bot_token": "plain-bot-token"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    let id = body["id"].as_str().unwrap();

    assert_eq!(body["user_id"], "user-1");
    assert_eq!(body["is_active"], true);
    assert_eq!(body["destination_type"], "yandex_messenger");
    assert_eq!(body["destination_config"]["chat_id"], "chat-42");
    assert_eq!(body["destination_config"]["bot_token"], "***");
    assert_eq!(body["source_config"]["min_severity"], "warning");
    assert_eq!(
        body["webhook_url"],
        format!("http://relay.test/webhook/{}/alertmanager", id)
    );
    assert!(!response.text().contains("plain-bot-token"));
}

/// 非法来源配置返回 400
#[tokio::test]
async fn test_create_integration_rejects_invalid_config() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/api/v1/integrations")
        .add_header("Authorization", app.bearer())
        .json(&json!({
            "name": "broken",
            "source_type": "jira",
            "source_config": {"min_priority": "Urgent"},
            "chat_id": "chat-42",
            "bot_token": "plain-bot-token"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = app
        .server
        .post("/api/v1/integrations")
        .add_header("Authorization", app.bearer())
        .json(&json!({
            "name": "",
            "source_type": "jira",
            "chat_id": "chat-42",
            "bot_token": "plain-bot-token"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

/// 测试查询与列表
#[tokio::test]
async fn test_get_and_list_integrations() {
    let app = create_test_app().await;
    let jira = app.create_integration("jira", json!({})).await;
    let gitlab = app.create_integration("gitlab", json!({"secret_token": "s3cret"})).await;

    let response = app
        .server
        .get(&format!("/api/v1/integrations/{}", gitlab))
        .add_header("Authorization", app.bearer())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["source_type"], "gitlab");
    assert_eq!(body["destination_config"]["bot_token"], "***");

    let response = app
        .server
        .get("/api/v1/integrations")
        .add_header("Authorization", app.bearer())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["total"], 2);
    let ids: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&jira.as_str()));
    assert!(ids.contains(&gitlab.as_str()));
}

/// 更新时占位凭据保持原值，新的凭据用于之后的投递
#[tokio::test]
async fn test_update_integration_keeps_token() {
    let app = create_test_app().await;
    Mock::given(method("POST"))
        .and(path(SEND_TEXT_PATH))
        .and(header("authorization", "OAuth plain-bot-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "message_id": 1})))
        .expect(1)
        .mount(&app.messenger)
        .await;
    let id = app.create_integration("jira", json!({})).await;

    let response = app
        .server
        .put(&format!("/api/v1/integrations/{}", id))
        .add_header("Authorization", app.bearer())
        .json(&json!({
            "name": "renamed",
            "bot_token": "***",
            "source_config": {"project_keys": ["OPS"]}
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["name"], "renamed");
    assert_eq!(body["source_config"]["project_keys"], json!(["OPS"]));

    let response = app
        .server
        .post(&format!("/api/v1/integrations/{}/test", id))
        .add_header("Authorization", app.bearer())
        .await;
    // 模拟服务只接受原始凭据
    assert_eq!(response.status_code(), StatusCode::OK);
}

/// 更新不存在的集成返回 404
#[tokio::test]
async fn test_update_unknown_integration() {
    let app = create_test_app().await;

    let response = app
        .server
        .put(&format!("/api/v1/integrations/{}", uuid::Uuid::new_v4()))
        .add_header("Authorization", app.bearer())
        .json(&json!({"name": "ghost"}))
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

/// 删除后不可再访问
#[tokio::test]
async fn test_delete_integration() {
    let app = create_test_app().await;
    let id = app.create_integration("alertmanager", json!({})).await;

    let response = app
        .server
        .delete(&format!("/api/v1/integrations/{}", id))
        .add_header("Authorization", app.bearer())
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let response = app
        .server
        .get(&format!("/api/v1/integrations/{}", id))
        .add_header("Authorization", app.bearer())
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = app
        .server
        .delete(&format!("/api/v1/integrations/{}", id))
        .add_header("Authorization", app.bearer())
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

/// 测试投递日志分页
#[tokio::test]
async fn test_integration_logs_pagination() {
    let app = create_test_app().await;
    app.messenger_accepts().await;
    let id = app.create_integration("alertmanager", json!({})).await;

    for name in ["DiskFull", "CpuHigh", "MemLow"] {
        let response = app
            .server
            .post(&format!("/webhook/{}/alertmanager", id))
            .json(&json!({
                "version": "4",
                "status": "firing",
                "alerts": [{
                    "status": "firing",
                    "labels": {"alertname": name, "severity": "critical"},
                    "annotations": {}
                }]
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    let response = app
        .server
        .get(&format!("/api/v1/integrations/{}/logs?limit=2&offset=0", id))
        .add_header("Authorization", app.bearer())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["total"], 3);
    assert_eq!(body["limit"], 2);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let response = app
        .server
        .get(&format!("/api/v1/integrations/{}/logs?limit=500&offset=2", id))
        .add_header("Authorization", app.bearer())
        .await;
    let body: Value = response.json();
    assert_eq!(body["limit"], 50);
    assert_eq!(body["offset"], 2);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["phase"], "initial");
    assert_eq!(body["data"][0]["attempts"], 1);
}

/// 测试消息发送成功与失败
#[tokio::test]
async fn test_send_test_message() {
    let app = create_test_app().await;
    let id = app.create_integration("gitlab", json!({})).await;

    Mock::given(method("POST"))
        .and(path(SEND_TEXT_PATH))
        .and(header("authorization", "OAuth plain-bot-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"ok": true, "message_id": 7})),
        )
        .up_to_n_times(1)
        .mount(&app.messenger)
        .await;

    let response = app
        .server
        .post(&format!("/api/v1/integrations/{}/test", id))
        .add_header("Authorization", app.bearer())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["message_id"], 7);

    let sent = app.sent_messages().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["chat_id"], "chat-42");
    assert!(sent[0]["text"]
        .as_str()
        .unwrap()
        .contains("gitlab integration"));

    app.messenger_unavailable().await;
    let response = app
        .server
        .post(&format!("/api/v1/integrations/{}/test", id))
        .add_header("Authorization", app.bearer())
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_GATEWAY);
}

/// 其他用户的集成不可见
#[tokio::test]
async fn test_integrations_are_scoped_to_owner() {
    let app = create_test_app().await;
    let id = app.create_integration("jira", json!({})).await;
    let other_key = app.seed_api_key("user-2").await;

    let response = app
        .server
        .get(&format!("/api/v1/integrations/{}", id))
        .add_header("Authorization", format!("Bearer {}", other_key))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = app
        .server
        .get("/api/v1/integrations")
        .add_header("Authorization", format!("Bearer {}", other_key))
        .await;
    assert_eq!(response.json::<Value>()["total"], 0);
}
