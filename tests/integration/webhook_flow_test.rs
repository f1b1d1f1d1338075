// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_test_app, create_test_app_with};
use axum::body::Bytes;
use axum::http::StatusCode;
use hookrelay::domain::models::delivery_log::DeliveryPhase;
use serde_json::{json, Value};
use std::time::Duration;
use uuid::Uuid;

fn alert(name: &str, severity: &str) -> Value {
    json!({
        "status": "firing",
        "labels": {"alertname": name, "severity": severity, "instance": "node-1"},
        "annotations": {"description": format!("{} is bad", name)},
        "generatorURL": "http://prometheus/graph"
    })
}

fn alert_batch(alerts: Vec<Value>) -> Value {
    json!({
        "version": "4",
        "groupKey": "{}:{alertname=\"x\"}",
        "status": "firing",
        "groupLabels": {"alertname": "x"},
        "alerts": alerts
    })
}

fn jira_issue_created() -> Value {
    json!({
        "timestamp": 1700000000000i64,
        "webhookEvent": "jira:issue_created",
        "user": {"displayName": "Alice"},
        "issue": {
            "key": "OPS-7",
            "self": "https://jira.example.com/rest/api/2/issue/10007",
            "fields": {
                "summary": "Disk full",
                "priority": {"name": "High"},
                "status": {"name": "Open"},
                "project": {"key": "OPS", "name": "Operations"}
            }
        }
    })
}

fn gitlab_push() -> Value {
    json!({
        "object_kind": "push",
        "ref": "refs/heads/main",
        "user_name": "Alice",
        "project": {
            "name": "app",
            "web_url": "http://gitlab/group/app",
            "path_with_namespace": "group/app"
        },
        "commits": [{
            "id": "0000000000000000000000000000000000000001",
            "title": "commit 1",
            "url": "http://gitlab/c/1"
        }],
        "total_commits_count": 1
    })
}

/// Alertmanager 按严重级别过滤后只投递剩余告警
#[tokio::test]
async fn test_alertmanager_filters_by_severity() {
    let app = create_test_app().await;
    app.messenger_accepts().await;
    let id = app
        .create_integration("alertmanager", json!({"min_severity": "warning"}))
        .await;

    let response = app
        .server
        .post(&format!("/webhook/{}/alertmanager", id))
        .json(&alert_batch(vec![
            alert("DiskFull", "critical"),
            alert("Chatty", "info"),
        ]))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>(),
        json!({"status": "ok", "alerts_sent": 1})
    );

    let sent = app.sent_messages().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["chat_id"], "chat-42");
    assert!(sent[0]["text"].as_str().unwrap().contains("DiskFull"));

    let logs = app.delivery_logs(&id).await;
    assert_eq!(logs.len(), 1);
    assert!(logs[0].is_success());
    assert_eq!(logs[0].phase, DeliveryPhase::Initial);
}

/// 全部告警被过滤时仍返回 200
#[tokio::test]
async fn test_alertmanager_all_filtered() {
    let app = create_test_app().await;
    app.messenger_accepts().await;
    let id = app
        .create_integration("alertmanager", json!({"min_severity": "critical"}))
        .await;

    let response = app
        .server
        .post(&format!("/webhook/{}/alertmanager", id))
        .json(&alert_batch(vec![alert("Chatty", "info")]))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["filtered"], true);
    assert!(app.sent_messages().await.is_empty());
    assert!(app.delivery_logs(&id).await.is_empty());
}

/// GitLab 令牌不匹配时静默丢弃，既不发送也不记录
#[tokio::test]
async fn test_gitlab_wrong_token_is_dropped() {
    let app = create_test_app().await;
    app.messenger_accepts().await;
    let id = app
        .create_integration("gitlab", json!({"secret_token": "expected"}))
        .await;

    let response = app
        .server
        .post(&format!("/webhook/{}/gitlab", id))
        .add_header("X-Gitlab-Event", "Push Hook")
        .add_header("X-Gitlab-Token", "wrong")
        .json(&gitlab_push())
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["filtered"], true);
    assert!(app.sent_messages().await.is_empty());
    assert!(app.delivery_logs(&id).await.is_empty());
}

/// GitLab 令牌正确时投递推送事件
#[tokio::test]
async fn test_gitlab_push_delivered() {
    let app = create_test_app().await;
    app.messenger_accepts().await;
    let id = app
        .create_integration("gitlab", json!({"secret_token": "expected"}))
        .await;

    let response = app
        .server
        .post(&format!("/webhook/{}/gitlab", id))
        .add_header("X-Gitlab-Event", "Push Hook")
        .add_header("X-Gitlab-Token", "expected")
        .json(&gitlab_push())
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!({"status": "ok"}));
    assert_eq!(app.sent_messages().await.len(), 1);
}

/// 未知集成返回 404，GitLab 除外
#[tokio::test]
async fn test_unknown_integration() {
    let app = create_test_app().await;
    let unknown = Uuid::new_v4();

    let response = app
        .server
        .post(&format!("/webhook/{}/jira", unknown))
        .json(&jira_issue_created())
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = app
        .server
        .post("/webhook/not-a-uuid/alertmanager")
        .json(&alert_batch(vec![alert("DiskFull", "critical")]))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = app
        .server
        .post(&format!("/webhook/{}/gitlab", unknown))
        .add_header("X-Gitlab-Event", "Push Hook")
        .json(&gitlab_push())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

/// 来源与路由不一致的集成视为不存在
#[tokio::test]
async fn test_source_mismatch_is_not_found() {
    let app = create_test_app().await;
    let id = app.create_integration("alertmanager", json!({})).await;

    let response = app
        .server
        .post(&format!("/webhook/{}/jira", id))
        .json(&jira_issue_created())
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

/// 无法解析的 Jira 负载返回 400
#[tokio::test]
async fn test_jira_malformed_payload() {
    let app = create_test_app().await;
    let id = app.create_integration("jira", json!({})).await;

    let response = app
        .server
        .post(&format!("/webhook/{}/jira", id))
        .text("this is not json")
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(app.delivery_logs(&id).await.is_empty());
}

/// 投递失败时返回 500 并在后台重试，直到次数用尽
#[tokio::test]
async fn test_jira_delivery_failure_is_retried() {
    let app = create_test_app().await;
    app.messenger_unavailable().await;
    let id = app.create_integration("jira", json!({})).await;

    let response = app
        .server
        .post(&format!("/webhook/{}/jira", id))
        .json(&jira_issue_created())
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json::<Value>()["retry_scheduled"], true);

    let mut logs = Vec::new();
    for _ in 0..50 {
        logs = app.delivery_logs(&id).await;
        if logs.len() >= 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    assert_eq!(logs.len(), 2);
    let retry = logs
        .iter()
        .find(|log| log.phase == DeliveryPhase::Retry)
        .expect("retry record");
    assert_eq!(retry.attempts, 4);
    assert_eq!(retry.response_status, 503);
    assert!(!retry.is_success());

    let initial = logs
        .iter()
        .find(|log| log.phase == DeliveryPhase::Initial)
        .expect("initial record");
    assert_eq!(initial.source_event_id, "jira:issue_created:OPS-7:1700000000000");
    assert_eq!(app.sent_messages().await.len(), 4);
}

/// 慢速目标超出同步预算时，首次投递按失败记录并转入重试
#[tokio::test]
async fn test_alertmanager_slow_destination_is_logged_and_retried() {
    let app = create_test_app_with(|settings| {
        settings.webhook.alertmanager_timeout_secs = 1;
        settings.messenger.request_timeout_secs = 5;
    })
    .await;
    app.messenger_slow(Duration::from_secs(2)).await;
    let id = app.create_integration("alertmanager", json!({})).await;

    let response = app
        .server
        .post(&format!("/webhook/{}/alertmanager", id))
        .json(&alert_batch(vec![alert("DiskFull", "critical")]))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json::<Value>()["retry_scheduled"], true);

    let logs = app.delivery_logs(&id).await;
    let initial: Vec<_> = logs
        .iter()
        .filter(|log| log.phase == DeliveryPhase::Initial)
        .collect();
    assert_eq!(initial.len(), 1);
    assert!(!initial[0].is_success());
    assert!(initial[0].error.contains("timed out"));
}

/// GitLab 在慢速目标超出预算时仍返回 200，且失败被记录
#[tokio::test]
async fn test_gitlab_slow_destination_still_acknowledged() {
    let app = create_test_app_with(|settings| {
        settings.webhook.gitlab_timeout_secs = 1;
        settings.messenger.request_timeout_secs = 5;
    })
    .await;
    app.messenger_slow(Duration::from_secs(2)).await;
    let id = app.create_integration("gitlab", json!({})).await;

    let response = app
        .server
        .post(&format!("/webhook/{}/gitlab", id))
        .add_header("X-Gitlab-Event", "Push Hook")
        .json(&gitlab_push())
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!({"status": "ok"}));

    let logs = app.delivery_logs(&id).await;
    assert!(logs
        .iter()
        .any(|log| log.phase == DeliveryPhase::Initial && !log.is_success()));
}

/// GitLab 首次投递失败不标记为已过滤
#[tokio::test]
async fn test_gitlab_delivery_failure_is_not_reported_as_filtered() {
    let app = create_test_app().await;
    app.messenger_unavailable().await;
    let id = app.create_integration("gitlab", json!({})).await;

    let response = app
        .server
        .post(&format!("/webhook/{}/gitlab", id))
        .add_header("X-Gitlab-Event", "Push Hook")
        .json(&gitlab_push())
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!({"status": "ok"}));
}

/// 超限请求体：GitLab 返回 200，其他来源返回 413
#[tokio::test]
async fn test_oversized_body() {
    let app = create_test_app().await;
    let gitlab = app.create_integration("gitlab", json!({})).await;
    let jira = app.create_integration("jira", json!({})).await;
    let oversized = Bytes::from(vec![b'a'; app.settings.webhook.max_body_bytes + 10]);

    let response = app
        .server
        .post(&format!("/webhook/{}/gitlab", gitlab))
        .add_header("X-Gitlab-Event", "Push Hook")
        .bytes(oversized.clone())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["filtered"], true);

    let response = app
        .server
        .post(&format!("/webhook/{}/jira", jira))
        .bytes(oversized)
        .await;
    assert_eq!(response.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(app.sent_messages().await.is_empty());
}
