// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::template;
use super::traits::{AdapterError, InboundRequest, Rendered, SourceAdapter};
use crate::domain::models::inbound_event::InboundEvent;
use crate::domain::models::integration::SourceType;
use crate::domain::models::jira_event::{JiraEvent, COMMENT_CREATED, ISSUE_CREATED, ISSUE_UPDATED};
use crate::domain::models::source_config::{JiraConfig, SourceConfig};

const ISSUE_CREATED_TEMPLATE: &str =
    "🆕 *{user}* created issue [{key}]({url}): *{summary}*\nPriority: {priority} | Status: {status}";
const ISSUE_UPDATED_TEMPLATE: &str = "✏️ *{user}* updated [{key}]({url})";
const COMMENT_CREATED_TEMPLATE: &str = "💬 *{user}* commented on [{key}]({url}):\n> {comment}";
const FALLBACK_TEMPLATE: &str = "📋 Jira event: {event} [{key}]({url})";

/// Jira 适配器
///
/// 事件类型取自负载中的 `webhookEvent`，没有签名校验
#[derive(Debug, Default, Clone)]
pub struct JiraAdapter;

impl JiraAdapter {
    pub fn new() -> Self {
        Self
    }

    fn changes(event: &JiraEvent) -> String {
        event
            .changelog
            .as_ref()
            .map(|changelog| {
                changelog
                    .items
                    .iter()
                    .map(|item| {
                        format!(
                            "{}: {} → {}",
                            item.field,
                            item.from_string.as_deref().unwrap_or_default(),
                            item.to_string.as_deref().unwrap_or_default()
                        )
                    })
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default()
    }

    fn format_event(event: &JiraEvent, config: &JiraConfig) -> String {
        let issue = &event.issue;
        let changes = Self::changes(event);
        let comment = event
            .comment
            .as_ref()
            .map(|c| c.body.as_str())
            .unwrap_or_default();
        let priority = issue.priority().unwrap_or_default();
        let url = issue.browse_url();

        let custom = config.template.as_deref().filter(|t| !t.is_empty());
        let template = custom.unwrap_or(match event.webhook_event.as_str() {
            ISSUE_CREATED => ISSUE_CREATED_TEMPLATE,
            ISSUE_UPDATED => ISSUE_UPDATED_TEMPLATE,
            COMMENT_CREATED => COMMENT_CREATED_TEMPLATE,
            _ => FALLBACK_TEMPLATE,
        });

        let mut text = template::render(
            template,
            &[
                ("user", event.actor()),
                ("key", issue.key.as_str()),
                ("url", url.as_str()),
                ("summary", issue.fields.summary.as_str()),
                ("priority", priority),
                ("status", issue.status()),
                ("project", issue.project_key()),
                ("event", event.webhook_event.as_str()),
                ("comment", comment),
                ("changes", changes.as_str()),
            ],
        );

        if custom.is_none() && event.webhook_event == ISSUE_UPDATED && !changes.is_empty() {
            text.push_str("\nChanges: ");
            text.push_str(&changes);
        }
        text
    }
}

impl SourceAdapter for JiraAdapter {
    fn source_type(&self) -> SourceType {
        SourceType::Jira
    }

    fn decode(&self, request: &InboundRequest<'_>) -> Result<InboundEvent, AdapterError> {
        let event: JiraEvent =
            serde_json::from_slice(request.body).map_err(AdapterError::malformed)?;
        Ok(InboundEvent::Jira(event))
    }

    fn should_process(&self, event: &InboundEvent, config: &SourceConfig) -> bool {
        let (InboundEvent::Jira(event), SourceConfig::Jira(config)) = (event, config) else {
            return false;
        };
        config.should_process(
            &event.webhook_event,
            event.issue.project_key(),
            event.issue.priority(),
        )
    }

    fn format(&self, event: &InboundEvent, config: &SourceConfig) -> Rendered {
        match (event, config) {
            (InboundEvent::Jira(event), SourceConfig::Jira(config)) => {
                Rendered::single(Self::format_event(event, config))
            }
            _ => Rendered::default(),
        }
    }

    fn idempotency_key(
        &self,
        _request: &InboundRequest<'_>,
        event: &InboundEvent,
    ) -> Option<String> {
        let InboundEvent::Jira(event) = event else {
            return None;
        };
        Some(format!(
            "{}:{}:{}",
            event.webhook_event, event.issue.key, event.timestamp
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;
    use serde_json::json;

    fn decode(value: serde_json::Value) -> InboundEvent {
        let headers = HeaderMap::new();
        let body = value.to_string();
        JiraAdapter
            .decode(&InboundRequest::new(&headers, body.as_bytes()))
            .unwrap()
    }

    fn issue_event(kind: &str, priority: &str) -> serde_json::Value {
        json!({
            "timestamp": 1700000000000i64,
            "webhookEvent": kind,
            "user": {"displayName": "Alice"},
            "issue": {
                "key": "OPS-7",
                "self": "https://jira.example.com/rest/api/2/issue/10007",
                "fields": {
                    "summary": "Disk full",
                    "priority": {"name": priority},
                    "status": {"name": "Open"},
                    "project": {"key": "OPS", "name": "Operations"}
                }
            }
        })
    }

    fn config(value: serde_json::Value) -> SourceConfig {
        SourceConfig::parse(SourceType::Jira, &value).unwrap()
    }

    #[test]
    fn test_issue_created_default_format() {
        let event = decode(issue_event(ISSUE_CREATED, "High"));
        let rendered = JiraAdapter.format(&event, &config(json!({})));
        assert_eq!(
            rendered.messages,
            vec!["🆕 *Alice* created issue [OPS-7](https://jira.example.com/browse/OPS-7): *Disk full*\nPriority: High | Status: Open"]
        );
    }

    #[test]
    fn test_issue_updated_lists_changelog() {
        let mut value = issue_event(ISSUE_UPDATED, "High");
        value["changelog"] = json!({"items": [
            {"field": "status", "fromString": "Open", "toString": "In Progress"},
            {"field": "assignee", "fromString": null, "toString": "Bob"}
        ]});
        let event = decode(value);
        let text = &JiraAdapter.format(&event, &config(json!({}))).messages[0];
        assert!(text.starts_with("✏️ *Alice* updated [OPS-7]"));
        assert!(text.ends_with("\nChanges: status: Open → In Progress, assignee:  → Bob"));
    }

    #[test]
    fn test_comment_created() {
        let mut value = issue_event(COMMENT_CREATED, "High");
        value["comment"] = json!({"body": "on it", "author": {"displayName": "Bob"}});
        let event = decode(value);
        let text = &JiraAdapter.format(&event, &config(json!({}))).messages[0];
        assert!(text.ends_with(":\n> on it"));
    }

    #[test]
    fn test_unknown_kind_uses_fallback() {
        let event = decode(issue_event("jira:worklog_updated", "High"));
        let text = &JiraAdapter.format(&event, &config(json!({}))).messages[0];
        assert_eq!(
            text,
            "📋 Jira event: jira:worklog_updated [OPS-7](https://jira.example.com/browse/OPS-7)"
        );
    }

    #[test]
    fn test_template_overrides_every_kind() {
        let cfg = config(json!({"template": "{key} {status} {missing}"}));
        for kind in [ISSUE_CREATED, ISSUE_UPDATED, "other"] {
            let event = decode(issue_event(kind, "High"));
            assert_eq!(JiraAdapter.format(&event, &cfg).messages, vec!["OPS-7 Open "]);
        }
    }

    #[test]
    fn test_filters() {
        let cfg = config(json!({
            "events": [ISSUE_CREATED],
            "project_keys": ["OPS"],
            "min_priority": "High"
        }));
        assert!(JiraAdapter.should_process(&decode(issue_event(ISSUE_CREATED, "Highest")), &cfg));
        assert!(!JiraAdapter.should_process(&decode(issue_event(ISSUE_CREATED, "Low")), &cfg));
        assert!(!JiraAdapter.should_process(&decode(issue_event(ISSUE_UPDATED, "High")), &cfg));
    }

    #[test]
    fn test_malformed_payload() {
        let headers = HeaderMap::new();
        let err = JiraAdapter
            .decode(&InboundRequest::new(&headers, br#"{"webhookEvent": 5}"#))
            .unwrap_err();
        assert!(matches!(err, AdapterError::MalformedPayload(_)));
    }

    #[test]
    fn test_idempotency_key() {
        let headers = HeaderMap::new();
        let event = decode(issue_event(ISSUE_CREATED, "High"));
        assert_eq!(
            JiraAdapter.idempotency_key(&InboundRequest::new(&headers, b""), &event),
            Some("jira:issue_created:OPS-7:1700000000000".to_string())
        );
    }
}
