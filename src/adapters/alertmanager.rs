// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::template;
use super::traits::{AdapterError, InboundRequest, Rendered, SourceAdapter};
use crate::domain::models::alertmanager_event::{Alert, AlertStatus, AlertmanagerBatch};
use crate::domain::models::inbound_event::InboundEvent;
use crate::domain::models::integration::SourceType;
use crate::domain::models::source_config::{AlertmanagerConfig, GroupMode, SourceConfig};
use std::fmt::Write;

/// Alertmanager 适配器
///
/// 批次中的每条告警独立过滤，剩余告警按分组模式逐条或合并发送
#[derive(Debug, Default, Clone)]
pub struct AlertmanagerAdapter;

fn status_marker(status: AlertStatus) -> &'static str {
    match status {
        AlertStatus::Firing => "🔔",
        AlertStatus::Resolved => "✅",
    }
}

fn severity_marker(severity: &str) -> &'static str {
    match severity {
        "critical" => "🔥",
        "warning" => "⚠️",
        "info" => "ℹ️",
        _ => "📢",
    }
}

impl AlertmanagerAdapter {
    pub fn new() -> Self {
        Self
    }

    /// 通过过滤的告警
    pub fn surviving_alerts<'a>(
        batch: &'a AlertmanagerBatch,
        config: &AlertmanagerConfig,
    ) -> Vec<&'a Alert> {
        batch
            .alerts
            .iter()
            .filter(|alert| {
                config.should_send_alert(alert.is_resolved(), alert.severity(), &alert.labels)
            })
            .collect()
    }

    fn render_template(template: &str, alert: &Alert) -> String {
        let status = alert.status.as_str().to_uppercase();
        template::render(
            template,
            &[
                ("status", status.as_str()),
                ("severity", alert.severity()),
                ("alertname", alert.label("alertname")),
                ("instance", alert.label("instance")),
                ("job", alert.label("job")),
                ("description", alert.annotation("description")),
                ("summary", alert.annotation("summary")),
                ("value", alert.annotation("value")),
                ("generator_url", alert.generator_url.as_str()),
            ],
        )
    }

    fn format_single(alert: &Alert, config: &AlertmanagerConfig) -> String {
        if let Some(template) = config.template.as_deref().filter(|t| !t.is_empty()) {
            return Self::render_template(template, alert);
        }

        let mut text = format!(
            "{} {} *[{}]* ",
            status_marker(alert.status),
            severity_marker(alert.severity()),
            alert.status.as_str().to_uppercase()
        );
        let name = alert.label("alertname");
        if !name.is_empty() {
            let _ = write!(text, "*{}*", name);
        }
        let instance = alert.label("instance");
        if !instance.is_empty() {
            let _ = write!(text, " on `{}`", instance);
        }
        let description = alert.annotation("description");
        if !description.is_empty() {
            let _ = write!(text, "\n📝 {}", description);
        }
        let value = alert.annotation("value");
        if !value.is_empty() {
            let _ = write!(text, "\n📊 Current value: {}", value);
        }
        if !alert.generator_url.is_empty() {
            let _ = write!(text, "\n🔗 [Details]({})", alert.generator_url);
        }
        text
    }

    fn format_group(batch: &AlertmanagerBatch, alerts: &[&Alert], config: &AlertmanagerConfig) -> String {
        let group_labels = batch
            .group_labels
            .iter()
            .filter(|(key, _)| key.as_str() != "alertname" && key.as_str() != "severity")
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join(", ");

        let mut text = format!(
            "{} *[{}] {}*\n",
            status_marker(batch.status),
            batch.status.as_str().to_uppercase(),
            group_labels
        );

        let template = config.template.as_deref().filter(|t| !t.is_empty());
        for (i, alert) in alerts.iter().enumerate() {
            if i > 0 {
                text.push_str("\n---\n");
            }
            if let Some(template) = template {
                text.push_str(&Self::render_template(template, alert));
                continue;
            }

            text.push_str(severity_marker(alert.severity()));
            text.push(' ');
            let name = alert.label("alertname");
            if !name.is_empty() {
                let _ = write!(text, "*{}*", name);
            }
            let instance = alert.label("instance");
            if !instance.is_empty() {
                let _ = write!(text, " on `{}`", instance);
            }
            let description = alert.annotation("description");
            if !description.is_empty() {
                let _ = write!(text, "\n  📝 {}", description);
            }
        }

        if alerts.len() > 1 {
            let _ = write!(text, "\n\n📊 Total alerts: {}", alerts.len());
        }
        text
    }
}

impl SourceAdapter for AlertmanagerAdapter {
    fn source_type(&self) -> SourceType {
        SourceType::Alertmanager
    }

    fn decode(&self, request: &InboundRequest<'_>) -> Result<InboundEvent, AdapterError> {
        let batch: AlertmanagerBatch =
            serde_json::from_slice(request.body).map_err(AdapterError::malformed)?;
        Ok(InboundEvent::Alertmanager(batch))
    }

    fn should_process(&self, event: &InboundEvent, config: &SourceConfig) -> bool {
        let (InboundEvent::Alertmanager(batch), SourceConfig::Alertmanager(config)) =
            (event, config)
        else {
            return false;
        };
        batch.alerts.iter().any(|alert| {
            config.should_send_alert(alert.is_resolved(), alert.severity(), &alert.labels)
        })
    }

    fn format(&self, event: &InboundEvent, config: &SourceConfig) -> Rendered {
        let (InboundEvent::Alertmanager(batch), SourceConfig::Alertmanager(config)) =
            (event, config)
        else {
            return Rendered::default();
        };

        let alerts = Self::surviving_alerts(batch, config);
        if alerts.is_empty() {
            return Rendered::default();
        }

        let mode = config.group_mode.unwrap_or(if alerts.len() == 1 {
            GroupMode::Single
        } else {
            GroupMode::Group
        });

        let messages = match mode {
            GroupMode::Single => alerts
                .iter()
                .map(|alert| Self::format_single(alert, config))
                .collect(),
            GroupMode::Group => vec![Self::format_group(batch, &alerts, config)],
        };

        Rendered {
            messages,
            matched: alerts.len(),
        }
    }

    fn idempotency_key(
        &self,
        _request: &InboundRequest<'_>,
        event: &InboundEvent,
    ) -> Option<String> {
        match event {
            InboundEvent::Alertmanager(batch) if !batch.group_key.is_empty() => {
                Some(batch.group_key.clone())
            }
            _ => None,
        }
    }
}
