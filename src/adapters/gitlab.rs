// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::glob;
use super::template;
use super::traits::{AdapterError, InboundRequest, Rendered, SourceAdapter};
use crate::domain::models::gitlab_event::{
    GitLabEvent, IssueEvent, MergeRequestEvent, NoteEvent, PipelineEvent, PushEvent,
};
use crate::domain::models::inbound_event::InboundEvent;
use crate::domain::models::integration::SourceType;
use crate::domain::models::source_config::{GitLabConfig, GitLabEventKind, SourceConfig};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const EVENT_HEADER: &str = "X-Gitlab-Event";
pub const TOKEN_HEADER: &str = "X-Gitlab-Token";
pub const EVENT_UUID_HEADER: &str = "X-Gitlab-Event-UUID";

/// Push 消息中最多列出的提交数
const MAX_LISTED_COMMITS: usize = 3;

const DEFAULT_PUSH_TEMPLATE: &str =
    "📦 *{user}* pushed {commits} commit(s) to [{project}]({project_url}) branch `{branch}`";
const DEFAULT_MERGE_REQUEST_TEMPLATE: &str =
    "{emoji} Merge Request {action} by {user}: [*{title}*]({url}) in {project}\n`{source}` → `{target}`";
const DEFAULT_PIPELINE_TEMPLATE: &str =
    "{emoji} Pipeline {status} for [{project}]({project_url}) on `{ref}`\nDuration: {duration}s";
const DEFAULT_COMMENT_TEMPLATE: &str = "💬 {user} commented on {target} in {project}:\n> {comment}";
const DEFAULT_ISSUE_TEMPLATE: &str = "📝 {user} {action} issue [#{iid} {title}]({url}) in {project}";

/// GitLab 适配器
///
/// 事件类型来自 `X-Gitlab-Event` 请求头。
/// 调用方的 HTTP 响应永远是 200，鉴权失败按“被过滤”处理
#[derive(Debug, Default, Clone)]
pub struct GitLabAdapter;

impl GitLabAdapter {
    pub fn new() -> Self {
        Self
    }

    fn format_event(event: &GitLabEvent, config: &GitLabConfig) -> String {
        let custom = config.templates.for_kind(event.kind());
        let actor = event.actor();
        match event {
            GitLabEvent::Push(push) => Self::format_push(push, actor, custom),
            GitLabEvent::MergeRequest(mr) => Self::format_merge_request(mr, actor, custom),
            GitLabEvent::Pipeline(pipeline) => Self::format_pipeline(pipeline, custom),
            GitLabEvent::Note(note) => Self::format_comment(note, actor, custom),
            GitLabEvent::Issue(issue) => Self::format_issue(issue, actor, custom),
        }
    }

    fn format_push(event: &PushEvent, actor: &str, custom: Option<&str>) -> String {
        let count = event.commit_count();
        let mut text = template::render(
            custom.unwrap_or(DEFAULT_PUSH_TEMPLATE),
            &[
                ("user", actor),
                ("commits", count.to_string().as_str()),
                ("project", event.project.name.as_str()),
                ("project_url", event.project.web_url.as_str()),
                ("branch", event.branch()),
            ],
        );

        for commit in event.commits.iter().take(MAX_LISTED_COMMITS) {
            text.push_str(&format!(
                "\n  • [`{}`]({}) {}",
                commit.short_id(),
                commit.url,
                commit.headline()
            ));
        }
        let listed = event.commits.len().min(MAX_LISTED_COMMITS);
        if count > listed {
            text.push_str(&format!("\n  … and {} more", count - listed));
        }
        text
    }

    fn format_merge_request(event: &MergeRequestEvent, actor: &str, custom: Option<&str>) -> String {
        let attrs = &event.object_attributes;
        let emoji = match attrs.action.as_str() {
            "open" | "reopen" => "🆕",
            "merge" => "✅",
            "close" => "❌",
            _ => "🔄",
        };
        template::render(
            custom.unwrap_or(DEFAULT_MERGE_REQUEST_TEMPLATE),
            &[
                ("emoji", emoji),
                ("action", attrs.action.as_str()),
                ("user", actor),
                ("title", attrs.title.as_str()),
                ("url", attrs.url.as_str()),
                ("project", event.project.name.as_str()),
                ("source", attrs.source_branch.as_str()),
                ("target", attrs.target_branch.as_str()),
                ("iid", attrs.iid.to_string().as_str()),
            ],
        )
    }

    fn format_pipeline(event: &PipelineEvent, custom: Option<&str>) -> String {
        let attrs = &event.object_attributes;
        let emoji = match attrs.status.as_str() {
            "success" => "✅",
            "failed" => "❌",
            "running" => "🔄",
            _ => "⏳",
        };
        template::render(
            custom.unwrap_or(DEFAULT_PIPELINE_TEMPLATE),
            &[
                ("emoji", emoji),
                ("status", attrs.status.as_str()),
                ("project", event.project.name.as_str()),
                ("project_url", event.project.web_url.as_str()),
                ("ref", attrs.git_ref.as_str()),
                ("duration", attrs.duration.unwrap_or(0).to_string().as_str()),
                ("url", event.url().as_str()),
            ],
        )
    }

    fn format_comment(event: &NoteEvent, actor: &str, custom: Option<&str>) -> String {
        template::render(
            custom.unwrap_or(DEFAULT_COMMENT_TEMPLATE),
            &[
                ("user", actor),
                ("target", event.target().as_str()),
                ("project", event.project.name.as_str()),
                ("comment", event.object_attributes.note.as_str()),
                ("url", event.object_attributes.url.as_str()),
            ],
        )
    }

    fn format_issue(event: &IssueEvent, actor: &str, custom: Option<&str>) -> String {
        let attrs = &event.object_attributes;
        template::render(
            custom.unwrap_or(DEFAULT_ISSUE_TEMPLATE),
            &[
                ("user", actor),
                ("action", attrs.action.as_str()),
                ("iid", attrs.iid.to_string().as_str()),
                ("title", attrs.title.as_str()),
                ("url", attrs.url.as_str()),
                ("state", attrs.state.as_str()),
                ("project", event.project.name.as_str()),
            ],
        )
    }
}

/// 常量时间比较共享密钥
///
/// 两侧先经过同一密钥的 HMAC，长度差异不会影响比较耗时
fn tokens_match(expected: &str, provided: &str) -> bool {
    let (Ok(mut candidate), Ok(mut reference)) = (
        HmacSha256::new_from_slice(expected.as_bytes()),
        HmacSha256::new_from_slice(expected.as_bytes()),
    ) else {
        return false;
    };
    candidate.update(provided.as_bytes());
    reference.update(expected.as_bytes());
    candidate
        .verify_slice(&reference.finalize().into_bytes())
        .is_ok()
}

impl SourceAdapter for GitLabAdapter {
    fn source_type(&self) -> SourceType {
        SourceType::Gitlab
    }

    fn authenticate(
        &self,
        request: &InboundRequest<'_>,
        config: &SourceConfig,
    ) -> Result<(), AdapterError> {
        let SourceConfig::Gitlab(config) = config else {
            return Ok(());
        };
        if config.secret_token.is_empty() {
            return Ok(());
        }

        let provided = request.header(TOKEN_HEADER).unwrap_or_default();
        if tokens_match(&config.secret_token, provided) {
            Ok(())
        } else {
            Err(AdapterError::AuthMismatch)
        }
    }

    fn decode(&self, request: &InboundRequest<'_>) -> Result<InboundEvent, AdapterError> {
        let header = request.header(EVENT_HEADER).unwrap_or_default();
        let kind = GitLabEventKind::from_header(header)
            .ok_or_else(|| AdapterError::UnsupportedEvent(header.to_string()))?;

        let body = request.body;
        let event = match kind {
            GitLabEventKind::Push => {
                GitLabEvent::Push(serde_json::from_slice(body).map_err(AdapterError::malformed)?)
            }
            GitLabEventKind::MergeRequest => GitLabEvent::MergeRequest(
                serde_json::from_slice(body).map_err(AdapterError::malformed)?,
            ),
            GitLabEventKind::Pipeline => GitLabEvent::Pipeline(
                serde_json::from_slice(body).map_err(AdapterError::malformed)?,
            ),
            GitLabEventKind::Issue => {
                GitLabEvent::Issue(serde_json::from_slice(body).map_err(AdapterError::malformed)?)
            }
            GitLabEventKind::Comment => {
                GitLabEvent::Note(serde_json::from_slice(body).map_err(AdapterError::malformed)?)
            }
        };
        Ok(InboundEvent::GitLab(event))
    }

    fn should_process(&self, event: &InboundEvent, config: &SourceConfig) -> bool {
        let (InboundEvent::GitLab(event), SourceConfig::Gitlab(config)) = (event, config) else {
            return false;
        };

        if !config.allows_event(event.kind()) {
            return false;
        }

        if let Some(branch) = event.branch() {
            if !glob::matches(&config.branch_filter, branch) {
                return false;
            }
        }

        glob::matches_any(&config.project_filter, &event.project().path_with_namespace)
    }

    fn format(&self, event: &InboundEvent, config: &SourceConfig) -> Rendered {
        match (event, config) {
            (InboundEvent::GitLab(event), SourceConfig::Gitlab(config)) => {
                Rendered::single(Self::format_event(event, config))
            }
            _ => Rendered::default(),
        }
    }

    fn idempotency_key(
        &self,
        request: &InboundRequest<'_>,
        _event: &InboundEvent,
    ) -> Option<String> {
        request
            .header(EVENT_UUID_HEADER)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }
}
