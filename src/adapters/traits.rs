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

use crate::domain::models::inbound_event::InboundEvent;
use crate::domain::models::integration::SourceType;
use crate::domain::models::source_config::SourceConfig;
use axum::http::HeaderMap;
use thiserror::Error;

/// 适配器错误类型
#[derive(Error, Debug)]
pub enum AdapterError {
    /// 负载结构与来源约定不符
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
    /// 共享密钥不匹配
    #[error("Token mismatch")]
    AuthMismatch,
    /// 来源声明了不支持的事件类型
    #[error("Unsupported event: {0}")]
    UnsupportedEvent(String),
}

impl AdapterError {
    pub fn malformed(err: serde_json::Error) -> Self {
        AdapterError::MalformedPayload(err.to_string())
    }
}

/// 入站请求的只读视图
#[derive(Debug, Clone, Copy)]
pub struct InboundRequest<'a> {
    pub headers: &'a HeaderMap,
    pub body: &'a [u8],
}

impl<'a> InboundRequest<'a> {
    pub fn new(headers: &'a HeaderMap, body: &'a [u8]) -> Self {
        Self { headers, body }
    }

    /// 读取字符串请求头，非 ASCII 值视为缺失
    pub fn header(&self, name: &str) -> Option<&'a str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// 过滤和格式化的结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    /// 待发送的消息文本
    pub messages: Vec<String>,
    /// 通过过滤的条目数（告警批次中为告警条数）
    pub matched: usize,
}

impl Rendered {
    pub fn single(text: String) -> Self {
        Self {
            messages: vec![text],
            matched: 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// 来源适配器特质
///
/// 除解码外全部为纯函数，不做任何 I/O
pub trait SourceAdapter: Send + Sync {
    /// 适配器处理的来源类型
    fn source_type(&self) -> SourceType;

    /// 校验调用方凭据，默认不校验
    fn authenticate(
        &self,
        _request: &InboundRequest<'_>,
        _config: &SourceConfig,
    ) -> Result<(), AdapterError> {
        Ok(())
    }

    /// 将原始请求解码为类型化事件
    fn decode(&self, request: &InboundRequest<'_>) -> Result<InboundEvent, AdapterError>;

    /// 事件是否通过租户配置的过滤
    fn should_process(&self, event: &InboundEvent, config: &SourceConfig) -> bool;

    /// 生成消息文本，事件或配置不属于本来源时返回空结果
    fn format(&self, event: &InboundEvent, config: &SourceConfig) -> Rendered;

    /// 来源提供的幂等键
    fn idempotency_key(&self, request: &InboundRequest<'_>, event: &InboundEvent)
        -> Option<String>;
}
