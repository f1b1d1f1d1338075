// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::adapters::{AdapterRegistry, Rendered};
use crate::domain::models::inbound_event::InboundEvent;
use crate::domain::models::source_config::SourceConfig;
use std::sync::Arc;
use tracing::debug;

/// 过滤与格式化引擎
///
/// 纯函数：相同输入总是得到相同输出，不做任何 I/O
#[derive(Clone)]
pub struct FormatEngine {
    registry: Arc<AdapterRegistry>,
}

impl FormatEngine {
    pub fn new(registry: Arc<AdapterRegistry>) -> Self {
        Self { registry }
    }

    /// 根据租户配置决定是否输出以及输出的消息
    ///
    /// # 参数
    ///
    /// * `event` - 已解码的事件
    /// * `config` - 集成的来源配置
    ///
    /// # 返回值
    ///
    /// 零条、一条或多条消息；来源类型不一致或被过滤时为空
    pub fn render(&self, event: &InboundEvent, config: &SourceConfig) -> Rendered {
        let source = event.source_type();
        if source != config.source_type() {
            debug!(%source, "Event and configuration belong to different sources");
            return Rendered::default();
        }

        let Some(adapter) = self.registry.get(source) else {
            return Rendered::default();
        };

        if !adapter.should_process(event, config) {
            debug!(%source, "Event filtered out");
            return Rendered::default();
        }

        adapter.format(event, config)
    }
}
