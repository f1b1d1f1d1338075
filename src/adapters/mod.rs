// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 来源适配器模块
///
/// 每种事件来源实现同一组能力：解码、鉴权、过滤和格式化，
/// 由注册表按来源类型选择
pub mod alertmanager;
pub mod gitlab;
pub mod glob;
pub mod jira;
pub mod registry;
pub mod template;
pub mod traits;

pub use registry::AdapterRegistry;
pub use traits::{AdapterError, InboundRequest, Rendered, SourceAdapter};
