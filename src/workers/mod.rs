// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 后台重试监督器：首次投递失败的消息在请求结束后继续按退避策略重试
pub mod retry_supervisor;

pub use retry_supervisor::{RetryJob, RetryOutcome, RetryQueue, RetrySupervisor};
