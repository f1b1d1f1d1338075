// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::MetricsSettings;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{info, warn};

pub const WEBHOOK_REQUESTS_TOTAL: &str = "webhook_requests_total";
pub const DELIVERY_ATTEMPTS_TOTAL: &str = "delivery_attempts_total";
pub const DELIVERY_FAILED_TOTAL: &str = "delivery_failed_total";
pub const DELIVERY_DURATION_SECONDS: &str = "delivery_duration_seconds";
pub const RETRY_EXHAUSTED_TOTAL: &str = "retry_exhausted_total";

/// 安装 Prometheus 导出器
///
/// 未启用或地址非法时只记录日志，不影响服务启动
pub fn init_metrics(settings: &MetricsSettings) {
    if !settings.enabled {
        return;
    }

    let addr: SocketAddr = match settings.listen_addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            warn!(addr = %settings.listen_addr, error = %e, "Invalid metrics address");
            return;
        }
    };

    // 端口被占用时忽略，便于本地开发
    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!("Failed to install Prometheus recorder: {}. This might happen if the port is already in use.", e);
        return;
    }

    info!("Metrics exporter listening on {}", addr);
}

/// 记录入站 Webhook 的处理结果
pub fn record_webhook(source: &'static str, outcome: &'static str) {
    counter!(WEBHOOK_REQUESTS_TOTAL, "source" => source, "outcome" => outcome).increment(1);
}

/// 记录一次投递尝试
pub fn record_delivery(duration: Duration, failure_reason: Option<&'static str>) {
    counter!(DELIVERY_ATTEMPTS_TOTAL).increment(1);
    histogram!(DELIVERY_DURATION_SECONDS).record(duration.as_secs_f64());
    if let Some(reason) = failure_reason {
        counter!(DELIVERY_FAILED_TOTAL, "reason" => reason).increment(1);
    }
}

pub fn record_retry_exhausted() {
    counter!(RETRY_EXHAUSTED_TOTAL).increment(1);
}
