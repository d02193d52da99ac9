//! 日志接入
//! 库内部统一使用 log 门面；开启 tracing 特性后可将 log 记录桥接到 tracing 订阅者

use crate::error::{ProbeResult, StackProbeError};

/// 将 log 记录转发给 tracing（进程内只能调用一次）
#[cfg(feature = "tracing")]
pub fn bridge_log_to_tracing() -> ProbeResult<()> {
    tracing_log::LogTracer::init().map_err(|e| {
        StackProbeError::DetectorInitError(format!("Failed to install log→tracing bridge: {}", e))
    })
}

/// 未开启 tracing 特性时的提示
#[cfg(not(feature = "tracing"))]
pub fn bridge_log_to_tracing() -> ProbeResult<()> {
    Err(StackProbeError::FeatureDisabled(
        "tracing feature is disabled, log records stay on the log facade".to_string(),
    ))
}

#[cfg(all(test, feature = "tracing"))]
mod tests {
    #[test]
    fn log_records_reach_tracing() {
        let subscriber = tracing_subscriber::fmt().with_test_writer().finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
        super::bridge_log_to_tracing().unwrap();
        log::info!("bridged through tracing-log");
    }
}
