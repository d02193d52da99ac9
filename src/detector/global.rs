//! 全局检测器单例管理
//! 核心职责：
//! 1. 维护进程生命周期内唯一的TechDetector实例
//! 2. 支持懒加载初始化和手动注入签名表
//! 3. 统一错误处理和状态管理

use std::sync::Arc;

use once_cell::sync::{Lazy, OnceCell};
use stackprobe_engine::SignatureTable;

use super::detector::TechDetector;
use crate::config::ScanConfig;
use crate::error::{ProbeResult, StackProbeError};

/// 全局检测器实例 - 线程安全单例
/// - Lazy：延迟初始化，首次使用时创建
/// - OnceCell：确保实例仅初始化一次，进程内唯一
static GLOBAL_DETECTOR: Lazy<Arc<OnceCell<TechDetector>>> = Lazy::new(|| Arc::new(OnceCell::new()));

/// 初始化全局检测器
/// 幂等：已初始化则直接返回Ok(())
pub fn init_global_detector(config: ScanConfig) -> ProbeResult<()> {
    if GLOBAL_DETECTOR.get().is_some() {
        log::debug!("Global detector already initialized, skip reinitialization");
        return Ok(());
    }

    let detector = TechDetector::new(config).map_err(|e| {
        StackProbeError::DetectorInitError(format!("Failed to create TechDetector instance: {}", e))
    })?;
    install(detector)?;

    log::info!("Global TechDetector initialized successfully");
    Ok(())
}

/// 手动注入签名表，初始化全局检测器
pub fn init_global_detector_with_table(
    table: Arc<SignatureTable>,
    config: ScanConfig,
) -> ProbeResult<()> {
    if GLOBAL_DETECTOR.get().is_some() {
        log::debug!("Global detector already initialized, skip reinitialization with custom table");
        return Ok(());
    }

    install(TechDetector::with_table(table, config))?;
    log::info!("Global TechDetector initialized with custom signature table");
    Ok(())
}

fn install(detector: TechDetector) -> ProbeResult<()> {
    GLOBAL_DETECTOR.set(detector).or_else(|_| {
        // 并发初始化：另一线程已完成，视为成功
        if GLOBAL_DETECTOR.get().is_some() {
            Ok(())
        } else {
            Err(StackProbeError::DetectorInitError(
                "Global detector initialization failed: instance not created".to_string(),
            ))
        }
    })
}

/// 获取全局检测器实例（自动懒加载默认配置）
pub fn global_detector() -> ProbeResult<&'static TechDetector> {
    GLOBAL_DETECTOR.get_or_try_init(|| {
        log::debug!("Lazy initializing global TechDetector with default config");
        TechDetector::new(ScanConfig::default())
    })
}
