//! 检测模块：技术检测核心逻辑
pub mod detector;
pub mod global;

// 导出核心接口
pub use self::detector::{Detection, TechDetector};
pub use self::global::{global_detector, init_global_detector, init_global_detector_with_table};
