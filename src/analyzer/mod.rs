//! 信号分析模块：原始响应 → 信号视图 + 页面元数据
pub mod signal_extractor;

pub use self::signal_extractor::{ExtractedSignals, PageMetadata, SignalExtractor};
