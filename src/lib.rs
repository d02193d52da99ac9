//! stackprobe - 网站技术栈指纹识别库
//! 抓取单个页面，按签名表匹配响应头与HTML信号，输出去重后的技术列表

pub mod analyzer;
pub mod config;
pub mod detector;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod scanner;
pub mod signatures;
pub mod utils;

// 导出全局错误类型
pub use self::error::{ProbeResult, ScanErrorKind, StackProbeError};

// 导出配置模块核心结构体与构建器
pub use crate::config::{FetchOptions, ScanConfig, ScanConfigBuilder, SignatureOrigin};

// 导出信号提取核心接口
pub use crate::analyzer::{ExtractedSignals, PageMetadata, SignalExtractor};
pub use crate::utils::{HeaderConverter, HtmlExtractor, HtmlInputGuard};

// 导出检测模块核心接口
pub use crate::detector::{
    global_detector, init_global_detector, init_global_detector_with_table, Detection,
    TechDetector,
};

// 导出抓取与扫描接口
pub use crate::fetch::{FetchedPage, PageFetcher};
#[cfg(feature = "remote-fetch")]
pub use crate::fetch::ReqwestFetcher;
pub use crate::scanner::{normalize_url, ScanReport, ScanResult, ScanTarget, Scanner};
#[cfg(feature = "remote-fetch")]
pub use crate::scanner::scan;

// 导出内核常用类型
pub use stackprobe_engine::{
    Category, EvalBudget, MatchType, SignalKind, SignatureRule, SignatureTable, TechSignature,
    TechnologyRecord,
};
