//! 扫描配置管理
pub mod scan;

pub use self::scan::{FetchOptions, ScanConfig, ScanConfigBuilder, SignatureOrigin};
