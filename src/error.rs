//! 全局错误类型定义
//! 扫描失败统一映射为 ScanErrorKind，供结果层输出稳定的错误分类
use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeJsonError;
use stackprobe_engine::CoreError;
use std::fmt::{Display, Formatter};
use std::io::Error as IoError;
use thiserror::Error;
use url::ParseError as UrlParseError;

#[derive(Error, Debug)]
pub enum StackProbeError {
    // 输入相关错误
    #[error("无效输入：{0}")]
    InvalidInput(String),
    #[error("URL解析失败：{0}")]
    UrlError(#[from] UrlParseError),

    // 网络相关错误
    #[error("站点不可达：{0}")]
    Unreachable(String),
    #[error("站点返回错误状态：{status}")]
    FetchError { status: u16 },

    // 页面解析错误
    #[error("页面解析失败：{0}")]
    ParseError(String),

    // 签名表相关错误
    #[error("签名表加载失败：{0}")]
    TableLoadError(String),
    #[error("签名引擎错误：{0}")]
    EngineError(#[from] CoreError),

    // 检测器相关错误
    #[error("检测器初始化失败: {0}")]
    DetectorInitError(String),
    #[error("功能未启用：{0}")]
    FeatureDisabled(String),

    // 基础错误
    #[error("JSON解析失败：{0}")]
    JsonError(#[from] SerdeJsonError),
    #[error("IO操作失败：{0}")]
    IoError(#[from] IoError),
}

impl StackProbeError {
    /// 错误分类
    pub fn kind(&self) -> ScanErrorKind {
        match self {
            StackProbeError::InvalidInput(_) | StackProbeError::UrlError(_) => {
                ScanErrorKind::InvalidInput
            }
            StackProbeError::Unreachable(_) => ScanErrorKind::Unreachable,
            StackProbeError::FetchError { .. } => ScanErrorKind::FetchError,
            StackProbeError::ParseError(_) => ScanErrorKind::ParseError,
            StackProbeError::TableLoadError(_)
            | StackProbeError::EngineError(_)
            | StackProbeError::DetectorInitError(_)
            | StackProbeError::FeatureDisabled(_)
            | StackProbeError::JsonError(_)
            | StackProbeError::IoError(_) => ScanErrorKind::Detector,
        }
    }
}

/// 扫描失败分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScanErrorKind {
    /// 输入无法构成可抓取的URL
    InvalidInput,
    /// DNS/连接/TLS/超时/取消
    Unreachable,
    /// 站点返回非2xx状态
    FetchError,
    /// 严格模式下HTML无法解析
    ParseError,
    /// 签名表或检测器自身故障
    Detector,
}

impl Display for ScanErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ScanErrorKind::InvalidInput => "InvalidInput",
            ScanErrorKind::Unreachable => "Unreachable",
            ScanErrorKind::FetchError => "FetchError",
            ScanErrorKind::ParseError => "ParseError",
            ScanErrorKind::Detector => "Detector",
        };
        f.write_str(s)
    }
}

// 全局Result类型
pub type ProbeResult<T> = Result<T, StackProbeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_distinct_per_failure_class() {
        assert_eq!(
            StackProbeError::FetchError { status: 403 }.kind(),
            ScanErrorKind::FetchError
        );
        assert_eq!(
            StackProbeError::Unreachable("dns error".into()).kind(),
            ScanErrorKind::Unreachable
        );
        assert_eq!(
            StackProbeError::InvalidInput("empty".into()).kind(),
            ScanErrorKind::InvalidInput
        );
        assert_eq!(
            StackProbeError::from(CoreError::TableLoadError("x".into())).kind(),
            ScanErrorKind::Detector
        );
    }

    #[test]
    fn kind_serializes_as_variant_name() {
        let json = serde_json::to_string(&ScanErrorKind::Unreachable).unwrap();
        assert_eq!(json, "\"Unreachable\"");
        assert_eq!(ScanErrorKind::FetchError.to_string(), "FetchError");
    }
}
