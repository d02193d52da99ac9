//! 扫描结果（对外JSON结构）
//! 只能通过 ScanResult::success / ScanResult::failure 构建：
//! - 失败结果不携带技术列表，必有可读错误信息
//! - 成功结果必有元数据（缺失时为占位文本）

use serde::Serialize;
use stackprobe_engine::TechnologyRecord;

use crate::analyzer::PageMetadata;
use crate::error::{ScanErrorKind, StackProbeError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_secure: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<PageMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tech: Option<Vec<TechnologyRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_kind: Option<ScanErrorKind>,
}

impl ScanResult {
    pub fn success(
        url: impl Into<String>,
        is_secure: bool,
        metadata: PageMetadata,
        tech: Vec<TechnologyRecord>,
    ) -> Self {
        Self {
            success: true,
            url: Some(url.into()),
            is_secure: Some(is_secure),
            metadata: Some(metadata),
            tech: Some(tech),
            error: None,
            error_kind: None,
        }
    }

    pub fn failure(err: &StackProbeError) -> Self {
        Self {
            success: false,
            url: None,
            is_secure: None,
            metadata: None,
            tech: None,
            error: Some(err.to_string()),
            error_kind: Some(err.kind()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn is_secure(&self) -> Option<bool> {
        self.is_secure
    }

    pub fn metadata(&self) -> Option<&PageMetadata> {
        self.metadata.as_ref()
    }

    /// 技术列表；失败结果为 None
    pub fn tech(&self) -> Option<&[TechnologyRecord]> {
        self.tech.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn error_kind(&self) -> Option<ScanErrorKind> {
        self.error_kind
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
