//! 页面抓取抽象
//! 扫描流程中唯一的挂起点；检测逻辑只依赖 PageFetcher，便于注入测试桩

use async_trait::async_trait;
use http::{HeaderMap, StatusCode};

use crate::config::FetchOptions;
use crate::error::ProbeResult;

#[cfg(feature = "remote-fetch")]
pub mod reqwest_fetcher;

#[cfg(feature = "remote-fetch")]
pub use self::reqwest_fetcher::ReqwestFetcher;

/// 一次抓取的原始响应
#[derive(Debug, Clone, Default)]
pub struct FetchedPage {
    /// 跟随重定向后的最终地址
    pub url: String,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    /// 响应体是否因超出上限被截断
    pub truncated: bool,
}

impl FetchedPage {
    pub fn new(url: impl Into<String>, status: StatusCode, headers: HeaderMap, body: Vec<u8>) -> Self {
        Self {
            url: url.into(),
            status,
            headers,
            body,
            truncated: false,
        }
    }
}

/// 页面抓取器
/// 约定：
/// 1. 收到任意HTTP响应（含非2xx）都返回 Ok，状态码由调用方判定
/// 2. 传输层故障（DNS/连接/TLS/超时/读取响应体）统一返回 StackProbeError::Unreachable
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> ProbeResult<FetchedPage>;
}
